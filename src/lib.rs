//! Generate runnable Go programs from dynamically typed host values.
//!
//! ```
//! use goblock::{Binding, Options, Params, generate};
//!
//! let mut params = Params::new("fmt.Println(x)");
//! params.imports = vec!["fmt".to_string()];
//! params.vars = vec![Binding::new("x", 7i64)];
//!
//! let code = generate(&params, &Options::default()).unwrap();
//! assert!(code.starts_with("package main\nimport (\n\t\"fmt\"\n)\n"));
//! assert!(code.contains("var x int = 7\n"));
//! ```

pub mod assemble;
pub mod bind;
pub mod error;
pub mod exec;
pub mod format;
pub mod infer;
pub mod params;
pub mod result;
pub mod tables;
pub mod value;

pub use assemble::{SourceUnit, assemble};
pub use bind::{Binding, bind, declare};
pub use error::{ExecError, GenerateError, NameKind, ParamsError};
pub use exec::{ExecConfig, Executor, GoExecutor, resolve_args};
pub use format::{Formatted, format};
pub use infer::{Arity, BaseType, InferredType, classify, classify_strict};
pub use params::Params;
pub use result::{ResultShape, decode};
pub use tables::ColumnSpec;
pub use value::DynamicValue;

/// Configuration for generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Package used when neither the body nor the parameters name one (default: "main")
    pub default_package: String,
    /// Reject values whose Go type would be a guess instead of declaring them as strings
    pub strict: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            default_package: "main".to_string(),
            strict: false,
        }
    }
}

/// Generate the complete program text for `params`.
pub fn generate(params: &Params, options: &Options) -> Result<String, GenerateError> {
    Ok(assemble(params, options)?.render())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(body: &str) -> Params {
        Params::new(body)
    }

    #[test]
    fn test_wraps_then_adds_package() {
        let code = generate(&params("x:=1"), &Options::default()).unwrap();
        assert_eq!(code, "package main\nfunc main() {\nx:=1\n}\n");
    }

    #[test]
    fn test_existing_package_without_main() {
        let code = generate(&params("package demo\nx := 1\n"), &Options::default()).unwrap();
        assert_eq!(code, "package demo\nfunc main() {\nx := 1\n}\n");
        assert_eq!(code.matches("package ").count(), 1);
        assert_eq!(code.matches("func main()").count(), 1);
    }

    #[test]
    fn test_existing_main_is_untouched() {
        let body = "func main() {\n\tprintln(1)\n}\n";
        let code = generate(&params(body), &Options::default()).unwrap();
        assert_eq!(code, "package main\nfunc main() {\n\tprintln(1)\n}\n");
    }

    #[test]
    fn test_no_wrap_when_not_requested() {
        let mut p = params("func helper() {}");
        p.main = false;
        let code = generate(&p, &Options::default()).unwrap();
        assert_eq!(code, "package main\nfunc helper() {}\n");
    }

    #[test]
    fn test_named_package() {
        let mut p = params("x := 1");
        p.package = Some("tools".to_string());
        p.main = false;
        assert_eq!(generate(&p, &Options::default()).unwrap(), "package tools\nx := 1\n");
    }

    #[test]
    fn test_empty_package_name_defaults() {
        let mut p = params("");
        p.package = Some(" ".to_string());
        assert!(generate(&p, &Options::default()).unwrap().starts_with("package main\n"));
    }

    #[test]
    fn test_default_package_option() {
        let options = Options {
            default_package: "scratch".to_string(),
            ..Options::default()
        };
        assert!(generate(&params(""), &options).unwrap().starts_with("package scratch\n"));
    }

    #[test]
    fn test_invalid_package_name() {
        let mut p = params("");
        p.package = Some("my-pkg".to_string());
        let err = generate(&p, &Options::default()).unwrap_err();
        assert!(matches!(err, GenerateError::InvalidIdentifier { kind: NameKind::Package, .. }));
    }

    #[test]
    fn test_session_is_rejected() {
        let mut p = params("x := 1");
        p.session = Some("go-session".to_string());
        p.vars = vec![Binding::new("x", 1i64)];
        assert_eq!(
            generate(&p, &Options::default()),
            Err(GenerateError::sessions_unsupported())
        );
    }

    #[test]
    fn test_strict_mode_aborts_without_text() {
        let mut p = params("");
        p.vars = vec![Binding::new("ok", 1i64), Binding::new("flag", true)];
        let options = Options {
            strict: true,
            ..Options::default()
        };
        assert!(matches!(generate(&p, &options), Err(GenerateError::UnsupportedType { .. })));
        assert!(generate(&p, &Options::default()).is_ok());
    }
}
