//! Source assembly.
//!
//! The body is split once into its package clause and the rest. Every other
//! section is built on its own and the sections are joined in a fixed order:
//! package, imports, body, variables, table helpers. Nothing is spliced into
//! text that has already been generated.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::Options;
use crate::bind::{bind, check_identifier, declare};
use crate::error::{GenerateError, NameKind};
use crate::format::quote;
use crate::infer::{Arity, BaseType, InferredType};
use crate::params::Params;
use crate::tables::{ColumnSpec, helpers_text, take_header_rows};
use crate::value::DynamicValue;

lazy_static! {
    static ref PACKAGE_LINE: Regex = Regex::new(r"^[ \t]*package[ \t]+[\p{L}_][\p{L}\p{Nd}_]*").unwrap();
    static ref MAIN_FUNC: Regex = Regex::new(r"(?m)^[ \t]*func[ \t]+main[ \t]*\([ \t]*\)").unwrap();
}

/// Name of the generated program's entry point
pub const ENTRY_SYMBOL: &str = "main";

/// A generated program, section by section
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceUnit {
    /// Leading comments plus the package clause
    pub package: String,
    pub imports: Option<String>,
    pub body: String,
    pub variables: Option<String>,
    pub table_helpers: Option<String>,
}

impl SourceUnit {
    pub fn render(&self) -> String {
        let mut out = String::new();
        push_line(&mut out, &self.package);
        if let Some(imports) = &self.imports {
            out.push_str(imports);
        }
        push_line(&mut out, &self.body);
        if let Some(variables) = &self.variables {
            out.push_str(variables);
        }
        if let Some(helpers) = &self.table_helpers {
            out.push_str(helpers);
        }
        out
    }
}

fn push_line(out: &mut String, text: &str) {
    out.push_str(text);
    if !text.ends_with('\n') {
        out.push('\n');
    }
}

/// Build every section of the program described by `params`.
pub fn assemble(params: &Params, options: &Options) -> Result<SourceUnit, GenerateError> {
    if params.wants_session() {
        return Err(GenerateError::sessions_unsupported());
    }

    let (clause, rest) = split_package_clause(&params.body);

    let body = if params.main && !has_entry_point(rest) {
        tracing::debug!("no entry point found, wrapping body in func {ENTRY_SYMBOL}()");
        wrap_entry_point(rest)
    } else {
        rest.trim_end_matches(['\n', '\r']).to_string()
    };

    let package = match clause {
        Some(clause) => clause.to_string(),
        None => {
            let name = params
                .package
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .unwrap_or(&options.default_package);
            check_identifier(NameKind::Package, name)?;
            tracing::debug!(package = name, "no package clause found, adding one");
            format!("package {name}")
        }
    };

    let imports = import_block(&params.imports);

    let mut bindings = params.vars.clone();
    let mut specs: Vec<ColumnSpec> = params.columns.clone();
    if params.colnames {
        let from_headers = take_header_rows(&mut bindings, &specs);
        specs.extend(from_headers);
    }

    let variables = if bindings.is_empty() {
        None
    } else {
        let mut text = String::new();
        for binding in &bindings {
            let line = if is_empty_named_table(&binding.value, &binding.name, &specs) {
                declare(binding, InferredType::new(BaseType::StringT, Arity::Table))?
            } else {
                bind(binding, options.strict)?
            };
            text.push_str(&line);
            text.push('\n');
        }
        Some(text)
    };

    let table_helpers = helpers_text(&specs)?;

    tracing::debug!(
        imports = params.imports.len(),
        variables = bindings.len(),
        tables = specs.len(),
        "assembled source unit"
    );

    Ok(SourceUnit {
        package,
        imports,
        body,
        variables,
        table_helpers,
    })
}

/// An empty sequence that has column specs is still a table; only its header
/// row was given.
fn is_empty_named_table(value: &DynamicValue, name: &str, specs: &[ColumnSpec]) -> bool {
    matches!(value, DynamicValue::Sequence(rows) if rows.is_empty())
        && specs.iter().any(|spec| spec.table == name)
}

/// Split off leading comments and the package clause, if the body has one.
///
/// Only the first line that is neither blank nor a comment can be the clause,
/// so a `package` further down (in a string, say) is left alone.
pub fn split_package_clause(body: &str) -> (Option<&str>, &str) {
    let mut in_block_comment = false;
    let mut offset = 0;

    for line in body.split_inclusive('\n') {
        let start = offset;
        offset += line.len();

        let mut code = line;
        if in_block_comment {
            match code.find("*/") {
                Some(end) => {
                    in_block_comment = false;
                    code = &code[end + 2..];
                }
                None => continue,
            }
        }
        code = skip_block_comments(code, &mut in_block_comment);

        let trimmed = code.trim();
        if trimmed.is_empty() || trimmed.starts_with("//") {
            continue;
        }

        if PACKAGE_LINE.is_match(code) {
            let clause_end = start + line.trim_end_matches(['\n', '\r']).len();
            return (Some(&body[..clause_end]), &body[offset..]);
        }
        break;
    }

    (None, body)
}

/// What follows any `/* ... */` comments at the start of `code`.
/// An unterminated comment sets `in_block_comment` and leaves nothing.
fn skip_block_comments<'a>(mut code: &'a str, in_block_comment: &mut bool) -> &'a str {
    loop {
        let trimmed = code.trim_start();
        let Some(comment) = trimmed.strip_prefix("/*") else {
            return trimmed;
        };
        match comment.find("*/") {
            Some(end) => code = &comment[end + 2..],
            None => {
                *in_block_comment = true;
                return "";
            }
        }
    }
}

/// Whether the body already defines `func main()`
pub fn has_entry_point(body: &str) -> bool {
    MAIN_FUNC.is_match(body)
}

fn wrap_entry_point(body: &str) -> String {
    format!(
        "func {ENTRY_SYMBOL}() {{\n{}\n}}",
        body.trim_end_matches(['\n', '\r'])
    )
}

/// One grouped import declaration, or `None` for an empty list
pub fn import_block(imports: &[String]) -> Option<String> {
    let lines: Vec<String> = imports
        .iter()
        .map(|entry| entry.trim())
        .filter(|entry| !entry.is_empty())
        .map(import_spec)
        .collect();

    if lines.is_empty() {
        return None;
    }

    let mut block = String::from("import (\n");
    for line in lines {
        block.push('\t');
        block.push_str(&line);
        block.push('\n');
    }
    block.push_str(")\n");
    Some(block)
}

/// `fmt` -> `"fmt"`, `f fmt` -> `f "fmt"`, quoted paths kept as written
fn import_spec(entry: &str) -> String {
    if is_quoted(entry) {
        return entry.to_string();
    }
    match entry.split_once(char::is_whitespace) {
        Some((alias, path)) => {
            let path = path.trim();
            if is_quoted(path) {
                format!("{alias} {path}")
            } else {
                format!("{alias} {}", quote(path))
            }
        }
        None => quote(entry),
    }
}

fn is_quoted(text: &str) -> bool {
    text.len() >= 2
        && ((text.starts_with('"') && text.ends_with('"'))
            || (text.starts_with('`') && text.ends_with('`')))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_plain_clause() {
        let (clause, rest) = split_package_clause("package foo\nx := 1\n");
        assert_eq!(clause, Some("package foo"));
        assert_eq!(rest, "x := 1\n");
    }

    #[test]
    fn test_split_keeps_leading_comments() {
        let body = "//go:build linux\n\n/* doc\n   package fake */\npackage foo\nrest";
        let (clause, rest) = split_package_clause(body);
        assert_eq!(clause, Some("//go:build linux\n\n/* doc\n   package fake */\npackage foo"));
        assert_eq!(rest, "rest");
    }

    #[test]
    fn test_split_ignores_package_after_code() {
        let body = "fmt.Println(\"x\")\npackage foo\n";
        assert_eq!(split_package_clause(body), (None, body));
    }

    #[test]
    fn test_split_without_trailing_newline() {
        assert_eq!(split_package_clause("package foo"), (Some("package foo"), ""));
    }

    #[test]
    fn test_split_clause_after_inline_block_comment() {
        let (clause, rest) = split_package_clause("/* doc */ package foo\nx := 1");
        assert_eq!(clause, Some("/* doc */ package foo"));
        assert_eq!(rest, "x := 1");
    }

    #[test]
    fn test_split_clause_after_multiline_comment_close() {
        let body = "/* generated\n*/ package foo\nx := 1";
        let (clause, rest) = split_package_clause(body);
        assert_eq!(clause, Some("/* generated\n*/ package foo"));
        assert_eq!(rest, "x := 1");
    }

    #[test]
    fn test_code_after_closed_comment_ends_the_search() {
        let body = "/* a */ /* b */ x := 1\npackage foo\n";
        assert_eq!(split_package_clause(body), (None, body));
    }

    #[test]
    fn test_header_only_table_is_declared_as_table() {
        let mut params = Params::new("");
        params.colnames = true;
        params.vars = vec![crate::Binding::new("t", vec![vec!["a", "b"]])];

        let unit = assemble(&params, &Options::default()).unwrap();
        assert_eq!(unit.variables.as_deref(), Some("var t [][]string = [][]string{  }\n"));
        assert!(unit.table_helpers.unwrap().contains("return t[row][get_column_num(t_header, col)]"));
    }

    #[test]
    fn test_empty_sequence_without_columns_stays_vector() {
        let mut params = Params::new("");
        params.vars = vec![crate::Binding::new("xs", DynamicValue::Sequence(Vec::new()))];

        let unit = assemble(&params, &Options::default()).unwrap();
        assert_eq!(unit.variables.as_deref(), Some("var xs []int = []int{}\n"));
    }

    #[test]
    fn test_package_word_alone_is_not_a_clause() {
        let body = "packages := 3\n";
        assert_eq!(split_package_clause(body), (None, body));
    }

    #[test]
    fn test_entry_point_detection() {
        assert!(has_entry_point("func main() {\n}"));
        assert!(has_entry_point("  func  main ( ) {"));
        assert!(!has_entry_point("func mainly() {}"));
        assert!(!has_entry_point("func main(args []string) {}"));
        assert!(!has_entry_point("// calls func helper()\nx := main()"));
    }

    #[test]
    fn test_import_block() {
        let imports = vec!["fmt".to_string(), "os".to_string()];
        assert_eq!(import_block(&imports).unwrap(), "import (\n\t\"fmt\"\n\t\"os\"\n)\n");
        assert_eq!(import_block(&[]), None);
        assert_eq!(import_block(&["  ".to_string()]), None);
    }

    #[test]
    fn test_import_specs() {
        assert_eq!(import_spec("\"fmt\""), "\"fmt\"");
        assert_eq!(import_spec("f fmt"), "f \"fmt\"");
        assert_eq!(import_spec(". \"math\""), ". \"math\"");
        assert_eq!(import_spec("_ net/http/pprof"), "_ \"net/http/pprof\"");
    }
}
