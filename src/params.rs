use serde::Deserialize;
use std::path::Path;

use crate::bind::Binding;
use crate::error::ParamsError;
use crate::result::ResultShape;
use crate::tables::ColumnSpec;

/// The processed parameters of one source block, as handed over by the host
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Params {
    pub body: String,
    pub package: Option<String>,
    #[serde(deserialize_with = "one_or_many")]
    pub imports: Vec<String>,
    pub vars: Vec<Binding>,
    pub columns: Vec<ColumnSpec>,
    /// Take column names from the first row of each table variable
    pub colnames: bool,
    /// Wrap the body in `func main()` when it has none
    pub main: bool,
    pub session: Option<String>,

    // Execution collaborator inputs
    pub flags: Vec<String>,
    pub args: Vec<String>,
    pub results: ResultShape,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            body: String::new(),
            package: None,
            imports: Vec::new(),
            vars: Vec::new(),
            columns: Vec::new(),
            colnames: false,
            main: true,
            session: None,
            flags: Vec::new(),
            args: Vec::new(),
            results: ResultShape::default(),
        }
    }
}

impl Params {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            ..Self::default()
        }
    }

    pub fn from_json(text: &str) -> Result<Self, ParamsError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ParamsError> {
        let text = std::fs::read_to_string(path).map_err(|source| ParamsError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// A session was asked for. `none` is the host's way of saying no session.
    pub fn wants_session(&self) -> bool {
        self.session
            .as_deref()
            .is_some_and(|s| !s.is_empty() && s != "none")
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
        None(()),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) if s.trim().is_empty() => Vec::new(),
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(items) => items,
        OneOrMany::None(()) => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::DynamicValue;

    #[test]
    fn test_defaults() {
        let params = Params::from_json(r#"{"body": "x := 1"}"#).unwrap();
        assert_eq!(params.body, "x := 1");
        assert!(params.main);
        assert!(params.imports.is_empty());
        assert_eq!(params.results, ResultShape::Raw);
        assert!(!params.wants_session());
    }

    #[test]
    fn test_full_record() {
        let params = Params::from_json(
            r#"{
                "body": "fmt.Println(x)",
                "package": "demo",
                "imports": ["fmt", "os"],
                "vars": [{"name": "x", "value": [1, 2]}],
                "columns": [{"table": "t", "columns": ["a", "b"]}],
                "main": false,
                "results": "table"
            }"#,
        )
        .unwrap();

        assert_eq!(params.package.as_deref(), Some("demo"));
        assert_eq!(params.imports, vec!["fmt", "os"]);
        assert_eq!(params.vars, vec![Binding::new("x", DynamicValue::from(vec![1i64, 2]))]);
        assert_eq!(params.columns, vec![ColumnSpec::new("t", ["a", "b"])]);
        assert!(!params.main);
        assert_eq!(params.results, ResultShape::Table);
    }

    #[test]
    fn test_single_import_string() {
        let params = Params::from_json(r#"{"imports": "fmt"}"#).unwrap();
        assert_eq!(params.imports, vec!["fmt"]);

        let params = Params::from_json(r#"{"imports": null}"#).unwrap();
        assert!(params.imports.is_empty());
    }

    #[test]
    fn test_session_values() {
        let mut params = Params::new("");
        params.session = Some("none".to_string());
        assert!(!params.wants_session());
        params.session = Some("*go*".to_string());
        assert!(params.wants_session());
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        assert!(Params::from_json(r#"{"bodyy": ""}"#).is_err());
    }
}
