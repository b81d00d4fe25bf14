//! Name-based cell access for table variables.

use serde::Deserialize;

use crate::bind::{Binding, check_identifier};
use crate::error::{GenerateError, NameKind};
use crate::format::quote;
use crate::value::DynamicValue;

/// Column names of one bound table
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ColumnSpec {
    pub table: String,
    pub columns: Vec<String>,
}

impl ColumnSpec {
    pub fn new<S: Into<String>>(table: impl Into<String>, columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            table: table.into(),
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }
}

/// Name of the shared header lookup function
pub const LOOKUP_FN: &str = "get_column_num";

/// The lookup shared by every accessor. Emitted once per program.
pub fn utility_function_text() -> String {
    format!(
        "func {LOOKUP_FN}(header []string, column string) int {{\n\
         \tfor i, name := range header {{\n\
         \t\tif name == column {{\n\
         \t\t\treturn i\n\
         \t\t}}\n\
         \t}}\n\
         \treturn -1\n\
         }}\n"
    )
}

/// Header array declaration and accessor function for one table
pub fn accessor_pair_for(spec: &ColumnSpec) -> Result<(String, String), GenerateError> {
    check_identifier(NameKind::Table, &spec.table)?;

    let table = &spec.table;
    let columns: Vec<String> = spec.columns.iter().map(|c| quote(c)).collect();
    let header = format!("var {table}_header = []string{{{}}}\n", columns.join(","));
    let helper = format!(
        "func {table}_helper(row int, col string) string {{\n\
         \treturn {table}[row][{LOOKUP_FN}({table}_header, col)]\n\
         }}\n"
    );
    Ok((header, helper))
}

/// Everything the table-helper section holds, or `None` without specs
pub fn helpers_text(specs: &[ColumnSpec]) -> Result<Option<String>, GenerateError> {
    if specs.is_empty() {
        return Ok(None);
    }

    let mut out = utility_function_text();
    for spec in specs {
        let (header, helper) = accessor_pair_for(spec)?;
        out.push_str(&header);
        out.push_str(&helper);
    }
    Ok(Some(out))
}

/// Strip header rows off table bindings, returning a spec for each stripped table.
///
/// Tables already named in `existing` keep their first row.
pub fn take_header_rows(bindings: &mut [Binding], existing: &[ColumnSpec]) -> Vec<ColumnSpec> {
    let mut specs = Vec::new();

    for binding in bindings.iter_mut() {
        if existing.iter().any(|spec| spec.table == binding.name) || !binding.value.is_table() {
            continue;
        }
        let DynamicValue::Sequence(rows) = &mut binding.value else {
            continue;
        };
        let columns = match rows.first() {
            Some(DynamicValue::Sequence(cells)) if cells.iter().all(|c| !c.is_sequence()) => {
                cells.iter().map(ToString::to_string).collect::<Vec<_>>()
            }
            _ => continue,
        };
        rows.remove(0);
        specs.push(ColumnSpec {
            table: binding.name.clone(),
            columns,
        });
    }

    specs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utility_function() {
        let text = utility_function_text();
        assert!(text.starts_with("func get_column_num(header []string, column string) int {\n"));
        assert!(text.contains("\treturn -1\n"));
        assert!(text.ends_with("}\n"));
    }

    #[test]
    fn test_accessor_pair() {
        let (header, helper) = accessor_pair_for(&ColumnSpec::new("t", ["a", "b"])).unwrap();
        assert_eq!(header, "var t_header = []string{\"a\",\"b\"}\n");
        assert_eq!(
            helper,
            "func t_helper(row int, col string) string {\n\treturn t[row][get_column_num(t_header, col)]\n}\n"
        );
    }

    #[test]
    fn test_helpers_emit_utility_once() {
        let specs = vec![ColumnSpec::new("a", ["x"]), ColumnSpec::new("b", ["y"])];
        let text = helpers_text(&specs).unwrap().unwrap();
        assert_eq!(text.matches("func get_column_num").count(), 1);
        assert!(text.contains("func a_helper"));
        assert!(text.contains("func b_helper"));
    }

    #[test]
    fn test_no_specs_no_helpers() {
        assert_eq!(helpers_text(&[]).unwrap(), None);
    }

    #[test]
    fn test_invalid_table_name() {
        assert!(accessor_pair_for(&ColumnSpec::new("my table", ["a"])).is_err());
    }

    #[test]
    fn test_take_header_rows() {
        let mut bindings = vec![
            Binding::new(
                "t",
                DynamicValue::Sequence(vec![
                    vec!["a", "b"].into(),
                    vec![1i64, 2].into(),
                ]),
            ),
            Binding::new("n", 3i64),
        ];

        let specs = take_header_rows(&mut bindings, &[]);
        assert_eq!(specs, vec![ColumnSpec::new("t", ["a", "b"])]);
        assert_eq!(bindings[0].value, DynamicValue::from(vec![vec![1i64, 2]]));
        assert_eq!(bindings[1].value, DynamicValue::Integer(3));
    }

    #[test]
    fn test_take_header_rows_skips_explicit_specs() {
        let mut bindings = vec![Binding::new("t", vec![vec!["a"], vec!["b"]])];
        let existing = vec![ColumnSpec::new("t", ["col"])];
        assert!(take_header_rows(&mut bindings, &existing).is_empty());
        assert_eq!(bindings[0].value, DynamicValue::from(vec![vec!["a"], vec!["b"]]));
    }
}
