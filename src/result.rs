use serde::{Deserialize, Serialize};

use crate::value::DynamicValue;

/// How captured program output should come back to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ResultShape {
    /// The text as printed
    #[default]
    Raw,
    /// One number or string
    Scalar,
    /// Rows of cells, one row per line
    Table,
}

/// Turn captured stdout into a host value of the requested shape.
pub fn decode(output: &str, shape: ResultShape) -> DynamicValue {
    match shape {
        ResultShape::Raw => DynamicValue::String(output.to_string()),
        ResultShape::Scalar => read_scalar(output),
        ResultShape::Table => read_table(output),
    }
}

fn read_table(output: &str) -> DynamicValue {
    let tab_separated = output.contains('\t');

    let rows = output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let cells: Vec<DynamicValue> = if tab_separated {
                line.split('\t').map(read_scalar).collect()
            } else {
                line.split_whitespace().map(read_scalar).collect()
            };
            DynamicValue::Sequence(cells)
        })
        .collect();

    DynamicValue::Sequence(rows)
}

/// Integer, then float, then the trimmed text itself
pub fn read_scalar(text: &str) -> DynamicValue {
    let text = text.trim();
    if let Ok(i) = text.parse::<i64>() {
        return DynamicValue::Integer(i);
    }
    match text.parse::<f64>() {
        Ok(x) if x.is_finite() => DynamicValue::Float(x),
        _ => DynamicValue::String(text.to_string()),
    }
}
