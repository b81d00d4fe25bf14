//! Go literal syntax for host values.

use crate::error::GenerateError;
use crate::infer::{Arity, BaseType, InferredType, scalar_base};
use crate::value::DynamicValue;

/// A rendered value: the declaration prefix (`""`, `"[]"`, `"[][]"`) and the literal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formatted {
    pub prefix: &'static str,
    pub literal: String,
}

/// Render `value` as a Go literal of type `ty`.
///
/// Vector elements all go through the vector's base rule. Table cells each go
/// through their own base rule even though the grid is declared `string`, so a
/// numeric cell comes out unquoted.
pub fn format(ty: InferredType, value: &DynamicValue) -> Result<Formatted, GenerateError> {
    if let Some(bad) = non_finite_float(value) {
        return Err(GenerateError::unsupported(bad, "Go has no literal for a non-finite float"));
    }

    let literal = match (ty.arity, value) {
        (Arity::Scalar, DynamicValue::Sequence(_)) => {
            return Err(GenerateError::unsupported(value, "sequence formatted as a scalar"));
        }
        (Arity::Scalar, scalar) => render_scalar(ty.base, scalar),
        (Arity::Vector, DynamicValue::Sequence(items)) => {
            let elements: Vec<String> = items.iter().map(|item| render_scalar(ty.base, item)).collect();
            format!("[]{}{{{}}}", ty.base.go_name(), elements.join(","))
        }
        (Arity::Table, DynamicValue::Sequence(rows)) => {
            let rows: Vec<String> = rows.iter().map(render_row).collect();
            format!("[][]string{{ {} }}", rows.join(", "))
        }
        (_, scalar) => {
            return Err(GenerateError::unsupported(scalar, "scalar formatted as a sequence"));
        }
    };

    Ok(Formatted {
        prefix: ty.arity.prefix(),
        literal,
    })
}

fn non_finite_float(value: &DynamicValue) -> Option<&DynamicValue> {
    match value {
        DynamicValue::Float(x) if !x.is_finite() => Some(value),
        DynamicValue::Sequence(items) => items.iter().find_map(non_finite_float),
        _ => None,
    }
}

fn render_row(row: &DynamicValue) -> String {
    let cells: Vec<String> = match row {
        DynamicValue::Sequence(cells) => cells.iter().map(render_cell).collect(),
        cell => vec![render_cell(cell)],
    };
    format!("[]string{{{}}}", cells.join(","))
}

fn render_cell(cell: &DynamicValue) -> String {
    render_scalar(scalar_base(cell), cell)
}

/// Apply one base type's rule to a single value
pub fn render_scalar(base: BaseType, value: &DynamicValue) -> String {
    match (base, value) {
        (BaseType::Int, DynamicValue::Integer(i)) => i.to_string(),
        (BaseType::Float32, DynamicValue::Integer(i)) => format!("{:.6}", *i as f64),
        (BaseType::Float32, DynamicValue::Float(x)) => format!("{:.6}", x),
        (BaseType::StringT, DynamicValue::String(s)) => quote(s),
        // Classification never pairs a numeric rule with a non-numeric value
        (_, other) => quote(&other.to_string()),
    }
}

/// Double-quoted Go string literal
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
