//! Type inference from host values to Go types.
//!
//! Classification is a three-way choice of base type plus an arity.
//! Tables are recognized by shape alone and always get a string grid.

use crate::error::GenerateError;
use crate::value::DynamicValue;

/// Go base type a value maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BaseType {
    // Declaration order is reduction precedence, lowest first
    Int,
    Float32,
    StringT,
}

impl BaseType {
    /// Go type name
    pub fn go_name(&self) -> &'static str {
        match self {
            BaseType::Int => "int",
            BaseType::Float32 => "float32",
            BaseType::StringT => "string",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arity {
    Scalar,
    Vector,
    Table,
}

impl Arity {
    /// Declaration prefix in front of the base type name
    pub fn prefix(&self) -> &'static str {
        match self {
            Arity::Scalar => "",
            Arity::Vector => "[]",
            Arity::Table => "[][]",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InferredType {
    pub base: BaseType,
    pub arity: Arity,
}

impl InferredType {
    pub const fn new(base: BaseType, arity: Arity) -> Self {
        Self { base, arity }
    }

    pub const fn scalar(base: BaseType) -> Self {
        Self::new(base, Arity::Scalar)
    }

    /// Full Go type, e.g. `[]float32`
    pub fn go_type(&self) -> String {
        format!("{}{}", self.arity.prefix(), self.base.go_name())
    }
}

/// Classify a value, falling back to `string` for anything without a better fit.
pub fn classify(value: &DynamicValue) -> InferredType {
    match value {
        DynamicValue::Sequence(_) if value.is_table() => {
            InferredType::new(BaseType::StringT, Arity::Table)
        }
        DynamicValue::Sequence(items) => InferredType::new(vector_base(items), Arity::Vector),
        other => InferredType::scalar(scalar_base(other)),
    }
}

/// Base type of a single (non-sequence) value
pub fn scalar_base(value: &DynamicValue) -> BaseType {
    match value {
        DynamicValue::Integer(_) => BaseType::Int,
        DynamicValue::Float(_) => BaseType::Float32,
        _ => BaseType::StringT,
    }
}

/// Reduce element types: string beats float beats int, and empty is int.
fn vector_base(items: &[DynamicValue]) -> BaseType {
    items
        .iter()
        .map(scalar_base)
        .max()
        .unwrap_or(BaseType::Int)
}

/// Like [`classify`], but reject values whose Go type would be a guess.
pub fn classify_strict(value: &DynamicValue) -> Result<InferredType, GenerateError> {
    match value {
        DynamicValue::Sequence(rows) if value.is_table() => {
            for row in rows {
                let DynamicValue::Sequence(cells) = row else {
                    return Err(GenerateError::unsupported(value, "table row is not a sequence"));
                };
                if let Some(cell) = cells.iter().find(|c| !matches!(c, DynamicValue::String(_))) {
                    return Err(GenerateError::unsupported(
                        value,
                        format!("table cell `{}` is not a string", cell),
                    ));
                }
            }
            Ok(InferredType::new(BaseType::StringT, Arity::Table))
        }
        DynamicValue::Sequence(items) => {
            if items.iter().any(DynamicValue::is_sequence) {
                return Err(GenerateError::unsupported(value, "vector mixes sequences and scalars"));
            }
            for item in items {
                check_scalar(item).map_err(|_| {
                    GenerateError::unsupported(value, format!("element `{}` has no Go type", item))
                })?;
            }
            let base = vector_base(items);
            if items.iter().any(|item| scalar_base(item) != base) {
                return Err(GenerateError::unsupported(value, "vector mixes element types"));
            }
            Ok(InferredType::new(base, Arity::Vector))
        }
        other => {
            check_scalar(other)?;
            Ok(InferredType::scalar(scalar_base(other)))
        }
    }
}

fn check_scalar(value: &DynamicValue) -> Result<(), GenerateError> {
    match value {
        DynamicValue::Integer(_) | DynamicValue::Float(_) | DynamicValue::String(_) => Ok(()),
        _ => Err(GenerateError::unsupported(value, "no Go type for this host value")),
    }
}
