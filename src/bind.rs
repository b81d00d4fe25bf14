use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

use crate::error::{GenerateError, NameKind};
use crate::format::format;
use crate::infer::{InferredType, classify, classify_strict};
use crate::value::DynamicValue;

lazy_static! {
    static ref GO_IDENTIFIER: Regex = Regex::new(r"^[\p{L}_][\p{L}\p{Nd}_]*$").unwrap();
}

const GO_KEYWORDS: &[&str] = &[
    "break", "case", "chan", "const", "continue", "default", "defer", "else",
    "fallthrough", "for", "func", "go", "goto", "if", "import", "interface",
    "map", "package", "range", "return", "select", "struct", "switch", "type", "var",
];

/// A host variable to declare in the generated program
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Binding {
    pub name: String,
    pub value: DynamicValue,
}

impl Binding {
    pub fn new(name: impl Into<String>, value: impl Into<DynamicValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Whether `name` can be used verbatim as a Go identifier.
///
/// Go admits letters (category L), decimal digits (category Nd) and `_`.
pub fn is_go_identifier(name: &str) -> bool {
    GO_IDENTIFIER.is_match(name) && !GO_KEYWORDS.contains(&name)
}

pub fn check_identifier(kind: NameKind, name: &str) -> Result<(), GenerateError> {
    if is_go_identifier(name) {
        Ok(())
    } else {
        Err(GenerateError::InvalidIdentifier {
            kind,
            name: name.to_string(),
        })
    }
}

/// `var <name> <type> = <literal>`
pub fn bind(binding: &Binding, strict: bool) -> Result<String, GenerateError> {
    let ty: InferredType = if strict {
        classify_strict(&binding.value)?
    } else {
        classify(&binding.value)
    };
    declare(binding, ty)
}

/// Declare `binding` with an already chosen type
pub fn declare(binding: &Binding, ty: InferredType) -> Result<String, GenerateError> {
    check_identifier(NameKind::Variable, &binding.name)?;
    let formatted = format(ty, &binding.value)?;

    Ok(format!(
        "var {} {}{} = {}",
        binding.name,
        formatted.prefix,
        ty.base.go_name(),
        formatted.literal
    ))
}
