use serde::{Deserialize, Serialize, Serializer};
use serde::ser::{SerializeMap, SerializeSeq};
use std::fmt;

/// A value as the host hands it over
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "serde_json::Value")]
pub enum DynamicValue {
    Integer(i64),
    Float(f64),
    String(String),
    Sequence(Vec<DynamicValue>),

    // Host kinds with no Go counterpart of their own
    Bool(bool),
    Symbol(String),
    Nil,
}

impl DynamicValue {
    /// A sequence whose first element is itself a sequence
    pub fn is_table(&self) -> bool {
        matches!(self, DynamicValue::Sequence(items) if matches!(items.first(), Some(DynamicValue::Sequence(_))))
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self, DynamicValue::Sequence(_))
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        DynamicValue::Symbol(name.into())
    }
}

impl fmt::Display for DynamicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DynamicValue::Integer(i) => write!(f, "{}", i),
            DynamicValue::Float(x) => write!(f, "{:?}", x),
            DynamicValue::String(s) => f.write_str(s),
            DynamicValue::Bool(b) => write!(f, "{}", b),
            DynamicValue::Symbol(name) => f.write_str(name),
            DynamicValue::Nil => f.write_str("nil"),
            DynamicValue::Sequence(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<serde_json::Value> for DynamicValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => DynamicValue::Nil,
            Value::Bool(b) => DynamicValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => DynamicValue::Integer(i),
                // u64 beyond i64 range and every non-integer land here
                None => DynamicValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => DynamicValue::String(s),
            Value::Array(items) => {
                DynamicValue::Sequence(items.into_iter().map(DynamicValue::from).collect())
            }
            Value::Object(map) => {
                if map.len() == 1 {
                    if let Some(Value::String(name)) = map.get("symbol") {
                        return DynamicValue::Symbol(name.clone());
                    }
                }
                DynamicValue::Symbol(Value::Object(map).to_string())
            }
        }
    }
}

impl Serialize for DynamicValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DynamicValue::Integer(i) => serializer.serialize_i64(*i),
            DynamicValue::Float(x) => serializer.serialize_f64(*x),
            DynamicValue::String(s) => serializer.serialize_str(s),
            DynamicValue::Bool(b) => serializer.serialize_bool(*b),
            DynamicValue::Nil => serializer.serialize_unit(),
            DynamicValue::Symbol(name) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("symbol", name)?;
                map.end()
            }
            DynamicValue::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

impl From<i64> for DynamicValue {
    fn from(i: i64) -> Self {
        DynamicValue::Integer(i)
    }
}

impl From<f64> for DynamicValue {
    fn from(x: f64) -> Self {
        DynamicValue::Float(x)
    }
}

impl From<&str> for DynamicValue {
    fn from(s: &str) -> Self {
        DynamicValue::String(s.to_string())
    }
}

impl From<String> for DynamicValue {
    fn from(s: String) -> Self {
        DynamicValue::String(s)
    }
}

impl From<bool> for DynamicValue {
    fn from(b: bool) -> Self {
        DynamicValue::Bool(b)
    }
}

impl<T: Into<DynamicValue>> From<Vec<T>> for DynamicValue {
    fn from(items: Vec<T>) -> Self {
        DynamicValue::Sequence(items.into_iter().map(Into::into).collect())
    }
}
