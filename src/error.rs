use std::fmt;
use std::time::Duration;

/// What kind of name failed identifier validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    Variable,
    Table,
    Package,
}

impl NameKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NameKind::Variable => "variable",
            NameKind::Table => "table",
            NameKind::Package => "package",
        }
    }
}

impl fmt::Display for NameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error during source generation. No partial text is ever returned alongside one.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerateError {
    /// A value has no unambiguous Go type (strict mode only)
    #[error("unsupported type for {value}: {reason}")]
    UnsupportedType { value: String, reason: String },

    /// The caller asked for something generation cannot provide
    #[error("{0}")]
    Capability(String),

    /// A name that would be emitted as a Go identifier is not one
    #[error("invalid {kind} name `{name}`: not a Go identifier")]
    InvalidIdentifier { kind: NameKind, name: String },
}

impl GenerateError {
    pub fn unsupported(value: impl fmt::Display, reason: impl Into<String>) -> Self {
        GenerateError::UnsupportedType {
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub fn sessions_unsupported() -> Self {
        GenerateError::Capability("sessions are not supported for Go".to_string())
    }
}

/// Error while running a generated program
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("failed to run `{command}`: {source}")]
    Io {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("program exited with {status}:\n{stderr}")]
    Failed { status: String, stderr: String },

    #[error("program timed out after {0:?}")]
    Timeout(Duration),
}

/// Error reading a processed-parameters record
#[derive(Debug, thiserror::Error)]
pub enum ParamsError {
    #[error("invalid parameters: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_identifier_message() {
        let err = GenerateError::InvalidIdentifier {
            kind: NameKind::Table,
            name: "1rows".to_string(),
        };
        assert_eq!(err.to_string(), "invalid table name `1rows`: not a Go identifier");
    }

    #[test]
    fn test_session_message() {
        assert_eq!(
            GenerateError::sessions_unsupported().to_string(),
            "sessions are not supported for Go"
        );
    }
}
