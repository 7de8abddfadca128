//! Typed failures raised while reading and transforming compiler artifacts

use std::path::PathBuf;

/// Errors that callers may want to tell apart from generic I/O failures
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// A referenced input file or directory does not exist
    #[error("Input not found: {}", path.display())]
    MissingInput { path: PathBuf },

    /// An input file is not valid JSON, or not the JSON shape we expect
    #[error("Failed to parse {}: {source}", path.display())]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A field the requested operation cannot do without is absent
    #[error("{context}: missing required field `{field}`")]
    MissingField { context: String, field: String },

    /// A value is present but has the wrong JSON type
    #[error("{context}: expected {expected}")]
    UnexpectedShape { context: String, expected: String },

    /// The metadata string embedded in an artifact is not valid JSON
    #[error("Invalid contract metadata: {source}")]
    InvalidMetadata {
        #[source]
        source: serde_json::Error,
    },

    /// Deployed bytecode that cannot be normalized
    #[error("Invalid bytecode for {contract}: {reason}")]
    InvalidBytecode { contract: String, reason: String },
}

impl ToolError {
    pub(crate) fn missing_field(context: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingField { context: context.into(), field: field.into() }
    }
}
