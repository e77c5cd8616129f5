// Licensed under the Apache-2.0 license

use std::path::PathBuf;
use thiserror::Error;

/// Problems found while validating an elaborated tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("{path}: property '{key}' has unsupported value '{value}'")]
    BadProperty {
        path: String,
        key: &'static str,
        value: String,
    },
    #[error("{path}: field bits [{msb}:{lsb}] do not fit a {regwidth}-bit register")]
    FieldRange {
        path: String,
        lsb: u32,
        msb: u32,
        regwidth: u32,
    },
    #[error("{path}: fields '{first}' and '{second}' overlap")]
    FieldOverlap {
        path: String,
        first: String,
        second: String,
    },
    #[error("{path}: array dimensions must be non-empty, non-zero and fit a 64-bit address space")]
    BadArray { path: String },
    #[error("{path}: {kind} nodes cannot contain {what}")]
    BadNesting {
        path: String,
        kind: &'static str,
        what: &'static str,
    },
}

/// Errors that abort an export call.
#[derive(Error, Debug)]
pub enum ExportError {
    /// The exporter was handed a node it cannot start from.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A design feature the target format cannot represent unambiguously.
    #[error("structural incompatibility: {0}")]
    StructuralIncompatibility(String),

    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid model: {0}")]
    Model(#[from] ModelError),

    #[error("malformed design document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML serialization failed: {0}")]
    Xml(String),

    #[error("{0}")]
    Fatal(String),
}

impl ExportError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ExportError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for export operations.
pub type ExportResult<T> = std::result::Result<T, ExportError>;
