use thiserror::Error;

use crate::network::kind::NetworkKind;

/// Every failure the engine can report. All of them are programming or data
/// errors surfaced synchronously to the caller; nothing here is transient.
#[derive(Debug, Error)]
pub enum NeuroError {
    #[error("{role} node index {index} out of bounds (count {count})")]
    IndexOutOfRange {
        role: &'static str,
        index: usize,
        count: usize,
    },

    #[error("cannot load data, invalid format: expected {expected:?} tag {}, found {found}", .expected.tag())]
    FormatMismatch { expected: NetworkKind, found: f64 },

    #[error("flat buffer ended at position {position}")]
    UnexpectedEnd { position: usize },

    #[error("invalid count value {value} in flat buffer")]
    InvalidCount { value: f64 },

    #[error("{field} mismatch: topology needs {expected}, buffer declares {found}")]
    CountMismatch {
        field: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("invalid topology: {0}")]
    InvalidTopology(String),

    #[error("{what} length mismatch: expected {expected}, found {found}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, NeuroError>;
