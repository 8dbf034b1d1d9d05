//! Error types for query parsing and execution.

use std::path::PathBuf;

use crate::query::CompareOp;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Parse error at position {position}: {message}")]
    Parse { message: String, position: usize },

    #[error("Empty query")]
    EmptyInput,

    #[error("Unknown field: \"{0}\"")]
    UnknownField(String),

    #[error("Field \"{field}\" does not support the {op} comparison")]
    ComparisonUnsupported { field: String, op: CompareOp },

    #[error("Invalid value \"{value}\" for field \"{field}\"")]
    InvalidValue { field: String, value: String },

    #[error("Invalid LIKE pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Cannot resolve path \"{path}\": {reason}")]
    PathResolution { path: String, reason: String },

    #[error("Cannot access {}: {source}", path.display())]
    FilesystemAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn parse(message: impl Into<String>, position: usize) -> Self {
        Error::Parse {
            message: message.into(),
            position,
        }
    }

    pub(crate) fn fs(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::FilesystemAccess {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
