// src/error.rs
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("duplicate area label: {0}")]
    DuplicateLabel(String),

    #[error("unknown area label: {0}")]
    UnknownLabel(String),

    #[error("self edges are not supported: {0}")]
    SelfEdgeNotSupported(String),

    #[error("malformed layout: {reason} (path: {path})")]
    MalformedLayout { reason: String, path: PathBuf },

    #[error("malformed config: {reason} (path: {path})")]
    MalformedConfig { reason: String, path: PathBuf },

    #[error("invalid timestamp: {0:?}")]
    InvalidTimestamp(String),

    #[error("invalid weight: {0:?}")]
    InvalidWeight(String),

    #[error("corrupt artifact: {reason} (path: {path})")]
    CorruptArtifact { reason: String, path: PathBuf },

    #[error("I/O error: {source} (path: {path})")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },
}

impl FlowError {
    pub(crate) fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        FlowError::Io {
            source,
            path: path.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FlowError>;

/// Artifact persistence failure, reported to the caller instead of raised.
///
/// A failed persist never invalidates the freshly built in-memory graph.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to write artifact: {source} (path: {path})")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("failed to serialize artifact: {0}")]
    Serialize(#[from] serde_json::Error),
}
