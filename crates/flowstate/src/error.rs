//! Error types.

use std::path::PathBuf;

use flowstate_json_patch::PatchError;
use flowstate_json_pointer::JsonPointerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("CONFIG_IO: {0}")]
    Io(#[from] std::io::Error),
    #[error("CONFIG_PARSE: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("CONFIG_INVALID: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("PROJECT_IO: {0}")]
    Io(#[from] std::io::Error),
    #[error("PROJECT_JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("PROJECT_FORMAT: {0}")]
    Format(String),
    #[error("PROJECT_PATCH: {0}")]
    Patch(#[from] PatchError),
    #[error("UNKNOWN_EXTENSION: {}", .0.display())]
    UnknownExtension(PathBuf),
}

/// The action queue's receiving side is gone.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("QUEUE_CLOSED")]
pub struct QueueClosed;

/// Top-level error for [`Store`](crate::Store) operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Project(#[from] ProjectError),
    #[error(transparent)]
    Patch(#[from] PatchError),
    #[error(transparent)]
    Pointer(#[from] JsonPointerError),
    #[error(transparent)]
    Queue(#[from] QueueClosed),
}
