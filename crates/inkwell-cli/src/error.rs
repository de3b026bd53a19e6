//! CLI error type

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] inkwell_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Missing configuration: set {0} (or add it to .env)")]
    MissingConfig(&'static str),
    #[error("No such document: {0}")]
    DocumentNotFound(PathBuf),
    #[error("Aborted")]
    Aborted,
    #[error("{failed} of {total} documents failed to sync")]
    DocumentsFailed { failed: usize, total: usize },
}
