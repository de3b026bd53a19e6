//! Error types for inkwell-core

use thiserror::Error;

/// Result type alias using inkwell-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in inkwell-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Unsupported or unreadable asset binary format; fatal to the
    /// document being synced, not to the batch
    #[error("Unsupported asset format: {0}")]
    Format(String),

    /// Transient remote failure that survived retries (rate limit, 5xx)
    #[error("Transient remote error: {0}")]
    TransientRemote(String),

    /// Permanent remote failure (auth, validation); never retried
    #[error("Remote API error: {0}")]
    PermanentRemote(String),

    /// Local persistence failure; fatal to the entire run
    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),

    /// The remote existence check could not produce a definitive answer
    #[error("Existence check failed: {0}")]
    ExistenceCheck(String),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Front matter could not be parsed
    #[error("Front matter error: {0}")]
    FrontMatter(#[from] serde_yaml::Error),

    /// Entity not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error must abort the whole run rather than just the
    /// current document. Only store corruption qualifies; everything else
    /// is contained at the per-document boundary.
    #[must_use]
    pub const fn is_fatal_to_run(&self) -> bool {
        matches!(self, Self::Store(_))
    }
}
