//! Document model

use serde::{Deserialize, Serialize};

/// A tracked document, identified by its local path.
///
/// The path is the stable identity; the fingerprint is the hash of the
/// document's last successfully synced resolved representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Local path identity (normalized, as given to the sync engine)
    pub path: String,
    /// Fingerprint of the last synced resolved representation
    pub fingerprint: String,
    /// Last update timestamp (Unix ms)
    pub updated_at: i64,
}

impl Document {
    /// Create a document record for a freshly synced path.
    #[must_use]
    pub fn new(path: impl Into<String>, fingerprint: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            fingerprint: fingerprint.into(),
            updated_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}
