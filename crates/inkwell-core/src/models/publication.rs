//! Publication record model

use serde::{Deserialize, Serialize};

/// Local record of a successful publish submission.
///
/// Created when a publish call succeeds; deleted only after the caller has
/// confirmed successful remote un-publication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationRecord {
    /// Local autoincrement id
    pub id: i64,
    /// Owning draft row id
    pub draft_id: i64,
    /// Opaque remote publication token
    pub token: String,
    /// Submission timestamp (Unix ms)
    pub created_at: i64,
}
