//! Draft reference model

use serde::{Deserialize, Serialize};

/// One remote-side staged version of a document.
///
/// Rows are append-only: an UPDATE action mutates the remote resource
/// behind `token` but never rewrites an existing row. The row with the
/// highest `id` for a path is the authoritative "latest draft".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftRef {
    /// Local autoincrement id (ordering within a document's history)
    pub id: i64,
    /// Owning document path
    pub document_path: String,
    /// Opaque remote draft token
    pub token: String,
    /// Creation timestamp (Unix ms)
    pub created_at: i64,
}
