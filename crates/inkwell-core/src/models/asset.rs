//! Asset cache entry model

use serde::{Deserialize, Serialize};

/// Content-addressed cache row for an uploaded media asset.
///
/// Keyed by the canonical locator (resolved absolute path for local files,
/// the URL itself for remote files). Upserted on every fresh upload; read
/// without mutation on cache hits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetCacheEntry {
    /// Canonical asset locator
    pub locator: String,
    /// Hex-encoded hash of the raw bytes last uploaded
    pub content_hash: String,
    /// Opaque remote media reference
    pub media_ref: String,
    /// Remote-accessible URL for the uploaded asset
    pub url: String,
    /// Last upload timestamp (Unix ms)
    pub updated_at: i64,
}

impl AssetCacheEntry {
    /// Build a fresh entry for an asset that was just uploaded.
    #[must_use]
    pub fn new(
        locator: impl Into<String>,
        content_hash: impl Into<String>,
        media_ref: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            locator: locator.into(),
            content_hash: content_hash.into(),
            media_ref: media_ref.into(),
            url: url.into(),
            updated_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}
