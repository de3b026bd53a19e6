//! Remote CMS API surface.
//!
//! The sync engine consumes the remote backend through the [`RemoteApi`]
//! trait; [`client::HttpRemoteClient`] is the production implementation.

mod client;

pub use client::{HttpRemoteClient, RemoteConfig};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::ResolvedDocument;

/// Reference and URL returned by a successful media upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedMedia {
    /// Opaque remote media reference
    pub media_ref: String,
    /// Remote-accessible URL for the uploaded bytes
    pub url: String,
}

/// Remote status of a publication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublicationStatus {
    /// Publicly visible
    Live,
    /// Submitted, awaiting remote processing
    Pending,
    /// Any status this client does not recognize
    #[serde(other)]
    Unknown,
}

/// One entry from the remote draft listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftSummary {
    pub token: String,
    pub title: String,
}

/// One entry from the remote publication listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationSummary {
    pub token: String,
    pub title: String,
    pub status: PublicationStatus,
}

/// Client capability required by the sync engine.
///
/// Retry/backoff for transient failures is this layer's responsibility;
/// callers only ever see exhausted-retry errors.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// Create a new remote draft, returning its token
    async fn create_draft(&self, resolved: &ResolvedDocument) -> Result<String>;

    /// Overwrite the remote draft behind an existing token
    async fn update_draft(&self, token: &str, resolved: &ResolvedDocument) -> Result<()>;

    /// Fetch the live representation behind a token; `None` signals the
    /// draft is gone (used by the existence oracle)
    async fn get_draft(&self, token: &str) -> Result<Option<ResolvedDocument>>;

    /// Submit a draft for publication, returning the publication token
    async fn publish(&self, token: &str) -> Result<String>;

    /// Remote status of a publication token
    async fn get_publication_status(&self, token: &str) -> Result<PublicationStatus>;

    /// Upload raw asset bytes, returning the media reference and URL
    async fn upload_asset(
        &self,
        bytes: &[u8],
        filename: &str,
        mime_type: &str,
    ) -> Result<UploadedMedia>;

    /// Whether a previously uploaded media reference still resolves
    async fn check_asset_exists(&self, media_ref: &str) -> Result<bool>;

    /// Delete a publication remotely
    async fn delete_publication(&self, token: &str) -> Result<()>;

    /// Delete a draft remotely
    async fn delete_draft(&self, token: &str) -> Result<()>;

    /// Page through remote drafts
    async fn list_drafts(&self, offset: u32, count: u32) -> Result<Vec<DraftSummary>>;

    /// Page through remote publications
    async fn list_publications(&self, offset: u32, count: u32) -> Result<Vec<PublicationSummary>>;

    /// Fetch raw bytes from an arbitrary URL (remote asset locators)
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>>;
}
