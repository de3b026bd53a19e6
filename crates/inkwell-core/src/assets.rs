//! Asset resolution engine.
//!
//! Resolves embedded asset locators (local paths or URLs) to remote media
//! references, reusing the content-addressed cache when the stored hash
//! matches and the remote still has the media. A stale or missing cache
//! entry triggers a fresh upload and an upsert.

use std::path::Path;

use sha2::{Digest, Sha256};

use crate::db::SyncStore;
use crate::error::{Error, Result};
use crate::models::AssetCacheEntry;
use crate::remote::RemoteApi;

/// Output of resolving one asset locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
    /// Opaque remote media reference
    pub media_ref: String,
    /// Remote-accessible URL to substitute into the body
    pub url: String,
}

/// Resolves asset locators against the cache and the remote store.
pub struct AssetResolver<'a, S: SyncStore, R: RemoteApi> {
    store: &'a S,
    remote: &'a R,
}

impl<'a, S: SyncStore, R: RemoteApi> AssetResolver<'a, S, R> {
    pub const fn new(store: &'a S, remote: &'a R) -> Self {
        Self { store, remote }
    }

    /// Resolve a locator found in a document under `document_dir`.
    ///
    /// Local paths are resolved relative to the document's directory; an
    /// unsupported binary format is a hard failure for the document.
    pub async fn resolve(&self, locator: &str, document_dir: &Path) -> Result<ResolvedAsset> {
        let (canonical, bytes) = self.load(locator, document_dir).await?;

        let format = image::guess_format(&bytes)
            .map_err(|_| Error::Format(format!("not a supported image: {locator}")))?;
        let mime_type = format.to_mime_type();

        let content_hash = hash_bytes(&bytes);

        if let Some(entry) = self.store.find_asset(&canonical)? {
            if entry.content_hash == content_hash && self.media_is_live(&entry.media_ref).await {
                tracing::debug!(locator = %canonical, "asset cache hit");
                return Ok(ResolvedAsset {
                    media_ref: entry.media_ref,
                    url: entry.url,
                });
            }
        }

        let filename = file_name_for(locator);
        let uploaded = self
            .remote
            .upload_asset(&bytes, &filename, mime_type)
            .await?;
        tracing::info!(locator = %canonical, media_ref = %uploaded.media_ref, "uploaded asset");

        let entry = AssetCacheEntry::new(
            &canonical,
            content_hash,
            &uploaded.media_ref,
            &uploaded.url,
        );
        self.store.upsert_asset(&entry)?;

        Ok(ResolvedAsset {
            media_ref: uploaded.media_ref,
            url: uploaded.url,
        })
    }

    /// Read asset bytes, returning the canonical locator alongside them.
    async fn load(&self, locator: &str, document_dir: &Path) -> Result<(String, Vec<u8>)> {
        if locator.starts_with("http://") || locator.starts_with("https://") {
            let bytes = self.remote.fetch_bytes(locator).await?;
            return Ok((locator.to_string(), bytes));
        }

        let joined = document_dir.join(locator);
        let canonical = std::fs::canonicalize(&joined).unwrap_or(joined);
        let bytes = tokio::fs::read(&canonical).await?;
        Ok((canonical.to_string_lossy().into_owned(), bytes))
    }

    /// Best-effort liveness check; an indefinite answer counts as gone so
    /// we re-upload rather than reference a possibly deleted media.
    async fn media_is_live(&self, media_ref: &str) -> bool {
        match self.remote.check_asset_exists(media_ref).await {
            Ok(live) => live,
            Err(error) => {
                tracing::warn!(%media_ref, %error, "asset existence check failed, treating as gone");
                false
            }
        }
    }
}

fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Last path/URL segment, used as the upload filename.
fn file_name_for(locator: &str) -> String {
    locator
        .rsplit(['/', '\\'])
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or("asset")
        .to_string()
}
