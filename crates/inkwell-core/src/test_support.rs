//! Shared test doubles for engine and asset tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::models::ResolvedDocument;
use crate::remote::{
    DraftSummary, PublicationStatus, PublicationSummary, RemoteApi, UploadedMedia,
};

/// Minimal valid PNG header bytes; `image::guess_format` only inspects the
/// magic, so this is enough for format validation in tests.
pub fn png_bytes() -> Vec<u8> {
    let mut bytes = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    bytes.extend_from_slice(b"IHDR-test-payload");
    bytes
}

#[derive(Default)]
struct MockState {
    next_id: u64,
    drafts: HashMap<String, ResolvedDocument>,
    media: HashSet<String>,
    fetch_stubs: HashMap<String, Vec<u8>>,
    uploads: usize,
    updates: usize,
    published: Vec<String>,
    deleted_publications: Vec<String>,
}

/// Scripted in-memory `RemoteApi` that records calls.
#[derive(Default)]
pub struct MockRemote {
    state: Mutex<MockState>,
    fail_existence: AtomicBool,
    fail_publish: AtomicBool,
}

impl MockRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upload_count(&self) -> usize {
        self.state.lock().unwrap().uploads
    }

    pub fn update_count(&self) -> usize {
        self.state.lock().unwrap().updates
    }

    pub fn publish_count(&self) -> usize {
        self.state.lock().unwrap().published.len()
    }

    pub fn deleted_publications(&self) -> Vec<String> {
        self.state.lock().unwrap().deleted_publications.clone()
    }

    /// Simulate out-of-band deletion of a remote draft.
    pub fn kill_draft(&self, token: &str) {
        self.state.lock().unwrap().drafts.remove(token);
    }

    /// Simulate out-of-band deletion of uploaded media.
    pub fn forget_media(&self, media_ref: &str) {
        self.state.lock().unwrap().media.remove(media_ref);
    }

    /// Make every existence check return an error instead of an answer.
    pub fn fail_existence_checks(&self, fail: bool) {
        self.fail_existence.store(fail, Ordering::SeqCst);
    }

    /// Make every publish call fail.
    pub fn fail_publishes(&self, fail: bool) {
        self.fail_publish.store(fail, Ordering::SeqCst);
    }

    pub fn stub_fetch(&self, url: &str, bytes: Vec<u8>) {
        self.state
            .lock()
            .unwrap()
            .fetch_stubs
            .insert(url.to_string(), bytes);
    }

    fn next_token(&self, prefix: &str) -> String {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        format!("{prefix}-{}", state.next_id)
    }
}

#[async_trait]
impl RemoteApi for MockRemote {
    async fn create_draft(&self, resolved: &ResolvedDocument) -> Result<String> {
        let token = self.next_token("d");
        self.state
            .lock()
            .unwrap()
            .drafts
            .insert(token.clone(), resolved.clone());
        Ok(token)
    }

    async fn update_draft(&self, token: &str, resolved: &ResolvedDocument) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if !state.drafts.contains_key(token) {
            return Err(Error::PermanentRemote(format!("no draft {token} (404)")));
        }
        state.drafts.insert(token.to_string(), resolved.clone());
        state.updates += 1;
        Ok(())
    }

    async fn get_draft(&self, token: &str) -> Result<Option<ResolvedDocument>> {
        if self.fail_existence.load(Ordering::SeqCst) {
            return Err(Error::ExistenceCheck("simulated network failure".into()));
        }
        Ok(self.state.lock().unwrap().drafts.get(token).cloned())
    }

    async fn publish(&self, token: &str) -> Result<String> {
        if self.fail_publish.load(Ordering::SeqCst) {
            return Err(Error::PermanentRemote("publish rejected (409)".into()));
        }
        let publication = self.next_token("p");
        self.state
            .lock()
            .unwrap()
            .published
            .push(token.to_string());
        Ok(publication)
    }

    async fn get_publication_status(&self, _token: &str) -> Result<PublicationStatus> {
        Ok(PublicationStatus::Live)
    }

    async fn upload_asset(
        &self,
        _bytes: &[u8],
        filename: &str,
        _mime_type: &str,
    ) -> Result<UploadedMedia> {
        let media_ref = self.next_token("a");
        let url = format!("https://media.example.com/{media_ref}/{filename}");
        let mut state = self.state.lock().unwrap();
        state.uploads += 1;
        state.media.insert(media_ref.clone());
        Ok(UploadedMedia { media_ref, url })
    }

    async fn check_asset_exists(&self, media_ref: &str) -> Result<bool> {
        if self.fail_existence.load(Ordering::SeqCst) {
            return Err(Error::ExistenceCheck("simulated network failure".into()));
        }
        Ok(self.state.lock().unwrap().media.contains(media_ref))
    }

    async fn delete_publication(&self, token: &str) -> Result<()> {
        self.state
            .lock()
            .unwrap()
            .deleted_publications
            .push(token.to_string());
        Ok(())
    }

    async fn delete_draft(&self, token: &str) -> Result<()> {
        self.state.lock().unwrap().drafts.remove(token);
        Ok(())
    }

    async fn list_drafts(&self, offset: u32, count: u32) -> Result<Vec<DraftSummary>> {
        let state = self.state.lock().unwrap();
        let mut summaries: Vec<DraftSummary> = state
            .drafts
            .iter()
            .map(|(token, resolved)| DraftSummary {
                token: token.clone(),
                title: resolved.title.clone(),
            })
            .collect();
        summaries.sort_by(|a, b| a.token.cmp(&b.token));
        Ok(summaries
            .into_iter()
            .skip(offset as usize)
            .take(count as usize)
            .collect())
    }

    async fn list_publications(&self, offset: u32, count: u32) -> Result<Vec<PublicationSummary>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .published
            .iter()
            .skip(offset as usize)
            .take(count as usize)
            .map(|token| PublicationSummary {
                token: token.clone(),
                title: String::new(),
                status: PublicationStatus::Live,
            })
            .collect())
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        self.state
            .lock()
            .unwrap()
            .fetch_stubs
            .get(url)
            .cloned()
            .ok_or_else(|| Error::PermanentRemote(format!("no fetch stub for {url}")))
    }
}
