//! Synchronization decision engine.
//!
//! For each document the engine derives a per-run state from the store and
//! the remote existence oracle, decides skip / create / update, executes
//! the remote call, and commits the outcome transactionally. Nothing is
//! cached across invocations; all state lives in the store.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::assets::AssetResolver;
use crate::db::SyncStore;
use crate::error::{Error, Result};
use crate::fingerprint::fingerprint;
use crate::models::{Document, DraftRef, PublicationRecord};
use crate::remote::RemoteApi;
use crate::resolve::{resolve_document, DocumentDefaults};

/// Action taken for a document in one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncAction {
    /// New remote draft created (also covers re-creation after remote loss)
    Create,
    /// Existing remote draft updated in place
    Update,
    /// Nothing to do; content unchanged and the draft is confirmed live
    Skip,
}

impl std::fmt::Display for SyncAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Skip => write!(f, "skip"),
        }
    }
}

/// How far one sync invocation goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Sync the draft only
    Create,
    /// Sync the draft, then publish whichever draft is current
    CreateAndPublish,
}

/// Result of syncing one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncOutcome {
    pub action: SyncAction,
    pub draft_token: Option<String>,
    pub publication_token: Option<String>,
}

/// Liveness of the latest draft reference, derived each run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftState {
    /// No draft row recorded locally
    Missing,
    /// A draft row exists but the remote no longer has it (or the
    /// existence check could not confirm it)
    Dead,
    /// The remote confirmed the draft is retrievable
    Live,
}

/// Inputs to the transition decision, recomputed every run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncState {
    pub document_exists: bool,
    pub fingerprint_match: bool,
    pub draft: DraftState,
}

/// The transition table. Pure; side effects live in the engine.
#[must_use]
pub const fn decide(state: SyncState) -> SyncAction {
    match (state.document_exists, state.fingerprint_match, state.draft) {
        // First contact: nothing recorded yet
        (false, _, _) => SyncAction::Create,
        // Unchanged but never drafted, or remote artifact lost
        (true, true, DraftState::Missing | DraftState::Dead) => SyncAction::Create,
        (true, true, DraftState::Live) => SyncAction::Skip,
        // Changed with a live draft: mutate the remote resource in place
        (true, false, DraftState::Live) => SyncAction::Update,
        // Changed but nothing live to update
        (true, false, DraftState::Missing | DraftState::Dead) => SyncAction::Create,
    }
}

/// Per-run batch counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SyncStats {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl SyncStats {
    fn record(&mut self, action: SyncAction) {
        match action {
            SyncAction::Create => self.created += 1,
            SyncAction::Update => self.updated += 1,
            SyncAction::Skip => self.skipped += 1,
        }
    }

    #[must_use]
    pub const fn total(&self) -> usize {
        self.created + self.updated + self.skipped + self.failed
    }
}

/// Outcome of one document within a batch.
#[derive(Debug)]
pub struct DocumentOutcome {
    pub path: PathBuf,
    pub result: Result<SyncOutcome>,
}

/// Report for a whole batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<DocumentOutcome>,
    pub stats: SyncStats,
}

impl BatchReport {
    #[must_use]
    pub const fn has_failures(&self) -> bool {
        self.stats.failed > 0
    }
}

/// Local bookkeeping snapshot for a document, for status display.
#[derive(Debug)]
pub struct DocumentStatus {
    pub document: Option<Document>,
    pub latest_draft: Option<DraftRef>,
    pub publication: Option<PublicationRecord>,
}

/// The synchronization engine. Holds no state of its own beyond its
/// collaborators; safe to rebuild every invocation.
pub struct SyncEngine<'a, S: SyncStore, R: RemoteApi> {
    store: &'a S,
    remote: &'a R,
    defaults: DocumentDefaults,
}

impl<'a, S: SyncStore, R: RemoteApi> SyncEngine<'a, S, R> {
    pub const fn new(store: &'a S, remote: &'a R, defaults: DocumentDefaults) -> Self {
        Self {
            store,
            remote,
            defaults,
        }
    }

    /// Sync a single document, optionally chaining a publish.
    pub async fn sync_document(&self, path: &Path, mode: SyncMode) -> Result<SyncOutcome> {
        let raw = tokio::fs::read_to_string(path).await?;
        let assets = AssetResolver::new(self.store, self.remote);
        let resolved = resolve_document(&raw, path, &self.defaults, &assets).await?;
        let current_fingerprint = fingerprint(&resolved);

        let key = document_key(path);
        let document = self.store.find_document(&key)?;
        let latest = self.store.latest_draft(&key)?;

        let state = SyncState {
            document_exists: document.is_some(),
            fingerprint_match: document
                .as_ref()
                .is_some_and(|doc| doc.fingerprint == current_fingerprint),
            draft: self.draft_state(latest.as_ref()).await,
        };
        let action = decide(state);
        tracing::debug!(document = %key, ?state, %action, "decided sync action");

        let draft_token = match action {
            SyncAction::Create => {
                let token = self.remote.create_draft(&resolved).await?;
                self.store.commit_create(&key, &current_fingerprint, &token)?;
                tracing::info!(document = %key, draft = %token, "created remote draft");
                Some(token)
            }
            SyncAction::Update => {
                let draft = latest.as_ref().ok_or_else(|| {
                    Error::InvalidInput(format!("update decided without a draft for {key}"))
                })?;
                self.remote.update_draft(&draft.token, &resolved).await?;
                self.store.commit_update(&key, &current_fingerprint)?;
                tracing::info!(document = %key, draft = %draft.token, "updated remote draft");
                Some(draft.token.clone())
            }
            SyncAction::Skip => {
                tracing::debug!(document = %key, "unchanged, skipping");
                latest.as_ref().map(|draft| draft.token.clone())
            }
        };

        let publication_token = match mode {
            SyncMode::Create => None,
            SyncMode::CreateAndPublish => self.publish_current(&key).await?,
        };

        Ok(SyncOutcome {
            action,
            draft_token,
            publication_token,
        })
    }

    /// Publish the latest draft of an already-synced document.
    pub async fn publish_document(&self, path: &Path) -> Result<String> {
        let key = document_key(path);
        let draft = self
            .store
            .latest_draft(&key)?
            .ok_or_else(|| Error::NotFound(format!("no draft recorded for {key}")))?;

        let token = self.remote.publish(&draft.token).await?;
        self.store.record_publication(draft.id, &token)?;
        tracing::info!(document = %key, publication = %token, "published");
        Ok(token)
    }

    /// Delete the remote publication of a document, then retract the local
    /// record. Only the local record is dropped after remote confirmation.
    pub async fn delete_published_document(&self, path: &Path) -> Result<()> {
        let key = document_key(path);
        let draft = self
            .store
            .latest_draft(&key)?
            .ok_or_else(|| Error::NotFound(format!("no draft recorded for {key}")))?;
        let publication = self
            .store
            .find_publication_for(draft.id)?
            .ok_or_else(|| Error::NotFound(format!("no publication recorded for {key}")))?;

        let status = self.remote.get_publication_status(&publication.token).await?;
        tracing::debug!(document = %key, ?status, "remote publication status before delete");

        self.remote.delete_publication(&publication.token).await?;
        self.store.retract_publication(publication.id)?;
        tracing::info!(document = %key, publication = %publication.token, "deleted publication");
        Ok(())
    }

    /// Local bookkeeping snapshot for a document.
    pub fn status(&self, path: &Path) -> Result<DocumentStatus> {
        let key = document_key(path);
        let document = self.store.find_document(&key)?;
        let latest_draft = self.store.latest_draft(&key)?;
        let publication = match latest_draft.as_ref() {
            Some(draft) => self.store.find_publication_for(draft.id)?,
            None => None,
        };
        Ok(DocumentStatus {
            document,
            latest_draft,
            publication,
        })
    }

    /// Sync every Markdown document under `root`, sorted by path, one at a
    /// time. Per-document failures are logged and counted; only store
    /// failures abort the batch.
    pub async fn sync_all(&self, root: &Path, mode: SyncMode) -> Result<BatchReport> {
        let documents = discover_documents(root)?;
        let mut report = BatchReport::default();

        for path in documents {
            match self.sync_document(&path, mode).await {
                Ok(outcome) => {
                    report.stats.record(outcome.action);
                    report.outcomes.push(DocumentOutcome {
                        path,
                        result: Ok(outcome),
                    });
                }
                Err(error) if error.is_fatal_to_run() => return Err(error),
                Err(error) => {
                    tracing::error!(document = %path.display(), %error, "document sync failed");
                    report.stats.failed += 1;
                    report.outcomes.push(DocumentOutcome {
                        path,
                        result: Err(error),
                    });
                }
            }
        }

        Ok(report)
    }

    /// Derive the draft liveness for this run. An errored existence check
    /// is logged and counted as not confirmed live, so the engine errs
    /// toward re-creation rather than a silent skip.
    async fn draft_state(&self, latest: Option<&DraftRef>) -> DraftState {
        let Some(draft) = latest else {
            return DraftState::Missing;
        };
        match self.remote.get_draft(&draft.token).await {
            Ok(Some(_)) => DraftState::Live,
            Ok(None) => {
                tracing::info!(draft = %draft.token, "remote draft is gone, will re-create");
                DraftState::Dead
            }
            Err(error) => {
                tracing::warn!(draft = %draft.token, %error, "existence check failed, treating draft as not live");
                DraftState::Dead
            }
        }
    }

    /// Publish whichever draft is now current, tolerating failure: the
    /// remote cannot distinguish "already published" from genuine errors,
    /// so a failed publish is a warning, never a rollback.
    async fn publish_current(&self, key: &str) -> Result<Option<String>> {
        let Some(draft) = self.store.latest_draft(key)? else {
            return Ok(None);
        };
        match self.remote.publish(&draft.token).await {
            Ok(token) => {
                self.store.record_publication(draft.id, &token)?;
                tracing::info!(document = %key, publication = %token, "published");
                Ok(Some(token))
            }
            Err(error) => {
                tracing::warn!(
                    document = %key,
                    %error,
                    "publish failed (may already be published), draft changes kept"
                );
                Ok(None)
            }
        }
    }
}

fn document_key(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Collect `*.md` files under `root` recursively, sorted by path for a
/// deterministic processing order.
fn discover_documents(root: &Path) -> Result<Vec<PathBuf>> {
    fn walk(dir: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_dir() {
                walk(&path, out)?;
            } else if path.extension().is_some_and(|ext| ext == "md") {
                out.push(path);
            }
        }
        Ok(())
    }

    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }

    let mut documents = Vec::new();
    walk(root, &mut documents)?;
    documents.sort();
    Ok(documents)
}
