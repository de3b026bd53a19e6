//! Sync record store implementation

use crate::error::{Error, Result};
use crate::models::{AssetCacheEntry, Document, DraftRef, PublicationRecord};
use rusqlite::{params, Connection, OptionalExtension};

/// Trait for sync record storage operations.
///
/// The store is the single source of truth for documents, draft history,
/// publications, and the asset cache; the engine never holds parallel
/// state across invocations.
pub trait SyncStore {
    /// Look up a tracked document by path
    fn find_document(&self, path: &str) -> Result<Option<Document>>;

    /// Latest draft reference for a document, if any
    fn latest_draft(&self, path: &str) -> Result<Option<DraftRef>>;

    /// Full append-only draft history for a document, oldest first
    fn draft_history(&self, path: &str) -> Result<Vec<DraftRef>>;

    /// Commit a CREATE outcome: upsert the document fingerprint and append
    /// a new draft row, atomically
    fn commit_create(&self, path: &str, fingerprint: &str, token: &str) -> Result<DraftRef>;

    /// Commit an UPDATE outcome: upsert the document fingerprint only.
    /// The existing draft row is reused, never rewritten.
    fn commit_update(&self, path: &str, fingerprint: &str) -> Result<()>;

    /// Look up an asset cache entry by canonical locator
    fn find_asset(&self, locator: &str) -> Result<Option<AssetCacheEntry>>;

    /// Insert-or-replace an asset cache entry after a fresh upload
    fn upsert_asset(&self, entry: &AssetCacheEntry) -> Result<()>;

    /// Append a publication record for a draft
    fn record_publication(&self, draft_id: i64, token: &str) -> Result<PublicationRecord>;

    /// Latest publication record for a draft, if any
    fn find_publication_for(&self, draft_id: i64) -> Result<Option<PublicationRecord>>;

    /// Delete a publication record. Only called after the caller has
    /// confirmed successful remote un-publication.
    fn retract_publication(&self, publication_id: i64) -> Result<()>;
}

/// `SQLite` implementation of `SyncStore`
pub struct SqliteSyncStore<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteSyncStore<'a> {
    /// Create a new store with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn parse_document(row: &rusqlite::Row<'_>) -> rusqlite::Result<Document> {
        Ok(Document {
            path: row.get(0)?,
            fingerprint: row.get(1)?,
            updated_at: row.get(2)?,
        })
    }

    fn parse_draft(row: &rusqlite::Row<'_>) -> rusqlite::Result<DraftRef> {
        Ok(DraftRef {
            id: row.get(0)?,
            document_path: row.get(1)?,
            token: row.get(2)?,
            created_at: row.get(3)?,
        })
    }

    fn parse_publication(row: &rusqlite::Row<'_>) -> rusqlite::Result<PublicationRecord> {
        Ok(PublicationRecord {
            id: row.get(0)?,
            draft_id: row.get(1)?,
            token: row.get(2)?,
            created_at: row.get(3)?,
        })
    }

    fn upsert_document(&self, path: &str, fingerprint: &str, now: i64) -> Result<()> {
        self.conn.execute(
            "INSERT INTO documents (path, fingerprint, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(path) DO UPDATE SET fingerprint = excluded.fingerprint,
                                             updated_at = excluded.updated_at",
            params![path, fingerprint, now],
        )?;
        Ok(())
    }
}

impl SyncStore for SqliteSyncStore<'_> {
    fn find_document(&self, path: &str) -> Result<Option<Document>> {
        let document = self
            .conn
            .query_row(
                "SELECT path, fingerprint, updated_at FROM documents WHERE path = ?",
                params![path],
                Self::parse_document,
            )
            .optional()?;
        Ok(document)
    }

    fn latest_draft(&self, path: &str) -> Result<Option<DraftRef>> {
        let draft = self
            .conn
            .query_row(
                "SELECT id, document_path, token, created_at
                 FROM drafts
                 WHERE document_path = ?
                 ORDER BY id DESC
                 LIMIT 1",
                params![path],
                Self::parse_draft,
            )
            .optional()?;
        Ok(draft)
    }

    fn draft_history(&self, path: &str) -> Result<Vec<DraftRef>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, document_path, token, created_at
             FROM drafts
             WHERE document_path = ?
             ORDER BY id ASC",
        )?;

        let drafts = stmt
            .query_map(params![path], Self::parse_draft)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(drafts)
    }

    fn commit_create(&self, path: &str, fingerprint: &str, token: &str) -> Result<DraftRef> {
        let now = chrono::Utc::now().timestamp_millis();

        let tx = self.conn.unchecked_transaction()?;
        self.upsert_document(path, fingerprint, now)?;
        self.conn.execute(
            "INSERT INTO drafts (document_path, token, created_at) VALUES (?, ?, ?)",
            params![path, token, now],
        )?;
        let id = self.conn.last_insert_rowid();
        tx.commit()?;

        Ok(DraftRef {
            id,
            document_path: path.to_string(),
            token: token.to_string(),
            created_at: now,
        })
    }

    fn commit_update(&self, path: &str, fingerprint: &str) -> Result<()> {
        let now = chrono::Utc::now().timestamp_millis();

        let tx = self.conn.unchecked_transaction()?;
        self.upsert_document(path, fingerprint, now)?;
        tx.commit()?;
        Ok(())
    }

    fn find_asset(&self, locator: &str) -> Result<Option<AssetCacheEntry>> {
        let entry = self
            .conn
            .query_row(
                "SELECT locator, content_hash, media_ref, url, updated_at
                 FROM asset_cache
                 WHERE locator = ?",
                params![locator],
                |row| {
                    Ok(AssetCacheEntry {
                        locator: row.get(0)?,
                        content_hash: row.get(1)?,
                        media_ref: row.get(2)?,
                        url: row.get(3)?,
                        updated_at: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(entry)
    }

    fn upsert_asset(&self, entry: &AssetCacheEntry) -> Result<()> {
        self.conn.execute(
            "INSERT INTO asset_cache (locator, content_hash, media_ref, url, updated_at)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(locator) DO UPDATE SET content_hash = excluded.content_hash,
                                                media_ref = excluded.media_ref,
                                                url = excluded.url,
                                                updated_at = excluded.updated_at",
            params![
                entry.locator,
                entry.content_hash,
                entry.media_ref,
                entry.url,
                entry.updated_at
            ],
        )?;
        Ok(())
    }

    fn record_publication(&self, draft_id: i64, token: &str) -> Result<PublicationRecord> {
        let now = chrono::Utc::now().timestamp_millis();

        self.conn.execute(
            "INSERT INTO publications (draft_id, token, created_at) VALUES (?, ?, ?)",
            params![draft_id, token, now],
        )?;

        Ok(PublicationRecord {
            id: self.conn.last_insert_rowid(),
            draft_id,
            token: token.to_string(),
            created_at: now,
        })
    }

    fn find_publication_for(&self, draft_id: i64) -> Result<Option<PublicationRecord>> {
        let publication = self
            .conn
            .query_row(
                "SELECT id, draft_id, token, created_at
                 FROM publications
                 WHERE draft_id = ?
                 ORDER BY id DESC
                 LIMIT 1",
                params![draft_id],
                Self::parse_publication,
            )
            .optional()?;
        Ok(publication)
    }

    fn retract_publication(&self, publication_id: i64) -> Result<()> {
        let rows = self.conn.execute(
            "DELETE FROM publications WHERE id = ?",
            params![publication_id],
        )?;

        if rows == 0 {
            return Err(Error::NotFound(format!(
                "publication record {publication_id}"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use pretty_assertions::assert_eq;

    fn setup() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn test_find_document_missing() {
        let db = setup();
        let store = SqliteSyncStore::new(db.connection());
        assert!(store.find_document("posts/a.md").unwrap().is_none());
    }

    #[test]
    fn test_commit_create_inserts_document_and_draft() {
        let db = setup();
        let store = SqliteSyncStore::new(db.connection());

        let draft = store.commit_create("posts/a.md", "f1", "m-1").unwrap();
        assert_eq!(draft.document_path, "posts/a.md");
        assert_eq!(draft.token, "m-1");

        let doc = store.find_document("posts/a.md").unwrap().unwrap();
        assert_eq!(doc.fingerprint, "f1");

        let latest = store.latest_draft("posts/a.md").unwrap().unwrap();
        assert_eq!(latest.id, draft.id);
    }

    #[test]
    fn test_commit_create_appends_history() {
        let db = setup();
        let store = SqliteSyncStore::new(db.connection());

        store.commit_create("posts/a.md", "f1", "m-1").unwrap();
        store.commit_create("posts/a.md", "f2", "m-2").unwrap();

        let history = store.draft_history("posts/a.md").unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].token, "m-1");
        assert_eq!(history[1].token, "m-2");

        // Latest fingerprint wins
        let doc = store.find_document("posts/a.md").unwrap().unwrap();
        assert_eq!(doc.fingerprint, "f2");
    }

    #[test]
    fn test_commit_update_rewrites_fingerprint_without_new_draft() {
        let db = setup();
        let store = SqliteSyncStore::new(db.connection());

        store.commit_create("posts/a.md", "f1", "m-1").unwrap();
        store.commit_update("posts/a.md", "f2").unwrap();

        let doc = store.find_document("posts/a.md").unwrap().unwrap();
        assert_eq!(doc.fingerprint, "f2");
        assert_eq!(store.draft_history("posts/a.md").unwrap().len(), 1);
    }

    #[test]
    fn test_asset_upsert_and_lookup() {
        let db = setup();
        let store = SqliteSyncStore::new(db.connection());

        let entry = AssetCacheEntry::new("/abs/img.png", "h1", "m-9", "https://cdn/img.png");
        store.upsert_asset(&entry).unwrap();

        let found = store.find_asset("/abs/img.png").unwrap().unwrap();
        assert_eq!(found.content_hash, "h1");
        assert_eq!(found.url, "https://cdn/img.png");

        // Re-upload replaces in place
        let replaced = AssetCacheEntry::new("/abs/img.png", "h2", "m-10", "https://cdn/img2.png");
        store.upsert_asset(&replaced).unwrap();

        let found = store.find_asset("/abs/img.png").unwrap().unwrap();
        assert_eq!(found.content_hash, "h2");
        assert_eq!(found.media_ref, "m-10");
    }

    #[test]
    fn test_publication_lifecycle() {
        let db = setup();
        let store = SqliteSyncStore::new(db.connection());

        let draft = store.commit_create("posts/a.md", "f1", "m-1").unwrap();
        assert!(store.find_publication_for(draft.id).unwrap().is_none());

        let record = store.record_publication(draft.id, "p-1").unwrap();
        let found = store.find_publication_for(draft.id).unwrap().unwrap();
        assert_eq!(found.id, record.id);
        assert_eq!(found.token, "p-1");

        store.retract_publication(record.id).unwrap();
        assert!(store.find_publication_for(draft.id).unwrap().is_none());
    }

    #[test]
    fn test_retract_missing_publication_is_not_found() {
        let db = setup();
        let store = SqliteSyncStore::new(db.connection());
        assert!(matches!(
            store.retract_publication(42),
            Err(Error::NotFound(_))
        ));
    }
}
