//! SQLite document store
//!
//! A single `files` table keyed by filename holds the extracted (and
//! translated) text of every uploaded document.

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::types::StoredDocument;

/// Outcome of an upsert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// A new row was created with this id
    Inserted(i64),
    /// The existing row with this id had its content replaced
    Updated(i64),
}

impl UpsertOutcome {
    /// Row id that now holds the content
    pub fn id(&self) -> i64 {
        match self {
            Self::Inserted(id) | Self::Updated(id) => *id,
        }
    }

    /// Whether an existing row was overwritten
    pub fn replaced(&self) -> bool {
        matches!(self, Self::Updated(_))
    }
}

/// SQLite-backed document store
#[derive(Clone)]
pub struct DocumentDb {
    conn: Arc<Mutex<Connection>>,
}

impl DocumentDb {
    /// Create or open the database at the given path
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)
            .map_err(|e| Error::store(format!("Failed to open database {}: {}", path.display(), e)))?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.migrate()?;
        Ok(db)
    }

    /// Create an in-memory database
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::store(format!("Failed to open in-memory database: {}", e)))?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.migrate()?;
        Ok(db)
    }

    /// Create the schema if absent
    fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS files (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                filename TEXT,
                content TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_files_filename ON files(filename);
            "#,
        )
        .map_err(|e| Error::store(format!("Failed to run migrations: {}", e)))?;

        tracing::info!("Document store schema ready");
        Ok(())
    }

    /// Store `content` under `filename`, replacing any existing row's content
    ///
    /// Looks the filename up first and then updates or inserts, inside one
    /// transaction so there is never more than one row per filename.
    pub fn upsert(&self, filename: &str, content: &str) -> Result<UpsertOutcome> {
        let mut conn = self.conn.lock();
        let tx = conn
            .transaction()
            .map_err(|e| Error::store(format!("Failed to begin transaction: {}", e)))?;

        let existing: Option<i64> = tx
            .query_row(
                "SELECT id FROM files WHERE filename = ?1 ORDER BY id LIMIT 1",
                params![filename],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| Error::store(format!("Failed to look up '{}': {}", filename, e)))?;

        let outcome = match existing {
            Some(id) => {
                tx.execute(
                    "UPDATE files SET content = ?1 WHERE id = ?2",
                    params![content, id],
                )
                .map_err(|e| Error::store(format!("Failed to update '{}': {}", filename, e)))?;
                UpsertOutcome::Updated(id)
            }
            None => {
                tx.execute(
                    "INSERT INTO files (filename, content) VALUES (?1, ?2)",
                    params![filename, content],
                )
                .map_err(|e| Error::store(format!("Failed to insert '{}': {}", filename, e)))?;
                UpsertOutcome::Inserted(tx.last_insert_rowid())
            }
        };

        tx.commit()
            .map_err(|e| Error::store(format!("Failed to commit '{}': {}", filename, e)))?;

        tracing::debug!("Stored '{}' ({:?})", filename, outcome);
        Ok(outcome)
    }

    /// Every row, in primary-key order
    pub fn list_all(&self) -> Result<Vec<StoredDocument>> {
        let conn = self.conn.lock();

        let mut stmt = conn
            .prepare("SELECT id, filename, content FROM files ORDER BY id")
            .map_err(|e| Error::store(format!("Failed to prepare query: {}", e)))?;

        let documents = stmt
            .query_map([], row_to_document)
            .map_err(|e| Error::store(format!("Failed to list documents: {}", e)))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| Error::store(format!("Failed to read document row: {}", e)))?;

        Ok(documents)
    }

    /// Get a document by id
    pub fn get_by_id(&self, id: i64) -> Result<Option<StoredDocument>> {
        let conn = self.conn.lock();

        conn.query_row(
            "SELECT id, filename, content FROM files WHERE id = ?1",
            params![id],
            row_to_document,
        )
        .optional()
        .map_err(|e| Error::store(format!("Failed to get document {}: {}", id, e)))
    }

    /// Get a document by filename
    pub fn get_by_filename(&self, filename: &str) -> Result<Option<StoredDocument>> {
        let conn = self.conn.lock();

        conn.query_row(
            "SELECT id, filename, content FROM files WHERE filename = ?1 ORDER BY id LIMIT 1",
            params![filename],
            row_to_document,
        )
        .optional()
        .map_err(|e| Error::store(format!("Failed to get document '{}': {}", filename, e)))
    }

    /// Delete a document; a missing id is not an error
    ///
    /// Returns whether a row was removed.
    pub fn delete_by_id(&self, id: i64) -> Result<bool> {
        let conn = self.conn.lock();

        let count = conn
            .execute("DELETE FROM files WHERE id = ?1", params![id])
            .map_err(|e| Error::store(format!("Failed to delete document {}: {}", id, e)))?;

        Ok(count > 0)
    }

    /// Remove every row
    ///
    /// Failures are logged and reported as `false`, never propagated.
    pub fn clear_all(&self) -> bool {
        let conn = self.conn.lock();

        match conn.execute("DELETE FROM files", []) {
            Ok(count) => {
                tracing::info!("Cleared document store ({} rows)", count);
                true
            }
            Err(e) => {
                tracing::error!("Failed to clear document store: {}", e);
                false
            }
        }
    }

    /// Number of stored documents
    pub fn count(&self) -> Result<usize> {
        let conn = self.conn.lock();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM files", [], |row| row.get(0))
            .map_err(|e| Error::store(format!("Failed to count documents: {}", e)))?;

        Ok(count as usize)
    }
}

#[cfg(test)]
impl DocumentDb {
    /// Run raw SQL against the connection
    pub(crate) fn execute_raw(&self, sql: &str) {
        self.conn.lock().execute_batch(sql).unwrap();
    }
}

fn row_to_document(row: &rusqlite::Row) -> rusqlite::Result<StoredDocument> {
    let id: i64 = row.get(0)?;
    let filename: Option<String> = row.get(1)?;
    let content: Option<String> = row.get(2)?;

    Ok(StoredDocument {
        id,
        filename: filename.unwrap_or_default(),
        content: content.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_and_list() {
        let db = DocumentDb::in_memory().unwrap();

        let first = db.upsert("a.txt", "alpha").unwrap();
        let second = db.upsert("b.txt", "beta").unwrap();
        assert!(matches!(first, UpsertOutcome::Inserted(_)));
        assert!(matches!(second, UpsertOutcome::Inserted(_)));
        assert!(first.id() < second.id());

        let docs = db.list_all().unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].filename, "a.txt");
        assert_eq!(docs[1].filename, "b.txt");
        assert_eq!(docs[1].content, "beta");
    }

    #[test]
    fn test_upsert_replaces_content() {
        let db = DocumentDb::in_memory().unwrap();

        let first = db.upsert("report.txt", "first draft").unwrap();
        let second = db.upsert("report.txt", "final version").unwrap();
        assert_eq!(second, UpsertOutcome::Updated(first.id()));
        assert!(second.replaced());

        let docs = db.list_all().unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].filename, "report.txt");
        assert_eq!(docs[0].content, "final version");
    }

    #[test]
    fn test_delete_missing_id_is_noop() {
        let db = DocumentDb::in_memory().unwrap();
        db.upsert("a.txt", "alpha").unwrap();

        assert!(!db.delete_by_id(999).unwrap());
        assert_eq!(db.count().unwrap(), 1);
    }

    #[test]
    fn test_delete_by_id() {
        let db = DocumentDb::in_memory().unwrap();
        let id = db.upsert("a.txt", "alpha").unwrap().id();
        db.upsert("b.txt", "beta").unwrap();

        assert!(db.delete_by_id(id).unwrap());
        assert!(db.get_by_id(id).unwrap().is_none());
        assert_eq!(db.list_all().unwrap().len(), 1);
    }

    #[test]
    fn test_clear_all() {
        let db = DocumentDb::in_memory().unwrap();
        db.upsert("a.txt", "alpha").unwrap();
        db.upsert("b.txt", "beta").unwrap();

        assert!(db.clear_all());
        assert_eq!(db.count().unwrap(), 0);
        // clearing an empty table still succeeds
        assert!(db.clear_all());
    }

    #[test]
    fn test_get_by_filename() {
        let db = DocumentDb::in_memory().unwrap();
        db.upsert("notes.txt", "hello").unwrap();

        let doc = db.get_by_filename("notes.txt").unwrap().unwrap();
        assert_eq!(doc.content, "hello");
        assert!(db.get_by_filename("missing.txt").unwrap().is_none());
    }

    #[test]
    fn test_schema_creation_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("plagiarism.db");

        {
            let db = DocumentDb::new(&path).unwrap();
            db.upsert("kept.txt", "survives reopen").unwrap();
        }

        let db = DocumentDb::new(&path).unwrap();
        let docs = db.list_all().unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].content, "survives reopen");
    }

    #[test]
    fn test_ids_are_not_reused_after_delete() {
        let db = DocumentDb::in_memory().unwrap();
        let first = db.upsert("a.txt", "alpha").unwrap().id();
        db.delete_by_id(first).unwrap();

        let second = db.upsert("a.txt", "alpha again").unwrap();
        assert!(matches!(second, UpsertOutcome::Inserted(_)));
        assert!(second.id() > first);
    }

    #[test]
    fn test_clear_all_reports_failure() {
        let db = DocumentDb::in_memory().unwrap();
        db.upsert("a.txt", "alpha").unwrap();
        db.execute_raw("DROP TABLE files");

        assert!(!db.clear_all());
    }

    #[test]
    fn test_upsert_failure_is_store_error() {
        let db = DocumentDb::in_memory().unwrap();
        db.execute_raw("DROP TABLE files");

        let err = db.upsert("a.txt", "alpha").unwrap_err();
        assert!(matches!(err, Error::Store(_)));
    }
}
