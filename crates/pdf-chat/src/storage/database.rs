//! SQLite database for documents and request logs
//!
//! One connection behind a mutex; every call runs on the blocking pool.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::providers::{DocumentStore, RequestLogSink};
use crate::types::{Document, DocumentMetadata, LogEntry, NewDocument};

/// SQLite-backed document store and request log sink
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Create or open the database at the given path, creating parent directories
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)
            .map_err(|e| Error::storage(format!("Failed to open database {}: {}", path.display(), e)))?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.migrate()?;
        tracing::info!("Opened SQLite store at {}", path.display());
        Ok(db)
    }

    /// Create an in-memory database (tests and ephemeral runs)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::storage(format!("Failed to open in-memory database: {}", e)))?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.migrate()?;
        Ok(db)
    }

    /// Run database migrations
    fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            "#,
        )
        .map_err(|e| Error::storage(format!("Failed to set pragmas: {}", e)))?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                author TEXT NOT NULL,
                subject TEXT NOT NULL,
                keywords TEXT NOT NULL,
                filename TEXT NOT NULL,
                page_count INTEGER NOT NULL,
                language TEXT NOT NULL,
                text TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS request_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                client TEXT NOT NULL,
                protocol TEXT NOT NULL,
                path TEXT NOT NULL,
                method TEXT NOT NULL,
                level TEXT NOT NULL,
                detail TEXT NOT NULL,
                status_code INTEGER,
                trace TEXT,
                timestamp TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_request_logs_timestamp ON request_logs(timestamp);
            "#,
        )
        .map_err(|e| Error::storage(format!("Failed to create tables: {}", e)))?;

        Ok(())
    }

    /// Run a closure against the connection on the blocking pool
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock();
            f(&conn)
        })
        .await
        .map_err(|e| Error::Internal(format!("Task join error: {}", e)))?
    }

    fn insert_document(conn: &Connection, id: &str, document: &NewDocument) -> Result<()> {
        let meta = &document.metadata;
        conn.execute(
            r#"
            INSERT INTO documents (
                id, title, author, subject, keywords, filename,
                page_count, language, text, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                id,
                meta.title,
                meta.author,
                meta.subject,
                meta.keywords,
                meta.filename,
                meta.page_count as i64,
                meta.language,
                document.text,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn find_document(conn: &Connection, id: &str) -> Result<Option<Document>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT id, title, author, subject, keywords, filename, page_count, language, text
            FROM documents WHERE id = ?1
            "#,
        )?;

        let document = stmt.query_row(params![id], row_to_document).optional()?;
        Ok(document)
    }

    fn insert_log_entry(conn: &Connection, entry: &LogEntry) -> Result<()> {
        let trace = entry.trace.as_ref().map(serde_json::to_string).transpose()?;
        conn.execute(
            r#"
            INSERT INTO request_logs (
                client, protocol, path, method, level, detail, status_code, trace, timestamp
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                entry.client,
                entry.protocol,
                entry.path,
                entry.method,
                entry.level.as_str(),
                entry.detail,
                entry.status_code.map(i64::from),
                trace,
                entry.timestamp.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Number of stored documents
    pub async fn document_count(&self) -> Result<usize> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
            Ok(count as usize)
        })
        .await
    }

    /// Number of persisted request log entries
    pub async fn log_count(&self) -> Result<usize> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM request_logs", [], |row| row.get(0))?;
            Ok(count as usize)
        })
        .await
    }
}

fn row_to_document(row: &rusqlite::Row) -> rusqlite::Result<Document> {
    let page_count: i64 = row.get(6)?;
    Ok(Document {
        id: row.get(0)?,
        metadata: DocumentMetadata {
            title: row.get(1)?,
            author: row.get(2)?,
            subject: row.get(3)?,
            keywords: row.get(4)?,
            filename: row.get(5)?,
            page_count: page_count as u32,
            language: row.get(7)?,
        },
        text: row.get(8)?,
    })
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn insert(&self, document: &NewDocument) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let document = document.clone();
        let row_id = id.clone();
        self.with_conn(move |conn| Self::insert_document(conn, &row_id, &document))
            .await?;
        Ok(id)
    }

    async fn find(&self, id: &str) -> Result<Option<Document>> {
        // Ids are always UUIDs; anything else cannot name a stored document
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(None);
        };
        let id = id.to_string();
        self.with_conn(move |conn| Self::find_document(conn, &id)).await
    }

    async fn health_check(&self) -> Result<bool> {
        self.with_conn(|conn| {
            let one: i64 = conn.query_row("SELECT 1", [], |row| row.get(0))?;
            Ok(one == 1)
        })
        .await
    }

    fn name(&self) -> &str {
        "sqlite"
    }
}

#[async_trait]
impl RequestLogSink for SqliteStore {
    async fn insert_log(&self, entry: &LogEntry) -> Result<()> {
        let entry = entry.clone();
        self.with_conn(move |conn| Self::insert_log_entry(conn, &entry)).await
    }

    fn name(&self) -> &str {
        "sqlite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LogLevel;

    fn new_document() -> NewDocument {
        NewDocument {
            metadata: DocumentMetadata {
                title: "Manual".into(),
                author: "Ops".into(),
                filename: "manual.pdf".into(),
                page_count: 7,
                language: "en".into(),
                ..Default::default()
            },
            text: "Restart the service before upgrading.".into(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let db = SqliteStore::in_memory().unwrap();
        let id = db.insert(&new_document()).await.unwrap();

        let found = db.find(&id).await.unwrap().unwrap();
        assert_eq!(found, Document::from_new(id, new_document()));
    }

    #[tokio::test]
    async fn test_find_unknown_or_malformed_id() {
        let db = SqliteStore::in_memory().unwrap();
        assert!(db.find(&Uuid::new_v4().to_string()).await.unwrap().is_none());
        assert!(db.find("not-an-id").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let db = SqliteStore::in_memory().unwrap();
        let a = db.insert(&new_document()).await.unwrap();
        let b = db.insert(&new_document()).await.unwrap();
        assert_ne!(a, b);
        assert_eq!(db.document_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_insert_log() {
        let db = SqliteStore::in_memory().unwrap();
        let entry = LogEntry {
            client: "127.0.0.1:5000".into(),
            protocol: "HTTP/1.1".into(),
            path: "/v1/pdf".into(),
            method: "POST".into(),
            level: LogLevel::Info,
            detail: "Incoming request.".into(),
            status_code: None,
            trace: None,
            timestamp: Utc::now(),
        };
        db.insert_log(&entry).await.unwrap();
        db.insert_log(&entry).await.unwrap();
        assert_eq!(db.log_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_health_check() {
        let db = SqliteStore::in_memory().unwrap();
        assert!(db.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_file_backed_store_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.db");
        let db = SqliteStore::new(&path).unwrap();
        let id = db.insert(&new_document()).await.unwrap();
        assert!(db.find(&id).await.unwrap().is_some());
        assert!(path.exists());
    }
}
