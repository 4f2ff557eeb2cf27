//! SQLite persistence for newsletters, publications and incident records.
//!
//! One [`Database`] handle is shared by the ingestion pipeline, the lateness
//! detector and the incident notifier. Schema changes live in
//! [`migrations`]; each table has its own `*_repo` module.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::config::DatabaseConfig;
use crate::model::Newsletter;

pub mod error;
pub mod issue_repo;
pub mod migrations;
pub mod newsletter_repo;
pub mod publication_repo;
pub mod store;

pub use error::DatabaseError;
pub use store::{IssueRecordStore, PublicationStore};

const FILE_PRAGMAS: &str = "PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON; PRAGMA busy_timeout=5000;";

/// Shared handle over the n2rss store.
///
/// Cloning shares the same connection. WAL mode lets the ingestion and
/// lateness jobs read while the other writes.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Opens the store named by the `database` config section, falling back
    /// to [`default_database_path`].
    pub fn open_configured(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let path = config
            .path
            .clone()
            .or_else(default_database_path)
            .ok_or(DatabaseError::NoDatabasePath)?;
        Self::open(&path)
    }

    /// Opens (or creates) the store at `path` and applies pending migrations.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| DatabaseError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let db = Self::prepare(Connection::open(path)?, FILE_PRAGMAS)?;
        log::info!("Database opened at {}", path.display());
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        Self::prepare(Connection::open_in_memory()?, "PRAGMA foreign_keys=ON;")
    }

    fn prepare(conn: Connection, pragmas: &str) -> Result<Self, DatabaseError> {
        conn.execute_batch(pragmas)?;
        migrations::run_all(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Upserts the newsletters served by the configured handlers.
    ///
    /// Rows of newsletters no longer served are kept so their publications
    /// stay readable. Returns how many newsletters were written.
    pub fn sync_newsletters<'a>(
        &self,
        newsletters: impl IntoIterator<Item = &'a Newsletter>,
    ) -> Result<usize, DatabaseError> {
        let count = newsletter_repo::sync_all(self, newsletters)?;
        log::debug!("Synchronized {} newsletter(s)", count);
        Ok(count)
    }

    /// Provides locked access to the underlying connection.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, DatabaseError>
    where
        F: FnOnce(&Connection) -> Result<T, DatabaseError>,
    {
        let conn = self.conn.lock().map_err(|_| DatabaseError::LockPoisoned)?;
        f(&conn)
    }
}

/// `~/.n2rss/data/n2rss.db`, or `None` without a home directory.
pub fn default_database_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".n2rss").join("data").join("n2rss.db"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn migration_count(db: &Database) -> u32 {
        db.with_conn(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM _migrations", [], |r| r.get(0))?))
            .unwrap()
    }

    #[test]
    fn test_open_in_memory_runs_migrations() {
        let db = Database::open_in_memory().unwrap();
        assert!(migration_count(&db) > 0);
    }

    #[test]
    fn test_open_configured_uses_configured_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("n2rss.db");
        let config = DatabaseConfig {
            path: Some(path.clone()),
        };

        let db = Database::open_configured(&config).unwrap();

        assert!(migration_count(&db) > 0);
        assert!(path.exists());
    }

    #[test]
    fn test_sync_newsletters_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("n2rss.db");
        let newsletters = vec![
            Newsletter::new("bytes", "Bytes", "https://bytes.dev"),
            Newsletter::new("tldr", "TLDR", "https://tldr.tech"),
        ];
        {
            let db = Database::open(&path).unwrap();
            assert_eq!(db.sync_newsletters(&newsletters).unwrap(), 2);
        }

        let db = Database::open(&path).unwrap();
        assert_eq!(db.sync_newsletters(&newsletters[..1]).unwrap(), 1);
        // Newsletters dropped from the handlers keep their rows.
        assert!(newsletter_repo::find_by_code(&db, "tldr").unwrap().is_some());
        let bytes = newsletter_repo::find_by_code(&db, "bytes").unwrap().unwrap();
        assert_eq!(bytes.website, "https://bytes.dev");
    }

    #[test]
    fn test_default_database_path() {
        let path = default_database_path().unwrap();
        assert!(path.ends_with(".n2rss/data/n2rss.db"));
    }
}
