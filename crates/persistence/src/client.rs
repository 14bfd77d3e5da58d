//! SQLite client and connection management

use crate::error::PersistenceError;
use crate::schema;
use cash_track_config::DatabaseConfig;
use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::Arc;

/// Path that selects a private in-memory database
pub const IN_MEMORY: &str = ":memory:";

/// SQLite configuration
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    pub path: PathBuf,
}

impl SqliteConfig {
    pub fn in_memory() -> Self {
        Self {
            path: PathBuf::from(IN_MEMORY),
        }
    }

    fn is_in_memory(&self) -> bool {
        self.path.as_os_str() == IN_MEMORY
    }
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self::from(&DatabaseConfig::default())
    }
}

impl From<&DatabaseConfig> for SqliteConfig {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            path: PathBuf::from(&config.path),
        }
    }
}

/// SQLite client wrapper
///
/// One connection behind a mutex; every statement runs on the blocking pool.
#[derive(Clone)]
pub struct SqliteClient {
    conn: Arc<Mutex<Connection>>,
    config: SqliteConfig,
}

impl SqliteClient {
    /// Open (or create) the database file
    pub async fn open(config: SqliteConfig) -> Result<Self, PersistenceError> {
        tracing::info!(path = %config.path.display(), "Opening SQLite database");

        let open_config = config.clone();
        let conn = tokio::task::spawn_blocking(move || -> Result<Connection, PersistenceError> {
            if open_config.is_in_memory() {
                return Ok(Connection::open_in_memory()?);
            }
            if let Some(parent) = open_config.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| {
                    PersistenceError::ConnectionError(format!(
                        "Failed to create {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
            Ok(Connection::open(&open_config.path)?)
        })
        .await??;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            config,
        })
    }

    /// Fresh in-memory database with the schema applied
    pub async fn open_in_memory() -> Result<Self, PersistenceError> {
        let client = Self::open(SqliteConfig::in_memory()).await?;
        client.ensure_schema().await?;
        Ok(client)
    }

    /// Ensure tables, columns and indexes exist
    pub async fn ensure_schema(&self) -> Result<(), PersistenceError> {
        self.run(schema::ensure_schema).await?;
        tracing::info!(path = %self.config.path.display(), "Schema ensured");
        Ok(())
    }

    /// Run a closure against the connection on the blocking pool
    pub async fn run<F, T>(&self, f: F) -> Result<T, PersistenceError>
    where
        F: FnOnce(&Connection) -> Result<T, PersistenceError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock();
            f(&guard)
        })
        .await?
    }

    pub fn config(&self) -> &SqliteConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_settings() {
        let settings = DatabaseConfig {
            path: "/data/ct.db".to_string(),
        };
        assert_eq!(SqliteConfig::from(&settings).path, PathBuf::from("/data/ct.db"));
        assert!(SqliteConfig::in_memory().is_in_memory());
    }

    #[tokio::test]
    async fn test_open_creates_file_and_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cash-track.db");

        let client = SqliteClient::open(SqliteConfig { path: path.clone() }).await.unwrap();
        client.ensure_schema().await.unwrap();
        assert!(path.exists());

        let tables: i64 = client
            .run(|conn| {
                Ok(conn.query_row(
                    "SELECT COUNT(*) FROM sqlite_master \
                     WHERE type = 'table' AND name IN ('users', 'transactions')",
                    [],
                    |row| row.get(0),
                )?)
            })
            .await
            .unwrap();
        assert_eq!(tables, 2);
    }

    #[tokio::test]
    async fn test_ensure_schema_is_idempotent() {
        let client = SqliteClient::open_in_memory().await.unwrap();
        client.ensure_schema().await.unwrap();
        client.ensure_schema().await.unwrap();
    }
}
