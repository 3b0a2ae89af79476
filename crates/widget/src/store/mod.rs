//! Key-value option storage.
//!
//! # Keys
//!
//! - `cache` - JSON object of product records keyed by ASIN
//! - `aws_last_valid_credentials` - fingerprint of the last validated key pair
//!
//! # Backends
//!
//! - [`MemoryStore`] - process-local, for tests and dry runs
//!   (`APW_OPTIONS_FILE=:memory:`)
//! - [`FileStore`] - a single JSON file on disk
//! - [`PgStore`] - the `apw.options` table in `PostgreSQL`
//!
//! Values are opaque strings. Callers own their encoding.

mod file;
mod memory;
mod postgres;

use std::future::Future;

use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use postgres::{PgStore, create_pool};

use crate::config::StorageConfig;

/// Well-known option keys.
pub mod option_keys {
    /// Persisted item cache.
    pub const CACHE: &str = "cache";

    /// Fingerprint of the last key pair that passed validation.
    pub const LAST_VALID_CREDENTIALS: &str = "aws_last_valid_credentials";
}

/// Options file value that selects the in-memory store.
///
/// Nothing is written to disk; the cache and the credential fingerprint are
/// lost when the process exits.
pub const MEMORY_OPTIONS_FILE: &str = ":memory:";

/// Errors that can occur while reading or writing options.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file is not a JSON object of strings.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migrations failed to apply.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Persistent string options.
pub trait OptionStore: Send + Sync {
    /// Read `key`. Returns `None` if it was never written or was deleted.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StoreError>> + Send;

    /// Write `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Remove `key`. Removing a missing key succeeds.
    fn delete(&self, key: &str) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Backend chosen at startup from configuration.
#[derive(Debug)]
pub enum OptionBackend {
    /// In-memory store for dry runs, selected by [`MEMORY_OPTIONS_FILE`].
    Memory(MemoryStore),
    /// JSON file store.
    File(FileStore),
    /// `PostgreSQL` store.
    Postgres(PgStore),
}

impl OptionBackend {
    /// Open the backend described by `config`.
    ///
    /// A database URL takes precedence over the options file. The options
    /// file [`MEMORY_OPTIONS_FILE`] selects the in-memory store.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the database is unreachable.
    pub async fn connect(config: &StorageConfig) -> Result<Self, StoreError> {
        match &config.database_url {
            Some(database_url) => {
                let pool = create_pool(database_url).await?;
                tracing::info!("Using PostgreSQL option store");
                Ok(Self::Postgres(PgStore::new(pool)))
            }
            None if config.options_file.as_os_str() == MEMORY_OPTIONS_FILE => {
                tracing::info!("Using in-memory option store; nothing will be persisted");
                Ok(Self::Memory(MemoryStore::new()))
            }
            None => {
                tracing::info!(path = %config.options_file.display(), "Using file option store");
                Ok(Self::File(FileStore::new(&config.options_file)))
            }
        }
    }

    /// Short backend name for log output.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::File(_) => "file",
            Self::Postgres(_) => "postgres",
        }
    }
}

impl OptionStore for OptionBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self {
            Self::Memory(store) => store.get(key).await,
            Self::File(store) => store.get(key).await,
            Self::Postgres(store) => store.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        match self {
            Self::Memory(store) => store.set(key, value).await,
            Self::File(store) => store.set(key, value).await,
            Self::Postgres(store) => store.set(key, value).await,
        }
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        match self {
            Self::Memory(store) => store.delete(key).await,
            Self::File(store) => store.delete(key).await,
            Self::Postgres(store) => store.delete(key).await,
        }
    }
}

impl<T: OptionStore> OptionStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StoreError>> + Send {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> impl Future<Output = Result<(), StoreError>> + Send {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> impl Future<Output = Result<(), StoreError>> + Send {
        (**self).delete(key)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[tokio::test]
    async fn test_connect_without_database_uses_file() {
        let config = StorageConfig {
            database_url: None,
            options_file: PathBuf::from("/nonexistent/apw/options.json"),
        };
        let backend = OptionBackend::connect(&config).await.unwrap();
        assert_eq!(backend.kind(), "file");

        // A missing file reads as empty.
        assert_eq!(backend.get(option_keys::CACHE).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_connect_memory_options_file_uses_memory() {
        let config = StorageConfig {
            database_url: None,
            options_file: PathBuf::from(MEMORY_OPTIONS_FILE),
        };
        let backend = OptionBackend::connect(&config).await.unwrap();
        assert_eq!(backend.kind(), "memory");

        backend.set(option_keys::CACHE, "{}").await.unwrap();
        assert_eq!(backend.get(option_keys::CACHE).await.unwrap().as_deref(), Some("{}"));
        assert!(!std::path::Path::new(MEMORY_OPTIONS_FILE).exists());
    }

    #[tokio::test]
    async fn test_backend_dispatches_to_memory() {
        let backend = OptionBackend::Memory(MemoryStore::new());
        backend.set("k", "v").await.unwrap();
        assert_eq!(backend.get("k").await.unwrap().as_deref(), Some("v"));
        backend.delete("k").await.unwrap();
        assert_eq!(backend.get("k").await.unwrap(), None);
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Io(std::io::Error::other("disk full"));
        assert_eq!(err.to_string(), "I/O error: disk full");
    }
}
