//! `SQLite` backend using `rusqlite`.
//!
//! [`SqliteBackend`] owns one connection behind an async mutex. Every call
//! runs inside `tokio::task::spawn_blocking`, so a slow statement never
//! stalls the runtime, and statements from concurrent requests serialize on
//! the mutex.

use std::path::PathBuf;
use std::sync::Arc;

use rusqlite::ErrorCode;
use taxi_core::{TaxiError, TaxiResult};
use tokio::sync::Mutex;

/// A `SQLite` database handle. Cloning shares the same connection.
#[derive(Clone)]
pub struct SqliteBackend {
    path: PathBuf,
    conn: Arc<Mutex<rusqlite::Connection>>,
}

impl std::fmt::Debug for SqliteBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteBackend")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl SqliteBackend {
    /// Opens the database at `path`, or an in-memory one for `":memory:"`.
    ///
    /// File databases run in WAL mode. Foreign keys are always enforced.
    pub fn open(path: impl Into<PathBuf>) -> TaxiResult<Self> {
        let path = path.into();
        let in_memory = path.to_str() == Some(":memory:");
        let conn = if in_memory {
            rusqlite::Connection::open_in_memory()
        } else {
            rusqlite::Connection::open(&path)
        }
        .map_err(|e| TaxiError::OperationalError(format!("SQLite open failed: {e}")))?;

        let pragmas = if in_memory {
            "PRAGMA foreign_keys=ON;"
        } else {
            "PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;"
        };
        conn.execute_batch(pragmas)
            .map_err(|e| TaxiError::OperationalError(format!("Failed to set pragmas: {e}")))?;

        tracing::debug!(path = %path.display(), "opened sqlite database");

        Ok(Self {
            path,
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Opens a fresh in-memory database.
    pub fn memory() -> TaxiResult<Self> {
        Self::open(":memory:")
    }

    /// Returns the database file path.
    pub const fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Runs `f` against the connection on the blocking pool.
    ///
    /// `rusqlite` errors are mapped with [`map_sqlite_error`].
    pub async fn run<T, F>(&self, f: F) -> TaxiResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut rusqlite::Connection) -> rusqlite::Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn.blocking_lock();
            f(&mut conn).map_err(map_sqlite_error)
        })
        .await
        .map_err(|e| TaxiError::OperationalError(format!("Task join error: {e}")))?
    }

    /// Executes a batch of `;`-separated statements.
    pub async fn execute_batch(&self, sql: &'static str) -> TaxiResult<()> {
        self.run(move |conn| conn.execute_batch(sql)).await
    }
}

/// Maps a `rusqlite` error onto [`TaxiError`].
///
/// - no rows -> `DoesNotExist`
/// - constraint violations (UNIQUE, FOREIGN KEY, NOT NULL) -> `IntegrityError`
/// - everything else -> `DatabaseError`
pub fn map_sqlite_error(err: rusqlite::Error) -> TaxiError {
    match &err {
        rusqlite::Error::QueryReturnedNoRows => {
            TaxiError::DoesNotExist("No rows returned".to_string())
        }
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            TaxiError::IntegrityError(err.to_string())
        }
        _ => TaxiError::DatabaseError(err.to_string()),
    }
}
