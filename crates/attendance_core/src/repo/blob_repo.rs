//! Key-value blob persistence for the attendance document.
//!
//! # Responsibility
//! - Define the `BlobStore` contract the attendance store depends on.
//! - Provide SQLite, in-memory and unavailable implementations.
//!
//! # Invariants
//! - Values are replaced whole; there are no partial writes.
//! - An unavailable store never returns data and never fails writes.

use crate::db::DbError;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence failure raised by a blob store.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// The key is empty after trimming.
    InvalidKey,
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidKey => write!(f, "blob store key must not be empty"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidKey => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Whole-value key-value storage.
pub trait BlobStore {
    /// Capability check; `false` means every other call is a no-op.
    fn is_available(&self) -> bool {
        true
    }
    fn get(&self, key: &str) -> RepoResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> RepoResult<()>;
    fn remove(&mut self, key: &str) -> RepoResult<()>;
}

impl<T: BlobStore + ?Sized> BlobStore for Box<T> {
    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    fn get(&self, key: &str) -> RepoResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> RepoResult<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> RepoResult<()> {
        (**self).remove(key)
    }
}

/// Blob store over the `kv_store` table of a migrated SQLite connection.
pub struct SqliteBlobStore {
    conn: Connection,
}

impl SqliteBlobStore {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Hands the connection back, e.g. for inspection in tests.
    pub fn into_connection(self) -> Connection {
        self.conn
    }
}

impl BlobStore for SqliteBlobStore {
    fn get(&self, key: &str) -> RepoResult<Option<String>> {
        let key = checked_key(key)?;
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> RepoResult<()> {
        let key = checked_key(key)?;
        self.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        debug!(
            "event=blob_set module=repo status=ok backend=sqlite bytes={}",
            value.len()
        );
        Ok(())
    }

    fn remove(&mut self, key: &str) -> RepoResult<()> {
        let key = checked_key(key)?;
        self.conn
            .execute("DELETE FROM kv_store WHERE key = ?1;", [key])?;
        Ok(())
    }
}

/// Process-local blob store for tests and throwaway sessions.
#[derive(Debug, Default, Clone)]
pub struct MemoryBlobStore {
    values: HashMap<String, String>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, key: &str) -> RepoResult<Option<String>> {
        Ok(self.values.get(checked_key(key)?).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> RepoResult<()> {
        self.values
            .insert(checked_key(key)?.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> RepoResult<()> {
        self.values.remove(checked_key(key)?);
        Ok(())
    }
}

/// Stand-in for an execution context without usable storage.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableBlobStore;

impl BlobStore for UnavailableBlobStore {
    fn is_available(&self) -> bool {
        false
    }

    fn get(&self, _key: &str) -> RepoResult<Option<String>> {
        Ok(None)
    }

    fn set(&mut self, _key: &str, _value: &str) -> RepoResult<()> {
        Ok(())
    }

    fn remove(&mut self, _key: &str) -> RepoResult<()> {
        Ok(())
    }
}

fn checked_key(key: &str) -> RepoResult<&str> {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return Err(RepoError::InvalidKey);
    }
    Ok(trimmed)
}
