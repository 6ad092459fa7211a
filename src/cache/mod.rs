// Copyright (c) 2026 Civic News
// SPDX-License-Identifier: MIT
//! Persistent fingerprint-keyed fetch cache
//!
//! Maps a bill's change hash to the serialized detail payload fetched for
//! it. Entries are insert-only: a fingerprint is written once and never
//! updated or deleted, so a cached payload stays valid for as long as the
//! fingerprint keeps appearing in the master list.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rusqlite::{Connection, OptionalExtension};
use thiserror::Error;
use tracing::debug;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS cache (key TEXT PRIMARY KEY, value TEXT);";

/// Errors raised by the cache store
#[derive(Error, Debug)]
pub enum CacheError {
    /// The backing database could not be opened
    #[error("failed to open cache at {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// A lookup failed at the storage layer
    #[error("cache read failed")]
    Read(#[source] rusqlite::Error),

    /// An insert failed at the storage layer
    #[error("cache write failed")]
    Write(#[source] rusqlite::Error),

    /// Insert of a fingerprint that is already present. Callers must only
    /// insert after a confirmed miss; overwriting silently would break the
    /// immutability of cached payloads.
    #[error("fingerprint {0} is already cached")]
    DuplicateFingerprint(String),
}

/// SQLite-backed key/value store, opened once per run and shared.
///
/// Lookups and inserts are synchronous; the connection sits behind a mutex
/// so concurrent in-flight fetches can write their results independently.
pub struct CacheStore {
    conn: Mutex<Connection>,
}

impl CacheStore {
    /// Open (or create) the cache database at `path`.
    pub fn open(path: &Path) -> Result<Self, CacheError> {
        let conn = Connection::open(path).map_err(|source| CacheError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        conn.execute_batch(SCHEMA)
            .map_err(|source| CacheError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        debug!("cache opened at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory store with the same semantics, for tests and dry runs.
    pub fn open_in_memory() -> Result<Self, CacheError> {
        let conn = Connection::open_in_memory().map_err(|source| CacheError::Open {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        conn.execute_batch(SCHEMA)
            .map_err(|source| CacheError::Open {
                path: PathBuf::from(":memory:"),
                source,
            })?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Look up the payload stored for `fingerprint`. Missing keys are not
    /// an error.
    pub fn get(&self, fingerprint: &str) -> Result<Option<String>, CacheError> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT value FROM cache WHERE key = ?1",
            [fingerprint],
            |row| row.get(0),
        )
        .optional()
        .map_err(CacheError::Read)
    }

    /// Insert a payload for a fingerprint seen for the first time.
    ///
    /// Fails with [`CacheError::DuplicateFingerprint`] if the key already
    /// exists.
    pub fn insert(&self, fingerprint: &str, payload: &str) -> Result<(), CacheError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO cache (key, value) VALUES (?1, ?2)",
            [fingerprint, payload],
        )
        .map_err(|err| {
            if is_unique_violation(&err) {
                CacheError::DuplicateFingerprint(fingerprint.to_string())
            } else {
                CacheError::Write(err)
            }
        })?;
        Ok(())
    }

    /// Number of cached fingerprints.
    pub fn len(&self) -> Result<u64, CacheError> {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT COUNT(*) FROM cache", [], |row| row.get(0))
            .map_err(CacheError::Read)
    }

    pub fn is_empty(&self) -> Result<bool, CacheError> {
        Ok(self.len()? == 0)
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(code, _)
            if code.code == rusqlite::ErrorCode::ConstraintViolation
    )
}
