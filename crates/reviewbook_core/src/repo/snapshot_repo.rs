//! Snapshot persistence adapters.
//!
//! # Responsibility
//! - Encode/decode `RestaurantList` into a versioned JSON document.
//! - Provide SQLite-backed and in-memory `PersistenceAdapter` implementations.
//!
//! # Invariants
//! - `save` replaces the stored document atomically (single upsert).
//! - `load` returns `Ok(None)` only when no document exists.
//! - Decoded snapshots pass the same text validation as write paths.

use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::restaurant::{validate_text, RestaurantList, TextField};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Document name used when none is configured.
pub const DEFAULT_DOCUMENT_NAME: &str = "restaurants";

/// Envelope version written by this build.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence failure.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Encode(serde_json::Error),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "snapshot encoding failed: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted snapshot: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::InvalidData(_) => None,
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

/// Durable sink/source for whole-list snapshots.
pub trait PersistenceAdapter {
    /// Restores the last saved snapshot, if any.
    fn load(&self) -> RepoResult<Option<RestaurantList>>;
    /// Replaces the stored snapshot.
    fn save(&self, list: &RestaurantList) -> RepoResult<()>;
}

#[derive(Serialize)]
struct SnapshotEnvelopeRef<'a> {
    version: u32,
    restaurants: &'a RestaurantList,
}

#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

#[derive(Deserialize)]
struct SnapshotEnvelope {
    restaurants: RestaurantList,
}

/// Encodes a snapshot into the stored document body.
pub fn encode_snapshot(list: &RestaurantList) -> RepoResult<Vec<u8>> {
    serde_json::to_vec(&SnapshotEnvelopeRef {
        version: SNAPSHOT_FORMAT_VERSION,
        restaurants: list,
    })
    .map_err(RepoError::Encode)
}

/// Decodes and validates a stored document body.
pub fn decode_snapshot(body: &[u8]) -> RepoResult<RestaurantList> {
    let probe: VersionProbe = serde_json::from_slice(body)
        .map_err(|err| RepoError::InvalidData(format!("unreadable envelope: {err}")))?;
    if probe.version != SNAPSHOT_FORMAT_VERSION {
        return Err(RepoError::InvalidData(format!(
            "unsupported snapshot version {} (expected {SNAPSHOT_FORMAT_VERSION})",
            probe.version
        )));
    }

    let envelope: SnapshotEnvelope = serde_json::from_slice(body)
        .map_err(|err| RepoError::InvalidData(format!("malformed restaurants: {err}")))?;
    validate_snapshot(&envelope.restaurants)?;
    Ok(envelope.restaurants)
}

fn validate_snapshot(list: &RestaurantList) -> RepoResult<()> {
    for (index, restaurant) in list.restaurants().iter().enumerate() {
        validate_text(TextField::Title, &restaurant.title).map_err(|err| {
            RepoError::InvalidData(format!("restaurant {index}: {err}"))
        })?;
        for (review_index, review) in restaurant.reviews.iter().enumerate() {
            validate_text(TextField::Review, &review.text).map_err(|err| {
                RepoError::InvalidData(format!(
                    "restaurant {index} review {review_index}: {err}"
                ))
            })?;
        }
    }
    Ok(())
}

/// SQLite-backed snapshot persistence.
pub struct SqlitePersistence {
    conn: Connection,
    document_name: String,
}

impl SqlitePersistence {
    /// Wraps an already migrated connection.
    pub fn new(conn: Connection, document_name: impl Into<String>) -> Self {
        Self {
            conn,
            document_name: document_name.into(),
        }
    }

    /// Opens (and migrates) the database at `path`.
    pub fn open(path: impl AsRef<Path>, document_name: impl Into<String>) -> RepoResult<Self> {
        Ok(Self::new(open_db(path)?, document_name))
    }

    pub fn open_in_memory(document_name: impl Into<String>) -> RepoResult<Self> {
        Ok(Self::new(open_db_in_memory()?, document_name))
    }

    pub fn document_name(&self) -> &str {
        &self.document_name
    }
}

impl PersistenceAdapter for SqlitePersistence {
    fn load(&self) -> RepoResult<Option<RestaurantList>> {
        let body: Option<Vec<u8>> = self
            .conn
            .query_row(
                "SELECT body FROM documents WHERE name = ?1;",
                [self.document_name.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        body.map(|bytes| decode_snapshot(&bytes)).transpose()
    }

    fn save(&self, list: &RestaurantList) -> RepoResult<()> {
        let body = encode_snapshot(list)?;
        self.conn.execute(
            "INSERT INTO documents (name, body, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(name) DO UPDATE SET
                body = excluded.body,
                updated_at = excluded.updated_at;",
            params![self.document_name.as_str(), body],
        )?;
        Ok(())
    }
}

/// In-memory document store for tests and ephemeral sessions.
///
/// Clones share the same backing map.
#[derive(Debug, Clone, Default)]
pub struct MemoryPersistence {
    documents: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
    document_name: String,
}

impl MemoryPersistence {
    pub fn new(document_name: impl Into<String>) -> Self {
        Self {
            documents: Arc::default(),
            document_name: document_name.into(),
        }
    }

    /// Raw stored body, for assertions on the encoded form.
    pub fn raw_document(&self) -> Option<Vec<u8>> {
        self.documents().get(&self.document_name).cloned()
    }

    /// Overwrites the raw stored body.
    pub fn put_raw_document(&self, body: Vec<u8>) {
        self.documents().insert(self.document_name.clone(), body);
    }

    fn documents(&self) -> MutexGuard<'_, BTreeMap<String, Vec<u8>>> {
        // A panic while holding the lock cannot leave a half-written body.
        self.documents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PersistenceAdapter for MemoryPersistence {
    fn load(&self) -> RepoResult<Option<RestaurantList>> {
        self.raw_document()
            .map(|bytes| decode_snapshot(&bytes))
            .transpose()
    }

    fn save(&self, list: &RestaurantList) -> RepoResult<()> {
        let body = encode_snapshot(list)?;
        self.put_raw_document(body);
        Ok(())
    }
}
