//! Entity store adapter: bucketed get/put/delete/scan over unique keys.
//!
//! # Responsibility
//! - Give every entity kind one storage contract, independent of schema.
//! - Keep index-driven scans (`project`, `parent`) inside the adapter.
//!
//! # Invariants
//! - Each individual call is atomic.
//! - `replace` never resurrects a key removed by a concurrent delete.
//! - `relocate` moves one key between buckets in a single transaction; the
//!   key is never visible in both buckets.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod sqlite;

pub use sqlite::SqliteEntityStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Index field linking a todo to its project.
pub const INDEX_PROJECT: &str = "project";
/// Index field linking a comment to its parent todo.
pub const INDEX_PARENT: &str = "parent";

const INDEX_FIELDS: &[&str] = &[INDEX_PROJECT, INDEX_PARENT];

/// Physical collection inside the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Todos,
    ArchivedTodos,
    Comments,
}

impl Bucket {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todos => "todos",
            Self::ArchivedTodos => "archived_todos",
            Self::Comments => "comments",
        }
    }
}

/// One secondary index entry, e.g. `project = <project key>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexTerm {
    pub field: &'static str,
    pub value: String,
}

impl IndexTerm {
    pub fn new(field: &'static str, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }
}

/// Raw stored entity: serialized body plus the index terms it is reachable by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    pub bucket: Bucket,
    pub key: String,
    pub body: String,
    pub indexes: Vec<IndexTerm>,
}

/// Storage contract consumed by repositories.
pub trait EntityStore {
    fn get(&self, bucket: Bucket, key: &str) -> StoreResult<Option<StoredRecord>>;
    /// Inserts or overwrites the record and replaces its index terms.
    fn put(&self, record: &StoredRecord) -> StoreResult<()>;
    /// Overwrites an existing record and its index terms.
    ///
    /// Returns `false` without writing anything when the key is absent from
    /// the record's bucket.
    fn replace(&self, record: &StoredRecord) -> StoreResult<bool>;
    /// Returns whether a row was removed.
    fn delete(&self, bucket: Bucket, key: &str) -> StoreResult<bool>;
    /// Returns every record in `bucket` carrying `term`, in key order.
    fn scan(&self, bucket: Bucket, term: &IndexTerm) -> StoreResult<Vec<StoredRecord>>;
    /// Atomically removes `key` from `from` and stores `record` in its bucket.
    ///
    /// Returns `false` without writing anything when `key` is absent from
    /// `from`.
    fn relocate(&self, key: &str, from: Bucket, record: &StoredRecord) -> StoreResult<bool>;
}

impl<S: EntityStore + ?Sized> EntityStore for &S {
    fn get(&self, bucket: Bucket, key: &str) -> StoreResult<Option<StoredRecord>> {
        (**self).get(bucket, key)
    }

    fn put(&self, record: &StoredRecord) -> StoreResult<()> {
        (**self).put(record)
    }

    fn replace(&self, record: &StoredRecord) -> StoreResult<bool> {
        (**self).replace(record)
    }

    fn delete(&self, bucket: Bucket, key: &str) -> StoreResult<bool> {
        (**self).delete(bucket, key)
    }

    fn scan(&self, bucket: Bucket, term: &IndexTerm) -> StoreResult<Vec<StoredRecord>> {
        (**self).scan(bucket, term)
    }

    fn relocate(&self, key: &str, from: Bucket, record: &StoredRecord) -> StoreResult<bool> {
        (**self).relocate(key, from, record)
    }
}

/// Storage transport failure.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "entity store: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
