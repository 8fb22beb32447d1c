//! Typed repositories over the entity store.
//!
//! # Responsibility
//! - Encode/decode entities to store records and keep index terms in sync.
//! - Expose persistence primitives only (load, save, delete, scan); cascades
//!   and transitions belong to `service::lifecycle`.
//!
//! # Invariants
//! - Write paths validate the entity before touching the store.
//! - Read paths reject undecodable or mismatched records instead of masking
//!   them.

pub mod comment_repo;
pub mod todo_repo;

use crate::model::todo::TodoValidationError;
use crate::store::{Bucket, StoreError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository failure for entity persistence and queries.
#[derive(Debug)]
pub enum RepoError {
    Validation(TodoValidationError),
    Store(StoreError),
    /// Persisted record cannot be decoded into a valid entity.
    InvalidData {
        bucket: Bucket,
        key: String,
        message: String,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::InvalidData {
                bucket,
                key,
                message,
            } => write!(
                f,
                "invalid persisted record `{key}` in {}: {message}",
                bucket.as_str()
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::InvalidData { .. } => None,
        }
    }
}

impl From<TodoValidationError> for RepoError {
    fn from(value: TodoValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

fn encode<T: serde::Serialize>(bucket: Bucket, key: &str, entity: &T) -> RepoResult<String> {
    serde_json::to_string(entity).map_err(|err| RepoError::InvalidData {
        bucket,
        key: key.to_string(),
        message: err.to_string(),
    })
}

fn decode<T: serde::de::DeserializeOwned>(bucket: Bucket, key: &str, body: &str) -> RepoResult<T> {
    serde_json::from_str(body).map_err(|err| RepoError::InvalidData {
        bucket,
        key: key.to_string(),
        message: err.to_string(),
    })
}
