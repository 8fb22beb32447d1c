//! Service error and boundary outcome taxonomy.

use crate::access::TodoAction;
use crate::model::todo::{Collection, TodoId, TodoValidationError};
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Boundary outcome reported to callers of the todo core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Operation completed; state was read or mutated.
    Ok,
    /// Valid request, but the target state was already in place.
    NoEffect,
    /// Fix your request.
    BadRequest,
    /// You may not do this.
    Forbidden,
    /// That does not exist in the addressed collection.
    NotFound,
    /// Storage failure; not the caller's fault.
    Failure,
}

/// Errors from todo service operations.
#[derive(Debug)]
pub enum TodoServiceError {
    Validation(TodoValidationError),
    Forbidden {
        project: String,
        action: TodoAction,
    },
    TodoNotFound {
        key: TodoId,
        collection: Collection,
    },
    Repo(RepoError),
}

impl TodoServiceError {
    pub fn not_found(key: TodoId, collection: Collection) -> Self {
        Self::TodoNotFound { key, collection }
    }

    pub fn outcome(&self) -> Outcome {
        match self {
            Self::Validation(_) => Outcome::BadRequest,
            Self::Forbidden { .. } => Outcome::Forbidden,
            Self::TodoNotFound { .. } => Outcome::NotFound,
            Self::Repo(RepoError::Validation(_)) => Outcome::BadRequest,
            Self::Repo(_) => Outcome::Failure,
        }
    }

    /// Short stable code used in log lines.
    pub fn code(&self) -> &'static str {
        match self.outcome() {
            Outcome::Ok => "ok",
            Outcome::NoEffect => "no_effect",
            Outcome::BadRequest => "bad_request",
            Outcome::Forbidden => "forbidden",
            Outcome::NotFound => "not_found",
            Outcome::Failure => "failure",
        }
    }
}

impl Display for TodoServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "invalid request: {err}"),
            Self::Forbidden { project, action } => {
                write!(f, "{} access to project `{project}` denied", action.as_str())
            }
            Self::TodoNotFound { key, collection } => {
                write!(f, "todo not found in {} collection: {key}", collection.as_str())
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TodoServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Forbidden { .. } | Self::TodoNotFound { .. } => None,
        }
    }
}

impl From<TodoValidationError> for TodoServiceError {
    fn from(value: TodoValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for TodoServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}
