//! Comment entity, a child record referencing its todo by key.

use crate::model::now_epoch_ms;
use crate::model::todo::{TodoId, TodoValidationError};
use crate::model::user::UserRef;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type CommentId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub key: CommentId,
    /// Key of the todo this comment belongs to, in either collection.
    pub parent: TodoId,
    pub author: UserRef,
    pub content: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Comment {
    pub fn new(author: UserRef, parent: TodoId, content: impl Into<String>) -> Self {
        let now = now_epoch_ms();
        Self {
            key: Uuid::new_v4(),
            parent,
            author,
            content: content.into(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<(), TodoValidationError> {
        if self.key.is_nil() || self.parent.is_nil() {
            return Err(TodoValidationError::NilKey);
        }
        if self.content.trim().is_empty() {
            return Err(TodoValidationError::BlankComment);
        }
        Ok(())
    }
}
