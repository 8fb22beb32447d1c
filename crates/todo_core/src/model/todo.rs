//! Todo entity.
//!
//! # Responsibility
//! - Define the record stored in both the active and archived collections.
//! - Provide field-level mutation rules; lifecycle orchestration lives in
//!   `service::lifecycle`.
//!
//! # Invariants
//! - `key`, `author`, `project` and `created_at` never change after creation.
//! - `title` is never blank.
//! - `tags` keep authored order and duplicates.

use crate::model::now_epoch_ms;
use crate::model::user::UserRef;
use crate::store::Bucket;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable todo key, reused verbatim by the archived copy.
pub type TodoId = Uuid;

/// Addressing selector choosing which todo collection an operation consults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    #[default]
    Active,
    Archived,
}

impl Collection {
    /// Maps `archived=<flag>` addressing onto a collection.
    pub fn from_archived_flag(archived: bool) -> Self {
        if archived {
            Self::Archived
        } else {
            Self::Active
        }
    }

    pub fn bucket(self) -> Bucket {
        match self {
            Self::Active => Bucket::Todos,
            Self::Archived => Bucket::ArchivedTodos,
        }
    }

    /// The opposite collection.
    pub fn other(self) -> Self {
        match self {
            Self::Active => Self::Archived,
            Self::Archived => Self::Active,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Archived => "archived",
        }
    }
}

/// Raw markdown plus the markup produced by the rendering collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoContent {
    pub markdown: String,
    pub html: String,
}

/// Canonical todo record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub key: TodoId,
    /// Owning project key.
    pub project: String,
    pub title: String,
    pub content: Option<TodoContent>,
    pub author: UserRef,
    pub tags: Vec<String>,
    pub done: bool,
    /// Unix epoch milliseconds; listing order key.
    pub created_at: i64,
    /// Unix epoch milliseconds of the last field mutation.
    pub updated_at: i64,
}

/// Validated field changes applied by [`Todo::apply`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoChanges {
    pub title: Option<String>,
    pub content: Option<TodoContent>,
    pub tags: Option<Vec<String>>,
}

impl Todo {
    /// Creates an active-state todo with a fresh key and current timestamps.
    pub fn new(author: UserRef, project: impl Into<String>, title: impl Into<String>) -> Self {
        let now = now_epoch_ms();
        Self {
            key: Uuid::new_v4(),
            project: project.into(),
            title: title.into(),
            content: None,
            author,
            tags: Vec::new(),
            done: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Checks record-level invariants before persistence.
    pub fn validate(&self) -> Result<(), TodoValidationError> {
        if self.key.is_nil() {
            return Err(TodoValidationError::NilKey);
        }
        if self.title.trim().is_empty() {
            return Err(TodoValidationError::BlankTitle);
        }
        Ok(())
    }

    /// Applies a validated change set and refreshes `updated_at`.
    ///
    /// Absent fields are left untouched. A rejected change set leaves `self`
    /// unchanged.
    pub fn apply(&mut self, changes: TodoChanges) -> Result<(), TodoValidationError> {
        if let Some(title) = changes.title.as_deref() {
            if title.trim().is_empty() {
                return Err(TodoValidationError::BlankTitle);
            }
        }

        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(content) = changes.content {
            self.content = Some(content);
        }
        if let Some(tags) = changes.tags {
            self.tags = tags;
        }
        self.touch();
        Ok(())
    }

    pub fn mark_done(&mut self, done: bool) {
        self.done = done;
        self.touch();
    }

    /// Whether any tag of this todo is in `wanted`.
    pub fn has_any_tag<'a, I>(&self, wanted: I) -> bool
    where
        I: IntoIterator<Item = &'a String> + Clone,
    {
        self.tags
            .iter()
            .any(|tag| wanted.clone().into_iter().any(|w| w == tag))
    }

    fn touch(&mut self) {
        // Keep updated_at monotonic even if the wall clock steps backwards.
        self.updated_at = now_epoch_ms().max(self.updated_at);
    }
}

/// Request or record shape violation; always surfaced as a bad request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TodoValidationError {
    /// Payload is not a JSON object.
    NotAnObject,
    /// Required field is absent.
    MissingField(&'static str),
    /// Field is never accepted from callers (e.g. `author`).
    ForbiddenField(&'static str),
    /// Field is not part of the operation's schema.
    UnknownField(String),
    /// Field is present with the wrong JSON type.
    InvalidValue {
        field: &'static str,
        expected: &'static str,
    },
    BlankTitle,
    BlankComment,
    NilKey,
    /// Pages are 1-based.
    InvalidPage(u32),
}

impl Display for TodoValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnObject => write!(f, "payload must be a JSON object"),
            Self::MissingField(field) => write!(f, "missing required field `{field}`"),
            Self::ForbiddenField(field) => write!(f, "field `{field}` may not be supplied"),
            Self::UnknownField(field) => write!(f, "unknown field `{field}`"),
            Self::InvalidValue { field, expected } => {
                write!(f, "field `{field}` must be {expected}")
            }
            Self::BlankTitle => write!(f, "title must not be blank"),
            Self::BlankComment => write!(f, "comment content must not be blank"),
            Self::NilKey => write!(f, "key must not be nil"),
            Self::InvalidPage(page) => write!(f, "page must be >= 1, got {page}"),
        }
    }
}

impl Error for TodoValidationError {}

#[cfg(test)]
mod tests {
    use super::{Collection, Todo, TodoChanges, TodoContent, TodoValidationError};
    use crate::model::user::UserRef;
    use crate::store::Bucket;

    fn sample() -> Todo {
        Todo::new(UserRef::new("u1", "Ada"), "p1", "write docs")
    }

    #[test]
    fn new_todo_is_not_done_and_untagged() {
        let todo = sample();
        assert!(!todo.key.is_nil());
        assert!(!todo.done);
        assert!(todo.tags.is_empty());
        assert_eq!(todo.created_at, todo.updated_at);
        assert!(todo.validate().is_ok());
    }

    #[test]
    fn apply_rejects_blank_title_without_partial_write() {
        let mut todo = sample();
        let before = todo.clone();
        let err = todo
            .apply(TodoChanges {
                title: Some("  ".to_string()),
                tags: Some(vec!["x".to_string()]),
                ..TodoChanges::default()
            })
            .unwrap_err();
        assert_eq!(err, TodoValidationError::BlankTitle);
        assert_eq!(todo, before);
    }

    #[test]
    fn apply_only_touches_supplied_fields() {
        let mut todo = sample();
        todo.tags = vec!["a".to_string()];
        todo.apply(TodoChanges {
            content: Some(TodoContent {
                markdown: "x".to_string(),
                html: "<p>x</p>".to_string(),
            }),
            ..TodoChanges::default()
        })
        .unwrap();
        assert_eq!(todo.title, "write docs");
        assert_eq!(todo.tags, vec!["a".to_string()]);
        assert_eq!(todo.content.unwrap().html, "<p>x</p>");
    }

    #[test]
    fn tags_match_on_any_overlap() {
        let mut todo = sample();
        todo.tags = vec!["a".to_string(), "b".to_string()];
        let wanted = ["b".to_string(), "z".to_string()];
        assert!(todo.has_any_tag(&wanted));
        assert!(!todo.has_any_tag(&["z".to_string()]));
    }

    #[test]
    fn collection_selects_bucket() {
        assert_eq!(Collection::default(), Collection::Active);
        assert_eq!(Collection::from_archived_flag(true).bucket(), Bucket::ArchivedTodos);
        assert_eq!(Collection::Active.other(), Collection::Archived);
    }

    #[test]
    fn serializes_with_camel_case_timestamps() {
        let todo = sample();
        let json = serde_json::to_value(&todo).unwrap();
        assert_eq!(json["author"]["key"], "u1");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
        assert_eq!(json["done"], false);
    }
}
