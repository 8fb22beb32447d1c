//! Todo lifecycle manager.
//!
//! # Responsibility
//! - Own every Active/Archived/Deleted transition of a todo key.
//! - Cascade permanent deletion to comments referencing the todo.
//!
//! # Invariants
//! - Archive and unarchive move the whole record in one store transaction;
//!   the key never sits in both collections.
//! - Re-archiving (or re-unarchiving) reports `NoEffect`, while deleting a
//!   key that is already gone reports not-found.
//! - A todo of another project is invisible here, as if absent.
//! - Comment cascade failures are logged and swallowed; the todo deletion
//!   outcome stands.

use crate::model::todo::{Collection, Todo, TodoId};
use crate::repo::comment_repo::CommentRepository;
use crate::repo::todo_repo::TodoRepository;
use crate::service::error::{Outcome, TodoServiceError};
use log::{info, warn};

/// Lifecycle state of a todo key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TodoState {
    Active,
    Archived,
    /// Terminal: no record under the key in either collection.
    Deleted,
}

impl From<Collection> for TodoState {
    fn from(value: Collection) -> Self {
        match value {
            Collection::Active => Self::Active,
            Collection::Archived => Self::Archived,
        }
    }
}

/// Result of a lifecycle request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The todo moved into the given state.
    Applied(TodoState),
    /// The todo was already in the requested state.
    NoEffect,
}

impl Transition {
    pub fn outcome(self) -> Outcome {
        match self {
            Self::Applied(_) => Outcome::Ok,
            Self::NoEffect => Outcome::NoEffect,
        }
    }
}

/// Delete addressing: which collection, and whether to skip archival.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteRequest {
    pub collection: Collection,
    pub permanent: bool,
}

impl DeleteRequest {
    /// Delete-by-default: archives an active todo.
    pub fn soft(collection: Collection) -> Self {
        Self {
            collection,
            permanent: false,
        }
    }

    pub fn permanent(collection: Collection) -> Self {
        Self {
            collection,
            permanent: true,
        }
    }
}

/// Transition orchestrator borrowing the todo and comment repositories.
pub struct LifecycleManager<'r, T: TodoRepository, C: CommentRepository> {
    todos: &'r T,
    comments: &'r C,
}

impl<'r, T: TodoRepository, C: CommentRepository> LifecycleManager<'r, T, C> {
    pub fn new(todos: &'r T, comments: &'r C) -> Self {
        Self { todos, comments }
    }

    /// `Active -> Archived`.
    pub fn archive(&self, project: &str, key: TodoId) -> Result<Transition, TodoServiceError> {
        self.shift(project, key, Collection::Active)
    }

    /// `Archived -> Active`.
    pub fn unarchive(&self, project: &str, key: TodoId) -> Result<Transition, TodoServiceError> {
        self.shift(project, key, Collection::Archived)
    }

    /// Delete with collection addressing and optional permanence.
    ///
    /// | addressed | permanent | result |
    /// |---|---|---|
    /// | active | no | archived |
    /// | active or archived | yes | destroyed with comments |
    /// | archived | no | `NoEffect` |
    ///
    /// A key absent from the addressed collection is not-found in every row.
    pub fn delete(
        &self,
        project: &str,
        key: TodoId,
        request: DeleteRequest,
    ) -> Result<Transition, TodoServiceError> {
        match request {
            DeleteRequest {
                permanent: true,
                collection,
            } => self.destroy(project, key, collection),
            DeleteRequest {
                permanent: false,
                collection: Collection::Active,
            } => {
                if self.load(project, Collection::Active, key)?.is_none() {
                    return Err(TodoServiceError::not_found(key, Collection::Active));
                }
                self.shift(project, key, Collection::Active)
            }
            DeleteRequest {
                permanent: false,
                collection: Collection::Archived,
            } => {
                if self.load(project, Collection::Archived, key)?.is_none() {
                    return Err(TodoServiceError::not_found(key, Collection::Archived));
                }
                info!(
                    "event=todo_delete module=lifecycle status=no_effect project={project} todo={key} collection=archived"
                );
                Ok(Transition::NoEffect)
            }
        }
    }

    fn shift(
        &self,
        project: &str,
        key: TodoId,
        from: Collection,
    ) -> Result<Transition, TodoServiceError> {
        let to = from.other();
        if let Some(todo) = self.load(project, from, key)? {
            if self.todos.move_todo(&todo, from)? {
                info!(
                    "event=todo_move module=lifecycle status=ok project={project} todo={key} from={} to={}",
                    from.as_str(),
                    to.as_str()
                );
                return Ok(Transition::Applied(to.into()));
            }
            // Lost a race with a concurrent transition; fall through and
            // report whatever state the key ended up in.
        }

        if self.load(project, to, key)?.is_some() {
            info!(
                "event=todo_move module=lifecycle status=no_effect project={project} todo={key} to={}",
                to.as_str()
            );
            return Ok(Transition::NoEffect);
        }
        Err(TodoServiceError::not_found(key, from))
    }

    fn destroy(
        &self,
        project: &str,
        key: TodoId,
        collection: Collection,
    ) -> Result<Transition, TodoServiceError> {
        if self.load(project, collection, key)?.is_none()
            || !self.todos.delete_todo(collection, key)?
        {
            return Err(TodoServiceError::not_found(key, collection));
        }

        let removed_comments = self.cascade_comments(key);
        info!(
            "event=todo_delete module=lifecycle status=ok project={project} todo={key} collection={} comments_removed={removed_comments}",
            collection.as_str()
        );
        Ok(Transition::Applied(TodoState::Deleted))
    }

    /// Deletes every comment whose parent is `key`; returns how many went.
    fn cascade_comments(&self, key: TodoId) -> usize {
        let comments = match self.comments.comments_for(key) {
            Ok(comments) => comments,
            Err(err) => {
                warn!(
                    "event=comment_cascade module=lifecycle status=error todo={key} error_code=comment_scan_failed error={err}"
                );
                return 0;
            }
        };

        let mut removed = 0;
        for comment in comments {
            match self.comments.delete_comment(comment.key) {
                Ok(true) => removed += 1,
                Ok(false) => {}
                Err(err) => warn!(
                    "event=comment_cascade module=lifecycle status=error todo={key} comment={} error_code=comment_delete_failed error={err}",
                    comment.key
                ),
            }
        }
        removed
    }

    fn load(
        &self,
        project: &str,
        collection: Collection,
        key: TodoId,
    ) -> Result<Option<Todo>, TodoServiceError> {
        Ok(self
            .todos
            .get_todo(collection, key)?
            .filter(|todo| todo.project == project))
    }
}
