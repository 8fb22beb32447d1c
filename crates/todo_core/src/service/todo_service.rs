//! Todo use-case facade.
//!
//! # Responsibility
//! - Gate every operation on the authorization collaborator.
//! - Parse strict payloads, render markdown and apply field edits.
//! - Delegate transitions to [`LifecycleManager`] and listing to
//!   [`ListingEngine`].
//!
//! # Invariants
//! - Permission is checked before payload parsing and before any store access.
//! - `author` always comes from the acting identity.
//! - Nothing is written unless the whole payload validates.
//! - Edits overwrite an existing record only; a todo deleted or moved while
//!   being edited stays gone and the edit reports not-found.
//! - Collection addressing is part of a todo's address: a key in the other
//!   collection is not-found.

use crate::access::{Actor, Authorizer, MarkdownRenderer, TodoAction};
use crate::model::comment::Comment;
use crate::model::payload::{MarkDone, NewTodo, TodoPatch};
use crate::model::todo::{Collection, Todo, TodoChanges, TodoContent, TodoId, TodoValidationError};
use crate::model::user::UserRef;
use crate::repo::comment_repo::CommentRepository;
use crate::repo::todo_repo::TodoRepository;
use crate::service::error::TodoServiceError;
use crate::service::lifecycle::{DeleteRequest, LifecycleManager, Transition};
use crate::service::listing::{ListingEngine, TodoPage};
use log::{debug, info};
use serde_json::Value;
use std::collections::BTreeSet;

pub type ServiceResult<T> = Result<T, TodoServiceError>;

/// Facade over todo/comment repositories and the external collaborators.
pub struct TodoService<T, C, A, M>
where
    T: TodoRepository,
    C: CommentRepository,
    A: Authorizer,
    M: MarkdownRenderer,
{
    todos: T,
    comments: C,
    authorizer: A,
    renderer: M,
}

impl<T, C, A, M> TodoService<T, C, A, M>
where
    T: TodoRepository,
    C: CommentRepository,
    A: Authorizer,
    M: MarkdownRenderer,
{
    pub fn new(todos: T, comments: C, authorizer: A, renderer: M) -> Self {
        Self {
            todos,
            comments,
            authorizer,
            renderer,
        }
    }

    /// Creates an active todo authored by the acting user.
    pub fn create_todo(
        &self,
        actor: &Actor,
        project: &str,
        payload: &Value,
    ) -> ServiceResult<Todo> {
        let author = self.authorize_author(actor, project, TodoAction::Write)?;
        let draft = NewTodo::from_json(payload)?;

        let mut todo = Todo::new(author, project, draft.title);
        todo.tags = draft.tags;
        todo.content = draft.markdown.map(|markdown| self.render(markdown));
        self.todos.save_todo(Collection::Active, &todo)?;

        info!(
            "event=todo_create module=todo_service status=ok project={project} todo={} tag_count={}",
            todo.key,
            todo.tags.len()
        );
        Ok(todo)
    }

    /// Applies a partial `{title, content, tags}` update.
    pub fn update_todo(
        &self,
        actor: &Actor,
        project: &str,
        key: TodoId,
        collection: Collection,
        payload: &Value,
    ) -> ServiceResult<Todo> {
        self.authorize(actor, project, TodoAction::Write)?;
        let patch = TodoPatch::from_json(payload)?;
        let mut todo = self.load(project, key, collection)?;

        todo.apply(TodoChanges {
            title: patch.title,
            content: patch.markdown.map(|markdown| self.render(markdown)),
            tags: patch.tags,
        })?;
        self.write_back(project, collection, &todo)?;

        info!(
            "event=todo_update module=todo_service status=ok project={project} todo={key} collection={}",
            collection.as_str()
        );
        Ok(todo)
    }

    pub fn get_todo(
        &self,
        actor: &Actor,
        project: &str,
        key: TodoId,
        collection: Collection,
    ) -> ServiceResult<Todo> {
        self.authorize(actor, project, TodoAction::Read)?;
        self.load(project, key, collection)
    }

    /// Sets `done`; the payload must be exactly `{done: bool}`.
    pub fn mark_done(
        &self,
        actor: &Actor,
        project: &str,
        key: TodoId,
        collection: Collection,
        payload: &Value,
    ) -> ServiceResult<Todo> {
        self.authorize(actor, project, TodoAction::Write)?;
        let MarkDone { done } = MarkDone::from_json(payload)?;
        let mut todo = self.load(project, key, collection)?;

        todo.mark_done(done);
        self.write_back(project, collection, &todo)?;

        info!(
            "event=todo_markdone module=todo_service status=ok project={project} todo={key} collection={} done={done}",
            collection.as_str()
        );
        Ok(todo)
    }

    pub fn delete_todo(
        &self,
        actor: &Actor,
        project: &str,
        key: TodoId,
        request: DeleteRequest,
    ) -> ServiceResult<Transition> {
        self.authorize(actor, project, TodoAction::Write)?;
        self.lifecycle().delete(project, key, request)
    }

    pub fn archive_todo(
        &self,
        actor: &Actor,
        project: &str,
        key: TodoId,
    ) -> ServiceResult<Transition> {
        self.authorize(actor, project, TodoAction::Write)?;
        self.lifecycle().archive(project, key)
    }

    pub fn unarchive_todo(
        &self,
        actor: &Actor,
        project: &str,
        key: TodoId,
    ) -> ServiceResult<Transition> {
        self.authorize(actor, project, TodoAction::Write)?;
        self.lifecycle().unarchive(project, key)
    }

    pub fn list_todos(
        &self,
        actor: &Actor,
        project: &str,
        collection: Collection,
        page: Option<u32>,
    ) -> ServiceResult<TodoPage> {
        self.authorize(actor, project, TodoAction::Read)?;
        ListingEngine::new(&self.todos).list(project, collection, page)
    }

    /// Lists todos carrying any of `tags` (union, not intersection).
    pub fn filter_todos(
        &self,
        actor: &Actor,
        project: &str,
        tags: &BTreeSet<String>,
        collection: Collection,
        page: Option<u32>,
    ) -> ServiceResult<TodoPage> {
        self.authorize(actor, project, TodoAction::Read)?;
        ListingEngine::new(&self.todos).list_by_tags(project, tags, collection, page)
    }

    /// Distinct tags of the project's active todos.
    pub fn list_tags(&self, actor: &Actor, project: &str) -> ServiceResult<BTreeSet<String>> {
        self.authorize(actor, project, TodoAction::Read)?;
        ListingEngine::new(&self.todos).list_all_tags(project)
    }

    /// Adds a comment to an active todo.
    pub fn add_comment(
        &self,
        actor: &Actor,
        project: &str,
        todo_key: TodoId,
        content: &str,
    ) -> ServiceResult<Comment> {
        let author = self.authorize_author(actor, project, TodoAction::Write)?;
        if content.trim().is_empty() {
            return Err(TodoValidationError::BlankComment.into());
        }
        self.load(project, todo_key, Collection::Active)?;

        let comment = Comment::new(author, todo_key, content);
        self.comments.save_comment(&comment)?;
        info!(
            "event=comment_create module=todo_service status=ok project={project} todo={todo_key} comment={}",
            comment.key
        );
        Ok(comment)
    }

    /// Comments of a todo addressed in `collection`, oldest first.
    pub fn list_comments(
        &self,
        actor: &Actor,
        project: &str,
        todo_key: TodoId,
        collection: Collection,
    ) -> ServiceResult<Vec<Comment>> {
        self.authorize(actor, project, TodoAction::Read)?;
        self.load(project, todo_key, collection)?;
        Ok(self.comments.comments_for(todo_key)?)
    }

    fn lifecycle(&self) -> LifecycleManager<'_, T, C> {
        LifecycleManager::new(&self.todos, &self.comments)
    }

    fn authorize(&self, actor: &Actor, project: &str, action: TodoAction) -> ServiceResult<()> {
        if self.authorizer.authorize(actor, project, action) {
            return Ok(());
        }
        let err = TodoServiceError::Forbidden {
            project: project.to_string(),
            action,
        };
        info!(
            "event=access_check module=todo_service status={} project={project} action={} actor={}",
            err.code(),
            action.as_str(),
            actor.user().map_or("anonymous", |user| user.key.as_str())
        );
        Err(err)
    }

    /// Authorizes and returns the acting user for `author` fields.
    fn authorize_author(
        &self,
        actor: &Actor,
        project: &str,
        action: TodoAction,
    ) -> ServiceResult<UserRef> {
        self.authorize(actor, project, action)?;
        actor.user().cloned().ok_or_else(|| TodoServiceError::Forbidden {
            project: project.to_string(),
            action,
        })
    }

    fn load(&self, project: &str, key: TodoId, collection: Collection) -> ServiceResult<Todo> {
        let todo = self
            .todos
            .get_todo(collection, key)?
            .filter(|todo| todo.project == project);
        todo.ok_or_else(|| {
            let err = TodoServiceError::not_found(key, collection);
            debug!(
                "event=todo_load module=todo_service status={} project={project} todo={key} collection={}",
                err.code(),
                collection.as_str()
            );
            err
        })
    }

    /// Writes an edited todo back without recreating it if it was moved or
    /// deleted after it was loaded.
    fn write_back(&self, project: &str, collection: Collection, todo: &Todo) -> ServiceResult<()> {
        if self.todos.update_todo(collection, todo)? {
            return Ok(());
        }
        let err = TodoServiceError::not_found(todo.key, collection);
        info!(
            "event=todo_write module=todo_service status={} project={project} todo={} collection={}",
            err.code(),
            todo.key,
            collection.as_str()
        );
        Err(err)
    }

    fn render(&self, markdown: String) -> TodoContent {
        let html = self.renderer.render(&markdown);
        TodoContent { markdown, html }
    }
}
