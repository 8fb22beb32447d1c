//! Listing and filtering engine.
//!
//! # Invariants
//! - Active and archived todos are never mixed in one page.
//! - Order is `created_at ASC, key ASC`, so pages are deterministic while the
//!   underlying set is unchanged.
//! - `total_todos` counts the whole matching set, independent of paging.
//! - A page past the end is empty, not an error.

use crate::model::todo::{Collection, Todo, TodoValidationError};
use crate::repo::todo_repo::TodoRepository;
use crate::service::error::TodoServiceError;
use log::debug;
use serde::Serialize;
use std::collections::BTreeSet;

/// Fixed page size.
pub const TODOS_PER_PAGE: usize = 20;

/// One page of a todo listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoPage {
    pub todos: Vec<Todo>,
    /// Echo of the requested (1-based) page.
    pub current_page: u32,
    pub total_todos: usize,
    pub todos_per_page: usize,
}

pub struct ListingEngine<'r, T: TodoRepository> {
    todos: &'r T,
}

impl<'r, T: TodoRepository> ListingEngine<'r, T> {
    pub fn new(todos: &'r T) -> Self {
        Self { todos }
    }

    /// Lists one page of `project`'s todos from `collection`.
    pub fn list(
        &self,
        project: &str,
        collection: Collection,
        page: Option<u32>,
    ) -> Result<TodoPage, TodoServiceError> {
        let page = resolve_page(page)?;
        let todos = self.todos.scan_project(collection, project)?;
        Ok(paginate(todos, page))
    }

    /// Like [`Self::list`], restricted to todos carrying at least one of
    /// `tags`. An empty tag set matches nothing.
    pub fn list_by_tags(
        &self,
        project: &str,
        tags: &BTreeSet<String>,
        collection: Collection,
        page: Option<u32>,
    ) -> Result<TodoPage, TodoServiceError> {
        let page = resolve_page(page)?;
        let matching = self
            .todos
            .scan_project(collection, project)?
            .into_iter()
            .filter(|todo| todo.has_any_tag(tags))
            .collect();
        Ok(paginate(matching, page))
    }

    /// Distinct tags across the project's active todos.
    pub fn list_all_tags(&self, project: &str) -> Result<BTreeSet<String>, TodoServiceError> {
        let tags: BTreeSet<String> = self
            .todos
            .scan_project(Collection::Active, project)?
            .into_iter()
            .flat_map(|todo| todo.tags)
            .collect();
        debug!(
            "event=todo_tags module=listing status=ok project={project} tag_count={}",
            tags.len()
        );
        Ok(tags)
    }
}

fn resolve_page(page: Option<u32>) -> Result<u32, TodoValidationError> {
    match page {
        None => Ok(1),
        Some(0) => Err(TodoValidationError::InvalidPage(0)),
        Some(page) => Ok(page),
    }
}

fn paginate(mut todos: Vec<Todo>, page: u32) -> TodoPage {
    todos.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.key.cmp(&b.key)));
    let total_todos = todos.len();
    let offset = usize::try_from(page - 1)
        .unwrap_or(usize::MAX)
        .saturating_mul(TODOS_PER_PAGE);

    TodoPage {
        todos: todos.into_iter().skip(offset).take(TODOS_PER_PAGE).collect(),
        current_page: page,
        total_todos,
        todos_per_page: TODOS_PER_PAGE,
    }
}
