//! Todo repository for the active and archived collections.

use super::{decode, encode, RepoError, RepoResult};
use crate::model::todo::{Collection, Todo, TodoId};
use crate::store::{EntityStore, IndexTerm, StoredRecord, INDEX_PROJECT};

/// Persistence primitives for todos, addressed by collection.
pub trait TodoRepository {
    fn get_todo(&self, collection: Collection, key: TodoId) -> RepoResult<Option<Todo>>;
    /// Inserts or overwrites `todo` in `collection`.
    fn save_todo(&self, collection: Collection, todo: &Todo) -> RepoResult<()>;
    /// Overwrites `todo` only if it is still stored in `collection`.
    /// Returns `false` when it is gone.
    fn update_todo(&self, collection: Collection, todo: &Todo) -> RepoResult<bool>;
    /// Returns whether a record was removed.
    fn delete_todo(&self, collection: Collection, key: TodoId) -> RepoResult<bool>;
    /// Every todo of `project` in `collection`, in no particular order.
    fn scan_project(&self, collection: Collection, project: &str) -> RepoResult<Vec<Todo>>;
    /// Moves `todo` (already carrying its new state) from `from` into the other
    /// collection. Returns `false` when it was no longer in `from`.
    fn move_todo(&self, todo: &Todo, from: Collection) -> RepoResult<bool>;
}

/// Todo repository backed by any [`EntityStore`].
pub struct StoreTodoRepository<S: EntityStore> {
    store: S,
}

impl<S: EntityStore> StoreTodoRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn to_record(&self, collection: Collection, todo: &Todo) -> RepoResult<StoredRecord> {
        todo.validate()?;
        let bucket = collection.bucket();
        let key = todo.key.to_string();
        Ok(StoredRecord {
            bucket,
            body: encode(bucket, &key, todo)?,
            indexes: vec![IndexTerm::new(INDEX_PROJECT, todo.project.as_str())],
            key,
        })
    }
}

impl<S: EntityStore> TodoRepository for StoreTodoRepository<S> {
    fn get_todo(&self, collection: Collection, key: TodoId) -> RepoResult<Option<Todo>> {
        self.store
            .get(collection.bucket(), &key.to_string())?
            .map(|record| parse_todo(&record))
            .transpose()
    }

    fn save_todo(&self, collection: Collection, todo: &Todo) -> RepoResult<()> {
        let record = self.to_record(collection, todo)?;
        self.store.put(&record)?;
        Ok(())
    }

    fn update_todo(&self, collection: Collection, todo: &Todo) -> RepoResult<bool> {
        let record = self.to_record(collection, todo)?;
        Ok(self.store.replace(&record)?)
    }

    fn delete_todo(&self, collection: Collection, key: TodoId) -> RepoResult<bool> {
        Ok(self.store.delete(collection.bucket(), &key.to_string())?)
    }

    fn scan_project(&self, collection: Collection, project: &str) -> RepoResult<Vec<Todo>> {
        self.store
            .scan(collection.bucket(), &IndexTerm::new(INDEX_PROJECT, project))?
            .iter()
            .map(parse_todo)
            .collect()
    }

    fn move_todo(&self, todo: &Todo, from: Collection) -> RepoResult<bool> {
        let record = self.to_record(from.other(), todo)?;
        Ok(self.store.relocate(&record.key, from.bucket(), &record)?)
    }
}

fn parse_todo(record: &StoredRecord) -> RepoResult<Todo> {
    let todo: Todo = decode(record.bucket, &record.key, &record.body)?;
    if todo.key.to_string() != record.key {
        return Err(RepoError::InvalidData {
            bucket: record.bucket,
            key: record.key.clone(),
            message: format!("body carries mismatched key `{}`", todo.key),
        });
    }
    todo.validate()?;
    Ok(todo)
}
