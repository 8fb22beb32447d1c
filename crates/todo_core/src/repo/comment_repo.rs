//! Comment repository with parent-key scans used by the delete cascade.

use super::{decode, encode, RepoError, RepoResult};
use crate::model::comment::{Comment, CommentId};
use crate::model::todo::TodoId;
use crate::store::{Bucket, EntityStore, IndexTerm, StoredRecord, INDEX_PARENT};

pub trait CommentRepository {
    fn get_comment(&self, key: CommentId) -> RepoResult<Option<Comment>>;
    fn save_comment(&self, comment: &Comment) -> RepoResult<()>;
    fn delete_comment(&self, key: CommentId) -> RepoResult<bool>;
    /// Comments whose `parent` equals `todo`, oldest first.
    fn comments_for(&self, todo: TodoId) -> RepoResult<Vec<Comment>>;
}

/// Comment repository backed by any [`EntityStore`].
pub struct StoreCommentRepository<S: EntityStore> {
    store: S,
}

impl<S: EntityStore> StoreCommentRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S: EntityStore> CommentRepository for StoreCommentRepository<S> {
    fn get_comment(&self, key: CommentId) -> RepoResult<Option<Comment>> {
        self.store
            .get(Bucket::Comments, &key.to_string())?
            .map(|record| parse_comment(&record))
            .transpose()
    }

    fn save_comment(&self, comment: &Comment) -> RepoResult<()> {
        comment.validate()?;
        let key = comment.key.to_string();
        let record = StoredRecord {
            bucket: Bucket::Comments,
            body: encode(Bucket::Comments, &key, comment)?,
            indexes: vec![IndexTerm::new(INDEX_PARENT, comment.parent.to_string())],
            key,
        };
        self.store.put(&record)?;
        Ok(())
    }

    fn delete_comment(&self, key: CommentId) -> RepoResult<bool> {
        Ok(self.store.delete(Bucket::Comments, &key.to_string())?)
    }

    fn comments_for(&self, todo: TodoId) -> RepoResult<Vec<Comment>> {
        let mut comments = self
            .store
            .scan(Bucket::Comments, &IndexTerm::new(INDEX_PARENT, todo.to_string()))?
            .iter()
            .map(parse_comment)
            .collect::<RepoResult<Vec<_>>>()?;
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.key.cmp(&b.key)));
        Ok(comments)
    }
}

fn parse_comment(record: &StoredRecord) -> RepoResult<Comment> {
    let comment: Comment = decode(record.bucket, &record.key, &record.body)?;
    if comment.key.to_string() != record.key {
        return Err(RepoError::InvalidData {
            bucket: record.bucket,
            key: record.key.clone(),
            message: format!("body carries mismatched key `{}`", comment.key),
        });
    }
    comment.validate()?;
    Ok(comment)
}
