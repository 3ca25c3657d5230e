use async_trait::async_trait;
use bson::{doc, oid::ObjectId, DateTime};
use mongodb::Database;
use drinkup_db::models::Comment;

use super::base::{BaseDao, DaoResult};
use crate::store::CommentStore;

pub struct CommentDao {
    pub base: BaseDao<Comment>,
}

impl CommentDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Comment::COLLECTION),
        }
    }

    pub async fn create(
        &self,
        session_id: ObjectId,
        author_id: ObjectId,
        content: String,
    ) -> DaoResult<Comment> {
        let comment = Comment {
            id: None,
            session_id,
            author_id,
            content,
            created_at: DateTime::now(),
        };

        let id = self.base.insert_one(&comment).await?;
        self.base.find_by_id(id).await
    }

    pub async fn find_by_id(&self, comment_id: ObjectId) -> DaoResult<Comment> {
        self.base.find_by_id(comment_id).await
    }

    /// Removes the comment document only. Use `CommentService::delete`
    /// to cascade to mentions.
    pub async fn delete(&self, comment_id: ObjectId) -> DaoResult<bool> {
        let deleted = self.base.hard_delete(doc! { "_id": comment_id }).await?;
        Ok(deleted > 0)
    }
}

#[async_trait]
impl CommentStore for CommentDao {
    async fn create(
        &self,
        session_id: ObjectId,
        author_id: ObjectId,
        content: String,
    ) -> DaoResult<Comment> {
        CommentDao::create(self, session_id, author_id, content).await
    }

    async fn delete(&self, comment_id: ObjectId) -> DaoResult<bool> {
        CommentDao::delete(self, comment_id).await
    }
}
