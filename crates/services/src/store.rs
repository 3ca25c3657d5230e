//! Collaborator contracts the mention and notification pipeline relies on.
//!
//! The MongoDB DAOs implement these; tests swap in in-memory versions.

use async_trait::async_trait;
use bson::oid::ObjectId;
use drinkup_db::models::{Comment, Mention, Notification, User};

use crate::dao::base::DaoResult;

/// Exact-match username lookup. Collation is whatever the backing store uses.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_username(&self, username: &str) -> DaoResult<Option<User>>;
}

#[async_trait]
pub trait MentionStore: Send + Sync {
    /// Persists the whole batch or fails; returns the committed records.
    async fn create_many(&self, mentions: Vec<Mention>) -> DaoResult<Vec<Mention>>;
    async fn delete_by_comment(&self, comment_id: ObjectId) -> DaoResult<u64>;
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn create(&self, notification: Notification) -> DaoResult<Notification>;
}

#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn create(
        &self,
        session_id: ObjectId,
        author_id: ObjectId,
        content: String,
    ) -> DaoResult<Comment>;
    async fn delete(&self, comment_id: ObjectId) -> DaoResult<bool>;
}
