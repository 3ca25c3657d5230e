use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use mongodb::Database;
use drinkup_db::models::Mention;

use super::base::{BaseDao, DaoResult};
use crate::store::MentionStore;

pub struct MentionDao {
    pub base: BaseDao<Mention>,
}

impl MentionDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Mention::COLLECTION),
        }
    }

    pub async fn create_many(&self, mut mentions: Vec<Mention>) -> DaoResult<Vec<Mention>> {
        let ids = self.base.insert_many(&mentions).await?;
        for (mention, id) in mentions.iter_mut().zip(ids) {
            mention.id = Some(id);
        }
        Ok(mentions)
    }

    /// Mentions of a comment in text order.
    pub async fn find_by_comment(&self, comment_id: ObjectId) -> DaoResult<Vec<Mention>> {
        self.base
            .find_many(
                doc! { "comment_id": comment_id },
                Some(doc! { "start_offset": 1 }),
            )
            .await
    }

    pub async fn delete_by_comment(&self, comment_id: ObjectId) -> DaoResult<u64> {
        self.base.hard_delete(doc! { "comment_id": comment_id }).await
    }
}

#[async_trait]
impl MentionStore for MentionDao {
    async fn create_many(&self, mentions: Vec<Mention>) -> DaoResult<Vec<Mention>> {
        MentionDao::create_many(self, mentions).await
    }

    async fn delete_by_comment(&self, comment_id: ObjectId) -> DaoResult<u64> {
        MentionDao::delete_by_comment(self, comment_id).await
    }
}
