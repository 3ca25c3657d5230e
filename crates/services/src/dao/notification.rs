use async_trait::async_trait;
use bson::{doc, oid::ObjectId, DateTime};
use mongodb::Database;
use drinkup_db::models::Notification;

use super::base::{BaseDao, DaoResult, PaginatedResult, PaginationParams};
use crate::store::NotificationStore;

pub struct NotificationDao {
    pub base: BaseDao<Notification>,
}

impl NotificationDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Notification::COLLECTION),
        }
    }

    /// Returns the record as inserted; the id is known without a read-back.
    pub async fn create(&self, mut notification: Notification) -> DaoResult<Notification> {
        let id = self.base.insert_one(&notification).await?;
        notification.id = Some(id);
        Ok(notification)
    }

    pub async fn find_for_user(
        &self,
        user_id: ObjectId,
        params: &PaginationParams,
    ) -> DaoResult<PaginatedResult<Notification>> {
        self.base
            .find_paginated(
                doc! { "user_id": user_id },
                Some(doc! { "created_at": -1 }),
                params,
            )
            .await
    }

    pub async fn count_unread(&self, user_id: ObjectId) -> DaoResult<u64> {
        self.base
            .count(doc! { "user_id": user_id, "is_read": false })
            .await
    }

    /// Flips the read flag of one notification. Already-read notifications
    /// are left untouched and report `false`.
    pub async fn mark_read(&self, user_id: ObjectId, notification_id: ObjectId) -> DaoResult<bool> {
        self.base
            .update_one(
                doc! { "_id": notification_id, "user_id": user_id, "is_read": false },
                doc! { "$set": { "is_read": true, "read_at": DateTime::now() } },
            )
            .await
    }

    pub async fn mark_all_read(&self, user_id: ObjectId) -> DaoResult<u64> {
        self.base
            .update_many(
                doc! { "user_id": user_id, "is_read": false },
                doc! { "$set": { "is_read": true, "read_at": DateTime::now() } },
            )
            .await
    }
}

#[async_trait]
impl NotificationStore for NotificationDao {
    async fn create(&self, notification: Notification) -> DaoResult<Notification> {
        NotificationDao::create(self, notification).await
    }
}
