use async_trait::async_trait;
use bson::{doc, DateTime};
use mongodb::Database;
use drinkup_db::models::User;

use super::base::{BaseDao, DaoError, DaoResult};
use crate::store::UserDirectory;

pub struct UserDao {
    pub base: BaseDao<User>,
}

impl UserDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, User::COLLECTION),
        }
    }

    pub async fn create(
        &self,
        username: String,
        display_name: String,
        email: String,
    ) -> DaoResult<User> {
        if username.is_empty() {
            return Err(DaoError::Validation("username must not be empty".to_string()));
        }

        let now = DateTime::now();
        let user = User {
            id: None,
            username,
            display_name,
            email,
            avatar: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        let id = self.base.insert_one(&user).await?;
        self.base.find_by_id(id).await
    }

    pub async fn find_by_username(&self, username: &str) -> DaoResult<Option<User>> {
        self.base
            .find_one(doc! { "username": username, "deleted_at": null })
            .await
    }
}

#[async_trait]
impl UserDirectory for UserDao {
    async fn find_by_username(&self, username: &str) -> DaoResult<Option<User>> {
        UserDao::find_by_username(self, username).await
    }
}
