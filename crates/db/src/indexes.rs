use mongodb::{Database, IndexModel, options::IndexOptions};
use tracing::info;

use crate::models::{Comment, Mention, Notification, User};

pub async fn ensure_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    // Users
    create_indexes(
        db,
        User::COLLECTION,
        vec![
            index_unique(bson::doc! { "username": 1 }),
            index_unique(bson::doc! { "email": 1 }),
        ],
    )
    .await?;

    // Comments
    create_indexes(
        db,
        Comment::COLLECTION,
        vec![
            index(bson::doc! { "session_id": 1, "created_at": -1 }),
            index(bson::doc! { "author_id": 1, "created_at": -1 }),
        ],
    )
    .await?;

    // Mentions
    create_indexes(
        db,
        Mention::COLLECTION,
        vec![
            index(bson::doc! { "comment_id": 1, "start_offset": 1 }),
            index(bson::doc! { "user_id": 1, "created_at": -1 }),
        ],
    )
    .await?;

    // Notifications
    create_indexes(
        db,
        Notification::COLLECTION,
        vec![index(
            bson::doc! { "user_id": 1, "is_read": 1, "created_at": -1 },
        )],
    )
    .await?;

    info!("All indexes ensured");
    Ok(())
}

fn index(keys: bson::Document) -> IndexModel {
    IndexModel::builder().keys(keys).build()
}

fn index_unique(keys: bson::Document) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().unique(true).build())
        .build()
}

async fn create_indexes(
    db: &Database,
    collection: &str,
    indexes: Vec<IndexModel>,
) -> Result<(), mongodb::error::Error> {
    db.collection::<bson::Document>(collection)
        .create_indexes(indexes)
        .await?;
    info!(collection, "Indexes created");
    Ok(())
}
