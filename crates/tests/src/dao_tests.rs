//! These run against a live MongoDB (DRINKUP__DATABASE__URL, default
//! mongodb://localhost:27017): `cargo test -- --ignored`.

use bson::oid::ObjectId;
use drinkup_db::indexes::ensure_indexes;
use drinkup_db::models::notification_type;
use drinkup_services::dao::base::{DaoError, PaginationParams};

use crate::fixtures::test_app::TestApp;

#[tokio::test]
#[ignore = "requires MongoDB"]
async fn mark_read_never_flips_back() {
    let app = TestApp::spawn().await;
    ensure_indexes(&app.state.db).await.unwrap();
    let user_id = ObjectId::new();

    let created = app
        .state
        .notifications
        .create_and_send(user_id, notification_type::INVITE, "Join", "Saturday", None)
        .await
        .unwrap();
    let id = created.id.unwrap();
    let store = &app.state.notification_store;

    assert_eq!(store.count_unread(user_id).await.unwrap(), 1);
    assert!(store.mark_read(user_id, id).await.unwrap());
    assert!(!store.mark_read(user_id, id).await.unwrap());
    assert_eq!(store.count_unread(user_id).await.unwrap(), 0);

    let page = store
        .find_for_user(user_id, &PaginationParams::default())
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert!(page.items[0].is_read);
    assert!(page.items[0].read_at.is_some());

    app.state.db.drop().await.unwrap();
}

#[tokio::test]
#[ignore = "requires MongoDB"]
async fn mark_all_read_clears_only_unread() {
    let app = TestApp::spawn().await;
    ensure_indexes(&app.state.db).await.unwrap();
    let user_id = ObjectId::new();
    let other_id = ObjectId::new();
    let dispatcher = &app.state.notifications;

    let first = dispatcher
        .create_and_send(user_id, notification_type::INVITE, "Join", "Friday", None)
        .await
        .unwrap();
    for title in ["Unlocked", "Streak"] {
        dispatcher
            .create_and_send(user_id, notification_type::ACHIEVEMENT, title, "Nice", None)
            .await
            .unwrap();
    }
    dispatcher
        .create_and_send(other_id, notification_type::INVITE, "Join", "Friday", None)
        .await
        .unwrap();

    let store = &app.state.notification_store;
    assert!(store.mark_read(user_id, first.id.unwrap()).await.unwrap());
    assert_eq!(store.count_unread(user_id).await.unwrap(), 2);

    assert_eq!(store.mark_all_read(user_id).await.unwrap(), 2);
    assert_eq!(store.count_unread(user_id).await.unwrap(), 0);
    assert_eq!(store.mark_all_read(user_id).await.unwrap(), 0);
    assert_eq!(store.count_unread(other_id).await.unwrap(), 1);

    app.state.db.drop().await.unwrap();
}

#[tokio::test]
#[ignore = "requires MongoDB"]
async fn comment_pipeline_round_trips_through_mongo() {
    let app = TestApp::spawn().await;
    ensure_indexes(&app.state.db).await.unwrap();

    let alice = app
        .state
        .users
        .create("alice".to_string(), "Alice".to_string(), "alice@example.com".to_string())
        .await
        .unwrap();
    let duplicate = app
        .state
        .users
        .create("alice".to_string(), "Alice 2".to_string(), "other@example.com".to_string())
        .await;
    assert!(matches!(duplicate, Err(DaoError::DuplicateKey(_))));

    let created = app
        .state
        .comments
        .create(ObjectId::new(), ObjectId::new(), "@alice @nobody @alice".to_string())
        .await
        .unwrap();
    let comment_id = created.comment.id.unwrap();

    let stored = app.state.mention_store.find_by_comment(comment_id).await.unwrap();
    assert_eq!(stored.len(), 2);
    assert!(stored.iter().all(|m| Some(m.user_id) == alice.id));
    assert_eq!(stored[0].start_offset, 0);
    assert_eq!(stored[1].start_offset, 15);

    let alice_id = alice.id.unwrap();
    assert_eq!(app.state.notification_store.count_unread(alice_id).await.unwrap(), 1);

    assert!(app.state.comments.delete(comment_id).await.unwrap());
    assert!(app.state.mention_store.find_by_comment(comment_id).await.unwrap().is_empty());
    assert!(matches!(
        app.state.comment_store.find_by_id(comment_id).await,
        Err(DaoError::NotFound)
    ));

    app.state.db.drop().await.unwrap();
}
