use std::sync::Arc;
use std::sync::atomic::Ordering;

use bson::oid::ObjectId;
use drinkup_services::MentionService;

use crate::fixtures::memory::{MemoryMentions, MemoryUsers};

fn service() -> (Arc<MemoryUsers>, Arc<MemoryMentions>, MentionService) {
    let users = Arc::new(MemoryUsers::new());
    let mentions = Arc::new(MemoryMentions::new());
    let service = MentionService::new(users.clone(), mentions.clone());
    (users, mentions, service)
}

#[tokio::test]
async fn persists_only_resolvable_mentions() {
    let (users, store, service) = service();
    let alice = users.add("alice");
    let comment_id = ObjectId::new();

    let persisted = service
        .resolve_and_persist(comment_id, "@alice @ghost", ObjectId::new())
        .await
        .unwrap();

    assert_eq!(persisted.len(), 1);
    let mention = &persisted[0];
    assert_eq!(mention.user_id, alice);
    assert_eq!(mention.comment_id, comment_id);
    assert_eq!((mention.start_offset, mention.length), (0, 6));
    assert!(mention.id.is_some());
    assert_eq!(store.all(), persisted);
}

#[tokio::test]
async fn duplicate_mentions_are_each_recorded() {
    let (users, _, service) = service();
    let bob = users.add("bob");

    let persisted = service
        .resolve_and_persist(ObjectId::new(), "@bob round two, @bob?", ObjectId::new())
        .await
        .unwrap();

    let offsets: Vec<(u32, u32)> = persisted.iter().map(|m| (m.start_offset, m.length)).collect();
    assert_eq!(offsets, vec![(0, 4), (16, 4)]);
    assert!(persisted.iter().all(|m| m.user_id == bob));
}

#[tokio::test]
async fn failed_lookup_drops_only_that_token() {
    let (users, store, service) = service();
    users.add("alice");
    let carol = users.add("carol");
    users.break_lookup("alice");

    let persisted = service
        .resolve_and_persist(ObjectId::new(), "@alice and @carol", ObjectId::new())
        .await
        .unwrap();

    assert_eq!(persisted.len(), 1);
    assert_eq!(persisted[0].user_id, carol);
    assert_eq!(store.batches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn nothing_to_persist_skips_the_store() {
    let (_, store, service) = service();

    let none = service
        .resolve_and_persist(ObjectId::new(), "no mentions here", ObjectId::new())
        .await
        .unwrap();
    let unresolved = service
        .resolve_and_persist(ObjectId::new(), "@nobody @nothing", ObjectId::new())
        .await
        .unwrap();

    assert!(none.is_empty());
    assert!(unresolved.is_empty());
    assert_eq!(store.batches.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn batch_failure_aborts_the_call() {
    let (users, store, service) = service();
    users.add("alice");
    store.fail.store(true, Ordering::SeqCst);

    let result = service
        .resolve_and_persist(ObjectId::new(), "hey @alice", ObjectId::new())
        .await;

    assert!(result.is_err());
    assert!(store.all().is_empty());
}

#[tokio::test]
async fn offsets_stay_inside_the_content() {
    let (users, _, service) = service();
    users.add("zoë");
    users.add("max_1");
    let content = "🍺 prost @zoë, @max_1";

    let persisted = service
        .resolve_and_persist(ObjectId::new(), content, ObjectId::new())
        .await
        .unwrap();

    assert_eq!(persisted.len(), 2);
    let chars: Vec<char> = content.chars().collect();
    for mention in &persisted {
        assert!(mention.length > 0);
        assert!(mention.end_offset() as usize <= chars.len());
        assert_eq!(chars[mention.start_offset as usize], '@');
    }
}
