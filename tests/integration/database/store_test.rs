//! Conversation store behavior, checked against both backends

use pretty_assertions::assert_eq;
use serial_test::serial;
use uuid::Uuid;

use realty_chat::backend::messaging::StoreError;
use realty_chat::backend::ConversationStore;
use realty_chat::shared::messaging::{
    ClientSummary, ConversationStatus, ListingSummary, Role, SenderSnapshot,
};

use crate::common::{contents, TestDatabase};

fn client(name: &str) -> ClientSummary {
    ClientSummary {
        id: Uuid::new_v4(),
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
    }
}

fn as_sender(client: &ClientSummary) -> SenderSnapshot {
    SenderSnapshot { id: client.id, name: client.name.clone(), role: Role::Client }
}

fn admin() -> SenderSnapshot {
    SenderSnapshot { id: Uuid::new_v4(), name: "Agent".to_string(), role: Role::Admin }
}

async fn append(store: &ConversationStore, conversation_id: Uuid, sender: &SenderSnapshot, text: &str) {
    crate::assert_ok!(store.append_message(conversation_id, sender.clone(), text.to_string()).await);
}

async fn check_create_or_get(store: &ConversationStore) {
    let dana = client("Dana");
    let (first, existing) = crate::assert_ok!(store.open_conversation(dana.clone(), None).await);
    assert!(!existing);
    let (again, existing) = crate::assert_ok!(store.open_conversation(dana.clone(), None).await);
    assert!(existing);
    assert_eq!(again.id, first.id);

    let listing = ListingSummary {
        id: Uuid::new_v4(),
        title: "Lake house".to_string(),
        address: "1 Shore Rd".to_string(),
    };
    crate::assert_ok!(store.register_listing(listing.clone()).await);
    let (scoped, existing) = crate::assert_ok!(store.open_conversation(dana.clone(), Some(listing.id)).await);
    assert!(!existing);
    assert_ne!(scoped.id, first.id);
    assert_eq!(scoped.listing, Some(listing));

    let unknown = store.open_conversation(dana, Some(Uuid::new_v4())).await;
    crate::assert_err!(unknown, StoreError::NotFound("listing"));
}

async fn check_ordering_and_counters(store: &ConversationStore) {
    let dana = client("Dana");
    let (conv, _) = crate::assert_ok!(store.open_conversation(dana.clone(), None).await);
    for text in ["one", "two", "three"] {
        append(store, conv.id, &as_sender(&dana), text).await;
    }
    append(store, conv.id, &admin(), "reply").await;

    let messages = crate::assert_ok!(store.list_messages(conv.id).await);
    assert_eq!(contents(&messages), vec!["one", "two", "three", "reply"]);
    assert!(messages.windows(2).all(|w| w[0].created_at <= w[1].created_at));

    let conv = crate::assert_ok!(store.find_conversation(conv.id).await);
    assert_eq!(conv.admin_unread_count, 3);
    assert_eq!(conv.client_unread_count, 1);
    assert_eq!(conv.last_message_at, messages[3].created_at);
}

async fn check_read_marks_only_the_snapshot(store: &ConversationStore) {
    let dana = client("Dana");
    let (conv, _) = crate::assert_ok!(store.open_conversation(dana.clone(), None).await);
    append(store, conv.id, &as_sender(&dana), "hi").await;
    append(store, conv.id, &admin(), "hello").await;

    let snapshot = crate::assert_ok!(store.read_messages(conv.id, Role::Admin).await);
    assert_eq!(contents(&snapshot), vec!["hi", "hello"]);
    assert!(snapshot.iter().all(|m| !m.is_read));

    append(store, conv.id, &as_sender(&dana), "later").await;

    let messages = crate::assert_ok!(store.list_messages(conv.id).await);
    let read: Vec<bool> = messages.iter().map(|m| m.is_read).collect();
    assert_eq!(read, vec![true, false, false]);
    assert!(messages[0].read_at.is_some());

    let conv = crate::assert_ok!(store.find_conversation(conv.id).await);
    assert_eq!(conv.admin_unread_count, 1);
    assert_eq!(conv.client_unread_count, 1);
}

async fn check_delete_recounts(store: &ConversationStore) {
    let dana = client("Dana");
    let (conv, _) = crate::assert_ok!(store.open_conversation(dana.clone(), None).await);
    append(store, conv.id, &as_sender(&dana), "a").await;
    append(store, conv.id, &as_sender(&dana), "b").await;
    crate::assert_ok!(store.read_messages(conv.id, Role::Admin).await);
    append(store, conv.id, &as_sender(&dana), "c").await;

    let messages = crate::assert_ok!(store.list_messages(conv.id).await);
    let removed = crate::assert_ok!(store.delete_message(messages[2].id).await);
    assert_eq!(removed.content, "c");

    let conv = crate::assert_ok!(store.find_conversation(conv.id).await);
    assert_eq!(conv.admin_unread_count, 0);
    assert_eq!(conv.last_message_at, messages[1].created_at);

    let again = store.delete_message(messages[2].id).await;
    crate::assert_err!(again, StoreError::NotFound("message"));
}

async fn check_clear(store: &ConversationStore) {
    let dana = client("Dana");
    let (conv, _) = crate::assert_ok!(store.open_conversation(dana.clone(), None).await);
    append(store, conv.id, &as_sender(&dana), "a").await;
    append(store, conv.id, &admin(), "b").await;

    assert_eq!(crate::assert_ok!(store.clear_messages(conv.id).await), 2);

    let cleared = crate::assert_ok!(store.find_conversation(conv.id).await);
    assert_eq!(cleared.client_unread_count, 0);
    assert_eq!(cleared.admin_unread_count, 0);
    assert_eq!(cleared.last_message_at, cleared.created_at);
    assert!(crate::assert_ok!(store.list_messages(conv.id).await).is_empty());
}

async fn check_status(store: &ConversationStore) {
    let dana = client("Dana");
    let (conv, _) = crate::assert_ok!(store.open_conversation(dana.clone(), None).await);

    let archived = crate::assert_ok!(store.set_status(conv.id, ConversationStatus::Archived).await);
    assert_eq!(archived.status, ConversationStatus::Archived);
    assert!(crate::assert_ok!(store.list_conversations(dana.id, Role::Client).await).is_empty());
    // Still readable by id
    crate::assert_ok!(store.find_conversation(conv.id).await);

    crate::assert_ok!(store.set_status(conv.id, ConversationStatus::Active).await);
    let listed = crate::assert_ok!(store.list_conversations(dana.id, Role::Client).await);
    assert_eq!(listed.len(), 1);

    let missing = store.set_status(Uuid::new_v4(), ConversationStatus::Archived).await;
    crate::assert_err!(missing, StoreError::NotFound("conversation"));
}

async fn check_all(store: &ConversationStore) {
    check_create_or_get(store).await;
    check_ordering_and_counters(store).await;
    check_read_marks_only_the_snapshot(store).await;
    check_delete_recounts(store).await;
    check_clear(store).await;
    check_status(store).await;
}

#[tokio::test]
async fn test_memory_store() {
    check_all(&ConversationStore::in_memory()).await;
}

#[tokio::test]
#[serial]
async fn test_postgres_store() {
    let Some(db) = TestDatabase::connect().await else {
        eprintln!("DATABASE_URL not set, skipping");
        return;
    };
    check_all(&db.store()).await;
}

#[tokio::test]
#[serial]
async fn test_postgres_created_at_never_goes_backwards() {
    let Some(db) = TestDatabase::connect().await else {
        eprintln!("DATABASE_URL not set, skipping");
        return;
    };
    let store = db.store();
    let dana = client("Dana");
    let (conv, _) = crate::assert_ok!(store.open_conversation(dana.clone(), None).await);
    append(&store, conv.id, &as_sender(&dana), "first").await;

    // Simulate a clock that has since stepped back
    crate::assert_ok!(
        sqlx::query("UPDATE messages SET created_at = created_at + interval '1 minute' WHERE conversation_id = $1")
            .bind(conv.id)
            .execute(db.pool())
            .await
    );
    let future = crate::assert_ok!(store.list_messages(conv.id).await)[0].created_at;

    let next = crate::assert_ok!(store.append_message(conv.id, admin(), "second".to_string()).await);
    assert!(next.created_at >= future);

    let messages = crate::assert_ok!(store.list_messages(conv.id).await);
    assert_eq!(contents(&messages), vec!["first", "second"]);
    let conv = crate::assert_ok!(store.find_conversation(conv.id).await);
    assert_eq!(conv.last_message_at, next.created_at);
}
