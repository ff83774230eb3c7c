//! Composer integration tests
//!
//! Tests for sending (draft handling, single in-flight send, out-of-band
//! confirmation poll) and admin deletes.

use std::sync::Arc;

use pretty_assertions::assert_eq;

use realty_chat::client::{ComposeError, Composer, NoticeLevel, Poller, ViewHandle};
use realty_chat::shared::messaging::Role;

use crate::common::{contents, FakeService};

struct Harness {
    service: Arc<FakeService>,
    view: ViewHandle,
    poller: Poller<FakeService>,
    composer: Composer<FakeService>,
}

fn harness(role: Role) -> Harness {
    let service = Arc::new(FakeService::new());
    let view = ViewHandle::new();
    let poller = Poller::new(Arc::clone(&service), view.clone());
    let composer = Composer::new(Arc::clone(&service), view.clone(), poller.clone(), role);
    Harness { service, view, poller, composer }
}

#[tokio::test]
async fn test_first_message_is_confirmed_by_poll() {
    let h = harness(Role::Client);
    let conversation = h.service.create_conversation();
    h.view.mount(conversation.id).await;
    h.view.set_draft("Hello").await;

    let sent = crate::assert_ok!(h.composer.submit_draft(conversation.id).await);

    assert_eq!(sent.content, "Hello");
    assert_eq!(contents(&h.view.messages().await), vec!["Hello"]);
    assert_eq!(contents(&h.service.server_messages(conversation.id)), vec!["Hello"]);
    // One out-of-band poll right after the send
    assert_eq!(h.service.list_calls(), 1);
    assert_eq!(h.view.last_message_count().await, 1);
    assert_eq!(h.view.draft().await, "");
    assert!(!h.composer.is_sending());
}

#[tokio::test]
async fn test_content_is_trimmed() {
    let h = harness(Role::Client);
    let conversation = h.service.create_conversation();
    h.view.mount(conversation.id).await;

    let sent = crate::assert_ok!(h.composer.send_message(conversation.id, "  Is it still available?  ").await);

    assert_eq!(sent.content, "Is it still available?");
}

#[tokio::test]
async fn test_blank_content_is_rejected_locally() {
    let h = harness(Role::Client);
    let conversation = h.service.create_conversation();
    h.view.mount(conversation.id).await;
    h.view.set_draft("   ").await;

    let result = h.composer.submit_draft(conversation.id).await;

    crate::assert_err!(result, ComposeError::Validation(_));
    assert_eq!(h.service.send_calls(), 0);
    assert_eq!(h.view.draft().await, "   ");
}

#[tokio::test]
async fn test_failed_send_restores_draft_and_notifies() {
    let h = harness(Role::Client);
    let conversation = h.service.create_conversation();
    h.view.mount(conversation.id).await;
    h.service.set_fail_send(true);
    h.view.set_draft("Can I visit on Saturday?").await;

    let result = h.composer.submit_draft(conversation.id).await;

    crate::assert_err!(result, ComposeError::Remote(_));
    assert_eq!(h.view.draft().await, "Can I visit on Saturday?");
    assert!(h.view.messages().await.is_empty());
    let notices = h.view.notices().await;
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert!(!h.composer.is_sending());
    // Never retried automatically
    assert_eq!(h.service.send_calls(), 1);
}

#[tokio::test]
async fn test_only_one_send_in_flight() {
    let h = harness(Role::Client);
    let conversation = h.service.create_conversation();
    h.view.mount(conversation.id).await;
    let gate = h.service.hold_sends();

    let first = tokio::spawn({
        let composer = h.composer.clone();
        async move { composer.send_message(conversation.id, "first").await }
    });
    while h.service.send_calls() == 0 {
        tokio::task::yield_now().await;
    }
    assert!(h.composer.is_sending());

    let second = h.composer.send_message(conversation.id, "second").await;
    crate::assert_err!(second, ComposeError::InFlight);

    gate.notify_one();
    let sent = first.await.expect("send task panicked");
    assert_eq!(crate::assert_ok!(sent).content, "first");

    assert_eq!(h.service.send_calls(), 1);
    assert_eq!(contents(&h.service.server_messages(conversation.id)), vec!["first"]);
    assert!(!h.composer.is_sending());
}

#[tokio::test]
async fn test_send_after_failure_is_allowed() {
    let h = harness(Role::Client);
    let conversation = h.service.create_conversation();
    h.view.mount(conversation.id).await;
    h.view.set_draft("retry me").await;

    h.service.set_fail_send(true);
    assert!(h.composer.submit_draft(conversation.id).await.is_err());
    assert_eq!(h.view.draft().await, "retry me");

    h.service.set_fail_send(false);
    crate::assert_ok!(h.composer.submit_draft(conversation.id).await);
    assert_eq!(contents(&h.view.messages().await), vec!["retry me"]);
    assert_eq!(h.view.draft().await, "");
}

#[tokio::test]
async fn test_failed_direct_send_leaves_draft_untouched() {
    let h = harness(Role::Client);
    let conversation = h.service.create_conversation();
    h.view.mount(conversation.id).await;
    h.view.set_draft("half-typed question about the lot").await;
    h.service.set_fail_send(true);

    let result = h.composer.send_message(conversation.id, "quick hello").await;

    crate::assert_err!(result, ComposeError::Remote(_));
    assert_eq!(h.view.draft().await, "half-typed question about the lot");
    assert_eq!(h.view.notices().await.len(), 1);
}

#[tokio::test]
async fn test_direct_send_keeps_draft() {
    let h = harness(Role::Client);
    let conversation = h.service.create_conversation();
    h.view.mount(conversation.id).await;
    h.view.set_draft("another draft").await;

    crate::assert_ok!(h.composer.send_message(conversation.id, "ok").await);

    assert_eq!(h.view.draft().await, "another draft");
    assert_eq!(contents(&h.view.messages().await), vec!["ok"]);
}

#[tokio::test]
async fn test_client_cannot_delete() {
    let h = harness(Role::Client);
    let conversation = h.service.create_conversation();
    let seeded = h.service.seed_messages(conversation.id, 1);

    let result = h.composer.delete_message(seeded[0].id).await;

    crate::assert_err!(result, ComposeError::NotPermitted);
    assert_eq!(h.service.delete_calls(), 0);
}

#[tokio::test]
async fn test_admin_delete_removes_message_and_refreshes_list() {
    let h = harness(Role::Admin);
    let conversation = h.service.create_conversation();
    let seeded = h.service.seed_messages(conversation.id, 5);
    h.view.mount(conversation.id).await;
    h.poller.poll_messages(conversation.id).await;
    h.poller.poll_conversations().await;
    assert_eq!(h.view.conversations().await[0].admin_unread_count, 5);

    let target = seeded[0].id;
    crate::assert_ok!(h.composer.delete_message(target).await);

    let messages = h.view.messages().await;
    assert_eq!(messages.len(), 4);
    assert!(messages.iter().all(|m| m.id != target));
    assert_eq!(h.service.conversation_calls(), 2);
    assert_eq!(h.view.conversations().await[0].admin_unread_count, 4);

    // A later poll agrees with the local list
    let polled = h.poller.poll_messages(conversation.id).await;
    assert!(!polled.replaced());
}

#[tokio::test]
async fn test_failed_delete_leaves_view_unchanged() {
    let h = harness(Role::Admin);
    let conversation = h.service.create_conversation();
    let seeded = h.service.seed_messages(conversation.id, 3);
    h.view.mount(conversation.id).await;
    h.poller.poll_messages(conversation.id).await;
    h.service.set_fail_delete(true);

    let result = h.composer.delete_message(seeded[1].id).await;

    crate::assert_err!(result, ComposeError::Remote(_));
    assert_eq!(contents(&h.view.messages().await), vec!["m1", "m2", "m3"]);
    assert_eq!(h.view.notices().await[0].level, NoticeLevel::Error);
    assert_eq!(h.service.conversation_calls(), 0);
}
