//! Chat flow end-to-end tests

use std::net::SocketAddr;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use tokio::net::TcpListener;

use realty_chat::backend::routes::create_router;
use realty_chat::backend::AppState;
use realty_chat::client::{ChatSession, Config, ConversationService, HttpConversationService};
use realty_chat::shared::config::AppConfig;

use crate::common::{admin_user, client_user, contents, TestUser, TEST_SECRET};

async fn spawn_store() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let app = create_router(AppState::in_memory(TEST_SECRET));
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server error");
    });
    addr
}

fn config(addr: SocketAddr, user: &TestUser) -> Config {
    Config::with_builder(
        AppConfig::builder()
            .server_url(format!("http://{}", addr))
            .token(Some(user.token.clone()))
            .role(user.role),
    )
    .expect("valid config")
}

fn session(addr: SocketAddr, user: &TestUser) -> (Arc<HttpConversationService>, ChatSession<HttpConversationService>) {
    let config = config(addr, user);
    let service = Arc::new(HttpConversationService::new(config.clone()));
    (Arc::clone(&service), ChatSession::new(service, &config))
}

#[tokio::test]
async fn test_client_first_message_round_trip() {
    let addr = spawn_store().await;
    let client = client_user();
    let (service, mut session) = session(addr, &client);

    let conversation_id = crate::assert_ok!(session.open_direct().await);
    // Let the initial load settle first
    while session.view().snapshot().await.last_synced_at.is_none() {
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    session.view().set_draft("Hello").await;
    crate::assert_ok!(session.composer().submit_draft(conversation_id).await);

    assert_eq!(contents(&session.view().messages().await), vec!["Hello"]);
    let stored = crate::assert_ok!(service.list_messages(conversation_id).await);
    assert_eq!(contents(&stored), vec!["Hello"]);
    assert_eq!(session.view().draft().await, "");

    session.unmount().await;
    assert_eq!(session.timers().live(), 0);
}

#[tokio::test]
async fn test_admin_delete_is_reflected_everywhere() {
    let addr = spawn_store().await;
    let client = client_user();
    let admin = admin_user();
    let (client_service, _) = session(addr, &client);
    let (_, admin_session) = session(addr, &admin);

    let conversation = crate::assert_ok!(client_service.open_conversation(None).await);
    for i in 1..=5 {
        crate::assert_ok!(client_service.send_message(conversation.id, &format!("m{}", i)).await);
    }

    admin_session.poller().poll_conversations().await;
    assert_eq!(admin_session.view().conversations().await[0].admin_unread_count, 5);

    let target = crate::assert_ok!(client_service.list_messages(conversation.id).await)[0].id;
    crate::assert_ok!(admin_session.composer().delete_message(target).await);

    let listed = admin_session.view().conversations().await;
    assert_eq!(listed[0].id, conversation.id);
    assert_eq!(listed[0].admin_unread_count, 4);

    let polled = admin_session.poller().poll_messages(conversation.id).await;
    assert_eq!(polled.len(), Some(4));
    let remaining = crate::assert_ok!(client_service.list_messages(conversation.id).await);
    assert!(remaining.iter().all(|m| m.id != target));
}

#[tokio::test]
async fn test_client_cannot_delete_through_the_store() {
    let addr = spawn_store().await;
    let client = client_user();
    let (service, _) = session(addr, &client);

    let conversation = crate::assert_ok!(service.open_conversation(None).await);
    let message = crate::assert_ok!(service.send_message(conversation.id, "Keep me").await);

    let err = service.delete_message(message.id).await.unwrap_err();
    assert_eq!(err.status(), Some(403));
}
