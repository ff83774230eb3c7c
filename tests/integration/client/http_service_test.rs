//! HTTP conversation service tests
//!
//! Runs `HttpConversationService` against a wiremock server to pin down
//! paths, headers, bodies and error mapping.

use pretty_assertions::assert_eq;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use realty_chat::client::{ClientError, Config, ConversationService, HttpConversationService};
use realty_chat::shared::config::AppConfig;
use realty_chat::shared::messaging::{
    ChatMessage, ClientSummary, Conversation, ConversationStatus, Role, SenderSnapshot,
};

const TOKEN: &str = "test-token";

fn service(server: &MockServer, token: Option<&str>) -> HttpConversationService {
    let config = Config::with_builder(
        AppConfig::builder()
            .server_url(server.uri())
            .token(token.map(str::to_string)),
    )
    .expect("valid config");
    HttpConversationService::new(config)
}

fn conversation() -> Conversation {
    Conversation::new(
        ClientSummary {
            id: Uuid::new_v4(),
            name: "Dana".to_string(),
            email: "dana@example.com".to_string(),
        },
        None,
    )
}

fn message(conversation_id: Uuid, content: &str) -> ChatMessage {
    let sender = SenderSnapshot { id: Uuid::new_v4(), name: "Dana".to_string(), role: Role::Client };
    ChatMessage::new_text(conversation_id, sender, content.to_string())
}

#[tokio::test]
async fn test_list_messages_sends_bearer_token() {
    let server = MockServer::start().await;
    let conversation_id = Uuid::new_v4();
    let messages = vec![message(conversation_id, "Hello"), message(conversation_id, "Hi!")];

    Mock::given(method("GET"))
        .and(path(format!("/api/conversations/{}/messages", conversation_id)))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "messages": messages })))
        .expect(1)
        .mount(&server)
        .await;

    let fetched = crate::assert_ok!(service(&server, Some(TOKEN)).list_messages(conversation_id).await);

    assert_eq!(fetched, messages);
}

#[tokio::test]
async fn test_send_message_posts_content() {
    let server = MockServer::start().await;
    let conversation_id = Uuid::new_v4();
    let stored = message(conversation_id, "Is parking included?");

    Mock::given(method("POST"))
        .and(path(format!("/api/conversations/{}/messages", conversation_id)))
        .and(body_json(json!({ "content": "Is parking included?" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "message": stored })))
        .expect(1)
        .mount(&server)
        .await;

    let sent = crate::assert_ok!(
        service(&server, Some(TOKEN))
            .send_message(conversation_id, "Is parking included?")
            .await
    );

    assert_eq!(sent, stored);
}

#[tokio::test]
async fn test_open_conversation_for_listing() {
    let server = MockServer::start().await;
    let listing_id = Uuid::new_v4();
    let opened = conversation();

    Mock::given(method("POST"))
        .and(path("/api/conversations"))
        .and(body_json(json!({ "listing_id": listing_id })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({ "conversation": opened, "existing": false })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let result = crate::assert_ok!(service(&server, Some(TOKEN)).open_conversation(Some(listing_id)).await);

    assert_eq!(result.id, opened.id);
}

#[tokio::test]
async fn test_list_conversations() {
    let server = MockServer::start().await;
    let conversations = vec![conversation(), conversation()];

    Mock::given(method("GET"))
        .and(path("/api/conversations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "conversations": conversations })))
        .mount(&server)
        .await;

    let fetched = crate::assert_ok!(service(&server, Some(TOKEN)).list_conversations().await);

    assert_eq!(fetched, conversations);
}

#[tokio::test]
async fn test_delete_message_path() {
    let server = MockServer::start().await;
    let message_id = Uuid::new_v4();

    Mock::given(method("DELETE"))
        .and(path(format!("/api/messages/{}", message_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    crate::assert_ok!(service(&server, Some(TOKEN)).delete_message(message_id).await);
}

#[tokio::test]
async fn test_error_body_is_mapped_to_status() {
    let server = MockServer::start().await;
    let conversation_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({ "error": "Access denied", "status": 403 })),
        )
        .mount(&server)
        .await;

    let err = service(&server, Some(TOKEN))
        .list_messages(conversation_id)
        .await
        .unwrap_err();

    match err {
        ClientError::Status { status, message } => {
            assert_eq!(status, 403);
            assert_eq!(message, "Access denied");
        }
        other => panic!("Expected Status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_plain_text_error_body_is_kept() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let err = service(&server, Some(TOKEN)).list_conversations().await.unwrap_err();

    assert_eq!(err.status(), Some(502));
    assert!(err.to_string().contains("bad gateway"));
}

#[tokio::test]
async fn test_missing_token_fails_before_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = service(&server, None).list_conversations().await.unwrap_err();

    assert!(matches!(err, ClientError::NotAuthenticated));
}

#[tokio::test]
async fn test_admin_extras() {
    let server = MockServer::start().await;
    let archived = Conversation { status: ConversationStatus::Archived, ..conversation() };

    Mock::given(method("DELETE"))
        .and(path(format!("/api/conversations/{}/messages", archived.id)))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "success": true, "deleted_count": 7 })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(format!("/api/conversations/{}/status", archived.id)))
        .and(body_json(json!({ "status": "archived" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&archived))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(format!("/api/conversations/{}/read", archived.id)))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let http = service(&server, Some(TOKEN));
    assert_eq!(crate::assert_ok!(http.clear_messages(archived.id).await), 7);
    let updated = crate::assert_ok!(http.set_status(archived.id, ConversationStatus::Archived).await);
    assert_eq!(updated.status, ConversationStatus::Archived);
    crate::assert_ok!(http.mark_read(archived.id).await);
}
