//! Conversation store API client
//!
//! [`ConversationService`] is everything the Poller, Composer and session
//! need from the store. [`HttpConversationService`] implements it over
//! HTTP; tests substitute in-memory fakes.

use std::future::Future;

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Serialize;
use uuid::Uuid;

use super::config::Config;
use super::error::ClientError;
use crate::shared::messaging::{
    ChatMessage, ClearMessagesResponse, Conversation, ConversationStatus,
    CreateConversationRequest, CreateConversationResponse, ListConversationsResponse,
    ListMessagesResponse, SendMessageRequest, SendMessageResponse, UpdateStatusRequest,
};

/// The conversation store as seen by the client
pub trait ConversationService: Send + Sync + 'static {
    /// Active conversations visible to the caller, newest activity first
    fn list_conversations(&self) -> impl Future<Output = Result<Vec<Conversation>, ClientError>> + Send;

    /// Create-or-get the caller's conversation, optionally scoped to a listing
    fn open_conversation(
        &self,
        listing_id: Option<Uuid>,
    ) -> impl Future<Output = Result<Conversation, ClientError>> + Send;

    /// Full ordered message list
    fn list_messages(
        &self,
        conversation_id: Uuid,
    ) -> impl Future<Output = Result<Vec<ChatMessage>, ClientError>> + Send;

    /// Append a message; resolves to the stored record
    fn send_message(
        &self,
        conversation_id: Uuid,
        content: &str,
    ) -> impl Future<Output = Result<ChatMessage, ClientError>> + Send;

    /// Hard-delete a message (admin only)
    fn delete_message(&self, message_id: Uuid) -> impl Future<Output = Result<(), ClientError>> + Send;
}

/// HTTP implementation of [`ConversationService`]
#[derive(Debug, Clone)]
pub struct HttpConversationService {
    config: Config,
    client: Client,
}

impl HttpConversationService {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        let token = self.config.token().ok_or(ClientError::NotAuthenticated)?;
        Ok(self
            .client
            .request(method, self.config.api_url(path))
            .header("Authorization", format!("Bearer {}", token)))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ClientError> {
        let response = request.send().await?;
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        // Store errors are `{ "error": ..., "status": ... }`
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
            .unwrap_or_else(|| {
                if body.is_empty() {
                    status.to_string()
                } else {
                    body
                }
            });

        Err(ClientError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn send_json<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<Response, ClientError> {
        self.send(self.request(method, path)?.json(body)).await
    }

    /// Reset the caller's unread counter for a conversation
    pub async fn mark_read(&self, conversation_id: Uuid) -> Result<(), ClientError> {
        let path = format!("/api/conversations/{}/read", conversation_id);
        self.send(self.request(Method::PATCH, &path)?).await?;
        Ok(())
    }

    /// Delete every message in a conversation (admin only)
    pub async fn clear_messages(&self, conversation_id: Uuid) -> Result<u64, ClientError> {
        let path = format!("/api/conversations/{}/messages", conversation_id);
        let response = self.send(self.request(Method::DELETE, &path)?).await?;
        let body: ClearMessagesResponse = response.json().await?;
        Ok(body.deleted_count)
    }

    /// Archive or reactivate a conversation (admin only)
    pub async fn set_status(
        &self,
        conversation_id: Uuid,
        status: ConversationStatus,
    ) -> Result<Conversation, ClientError> {
        let path = format!("/api/conversations/{}/status", conversation_id);
        let response = self
            .send_json(Method::PATCH, &path, &UpdateStatusRequest { status })
            .await?;
        Ok(response.json().await?)
    }
}

impl ConversationService for HttpConversationService {
    async fn list_conversations(&self) -> Result<Vec<Conversation>, ClientError> {
        let response = self
            .send(self.request(Method::GET, "/api/conversations")?)
            .await?;
        let body: ListConversationsResponse = response.json().await?;
        Ok(body.conversations)
    }

    async fn open_conversation(&self, listing_id: Option<Uuid>) -> Result<Conversation, ClientError> {
        let response = self
            .send_json(
                Method::POST,
                "/api/conversations",
                &CreateConversationRequest { listing_id },
            )
            .await?;
        let body: CreateConversationResponse = response.json().await?;
        Ok(body.conversation)
    }

    async fn list_messages(&self, conversation_id: Uuid) -> Result<Vec<ChatMessage>, ClientError> {
        let path = format!("/api/conversations/{}/messages", conversation_id);
        let response = self.send(self.request(Method::GET, &path)?).await?;
        let body: ListMessagesResponse = response.json().await?;
        Ok(body.messages)
    }

    async fn send_message(&self, conversation_id: Uuid, content: &str) -> Result<ChatMessage, ClientError> {
        let path = format!("/api/conversations/{}/messages", conversation_id);
        let response = self
            .send_json(Method::POST, &path, &SendMessageRequest::new(content))
            .await?;
        let body: SendMessageResponse = response.json().await?;
        Ok(body.message)
    }

    async fn delete_message(&self, message_id: Uuid) -> Result<(), ClientError> {
        let path = format!("/api/messages/{}", message_id);
        self.send(self.request(Method::DELETE, &path)?).await?;
        Ok(())
    }
}
