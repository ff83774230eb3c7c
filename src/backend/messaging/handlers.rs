//! Messaging HTTP Handlers
//!
//! This module contains the HTTP handlers for conversations and messages.
//! Every handler takes an `AuthenticatedUser`, so requests without a valid
//! bearer token are rejected with 401 before reaching the store.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use super::store::ConversationStore;
use crate::backend::error::BackendError;
use crate::backend::middleware::AuthenticatedUser;
use crate::shared::messaging::{
    ClearMessagesResponse, Conversation, CreateConversationRequest, CreateConversationResponse,
    DeleteMessageResponse, ListConversationsResponse, ListMessagesResponse, SendMessageRequest,
    SendMessageResponse, UpdateStatusRequest,
};

/// Load a conversation and check the caller may use it
async fn accessible_conversation(
    store: &ConversationStore,
    user: &AuthenticatedUser,
    conversation_id: Uuid,
) -> Result<Conversation, BackendError> {
    let conversation = store.find_conversation(conversation_id).await?;
    if !conversation.is_accessible_by(user.user_id, user.role) {
        tracing::warn!(
            "User {} denied access to conversation {}",
            user.user_id,
            conversation_id
        );
        return Err(BackendError::forbidden("Access denied"));
    }
    Ok(conversation)
}

/// Get conversations for the current user
pub async fn get_conversations(
    State(store): State<ConversationStore>,
    user: AuthenticatedUser,
) -> Result<Json<ListConversationsResponse>, BackendError> {
    let conversations = store.list_conversations(user.user_id, user.role).await?;
    Ok(Json(ListConversationsResponse { conversations }))
}

/// Open the caller's conversation, creating it on first use
///
/// Responds 201 when the conversation is new and 200 when it already existed.
pub async fn open_conversation(
    State(store): State<ConversationStore>,
    user: AuthenticatedUser,
    Json(request): Json<CreateConversationRequest>,
) -> Result<(StatusCode, Json<CreateConversationResponse>), BackendError> {
    if user.role.is_admin() {
        return Err(BackendError::forbidden("Only clients can open conversations"));
    }

    let (conversation, existing) = store
        .open_conversation(user.client_summary(), request.listing_id)
        .await?;

    let status = if existing {
        StatusCode::OK
    } else {
        tracing::info!(
            "Opened conversation {} for client {} (listing: {:?})",
            conversation.id,
            user.user_id,
            request.listing_id
        );
        StatusCode::CREATED
    };

    Ok((status, Json(CreateConversationResponse { conversation, existing })))
}

/// Get messages in a conversation
///
/// The response is the list as it was before this read. The other role's
/// messages in that list are marked read; anything sent since stays unread.
pub async fn get_messages(
    State(store): State<ConversationStore>,
    user: AuthenticatedUser,
    Path(conversation_id): Path<Uuid>,
) -> Result<Json<ListMessagesResponse>, BackendError> {
    accessible_conversation(&store, &user, conversation_id).await?;

    let messages = store.read_messages(conversation_id, user.role).await?;

    Ok(Json(ListMessagesResponse { messages }))
}

/// Reset the caller's unread counter without fetching messages
pub async fn mark_conversation_read(
    State(store): State<ConversationStore>,
    user: AuthenticatedUser,
    Path(conversation_id): Path<Uuid>,
) -> Result<StatusCode, BackendError> {
    accessible_conversation(&store, &user, conversation_id).await?;
    store.mark_read(conversation_id, user.role).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Append a message to a conversation
pub async fn send_message(
    State(store): State<ConversationStore>,
    user: AuthenticatedUser,
    Path(conversation_id): Path<Uuid>,
    Json(request): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<SendMessageResponse>), BackendError> {
    let content = request.validated_content()?;
    accessible_conversation(&store, &user, conversation_id).await?;

    let message = store
        .append_message(conversation_id, user.sender(), content)
        .await?;

    tracing::debug!(
        "Message {} appended to conversation {} by {}",
        message.id,
        conversation_id,
        user.role
    );

    Ok((StatusCode::CREATED, Json(SendMessageResponse { message })))
}

/// Hard-delete a single message (admin only)
pub async fn delete_message(
    State(store): State<ConversationStore>,
    user: AuthenticatedUser,
    Path(message_id): Path<Uuid>,
) -> Result<Json<DeleteMessageResponse>, BackendError> {
    user.require_admin()?;

    let removed = store.delete_message(message_id).await?;
    tracing::info!(
        "Admin {} deleted message {} from conversation {}",
        user.user_id,
        removed.id,
        removed.conversation_id
    );

    Ok(Json(DeleteMessageResponse { success: true }))
}

/// Delete every message in a conversation (admin only)
pub async fn clear_messages(
    State(store): State<ConversationStore>,
    user: AuthenticatedUser,
    Path(conversation_id): Path<Uuid>,
) -> Result<Json<ClearMessagesResponse>, BackendError> {
    user.require_admin()?;

    let deleted_count = store.clear_messages(conversation_id).await?;
    tracing::info!(
        "Admin {} cleared {} messages from conversation {}",
        user.user_id,
        deleted_count,
        conversation_id
    );

    Ok(Json(ClearMessagesResponse { success: true, deleted_count }))
}

/// Archive or reactivate a conversation (admin only)
pub async fn update_status(
    State(store): State<ConversationStore>,
    user: AuthenticatedUser,
    Path(conversation_id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Conversation>, BackendError> {
    user.require_admin()?;

    let conversation = store.set_status(conversation_id, request.status).await?;
    tracing::info!(
        "Conversation {} is now {}",
        conversation_id,
        conversation.status.as_str()
    );

    Ok(Json(conversation))
}
