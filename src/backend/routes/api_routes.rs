/**
 * API Route Configuration
 *
 * # Routes
 *
 * ## Conversations
 * - `GET /api/conversations` - Conversations visible to the caller
 * - `POST /api/conversations` - Open (create or get) the caller's conversation
 * - `PATCH /api/conversations/{conversation_id}/read` - Reset the caller's unread counter
 * - `PATCH /api/conversations/{conversation_id}/status` - Archive or reactivate (admin)
 *
 * ## Messages
 * - `GET /api/conversations/{conversation_id}/messages` - Ordered message list
 * - `POST /api/conversations/{conversation_id}/messages` - Append a message
 * - `DELETE /api/conversations/{conversation_id}/messages` - Clear the conversation (admin)
 * - `DELETE /api/messages/{message_id}` - Delete one message (admin)
 *
 * Every route requires a JWT in the `Authorization` header.
 */

use axum::{
    routing::{delete, get, patch},
    Router,
};

use crate::backend::messaging::handlers::{
    clear_messages, delete_message, get_conversations, get_messages, mark_conversation_read,
    open_conversation, send_message, update_status,
};
use crate::backend::server::state::AppState;

/// Configure API routes
pub fn configure_api_routes(router: Router<AppState>) -> Router<AppState> {
    router
        // Conversations endpoints
        .route(
            "/api/conversations",
            get(get_conversations).post(open_conversation),
        )
        .route(
            "/api/conversations/{conversation_id}/read",
            patch(mark_conversation_read),
        )
        .route(
            "/api/conversations/{conversation_id}/status",
            patch(update_status),
        )
        // Messages endpoints
        .route(
            "/api/conversations/{conversation_id}/messages",
            get(get_messages).post(send_message).delete(clear_messages),
        )
        .route("/api/messages/{message_id}", delete(delete_message))
}
