/**
 * Application State Management
 *
 * This module defines the application state structure and implements
 * the necessary `FromRef` traits for Axum state extraction.
 *
 * # Architecture
 *
 * `AppState` holds:
 * - The conversation store (in-memory or PostgreSQL)
 * - The JWT keys used to authenticate callers
 *
 * Both are cheap to clone; the store shares its backend behind an `Arc`
 * or a connection pool.
 *
 * # State Extraction
 *
 * The `FromRef` implementations let handlers take `State<ConversationStore>`
 * and let the `AuthenticatedUser` extractor reach `JwtKeys` without
 * knowing about `AppState`.
 */

use axum::extract::FromRef;

use crate::backend::auth::sessions::JwtKeys;
use crate::backend::messaging::store::ConversationStore;

/// Application state shared by all handlers
#[derive(Clone, Debug)]
pub struct AppState {
    pub store: ConversationStore,
    pub jwt: JwtKeys,
}

impl AppState {
    pub fn new(store: ConversationStore, jwt: JwtKeys) -> Self {
        Self { store, jwt }
    }

    /// State backed by a fresh in-memory store
    pub fn in_memory(jwt_secret: &str) -> Self {
        Self::new(ConversationStore::in_memory(), JwtKeys::from_secret(jwt_secret))
    }
}

impl FromRef<AppState> for ConversationStore {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.jwt.clone()
    }
}
