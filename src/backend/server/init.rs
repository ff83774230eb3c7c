/**
 * Server Initialization
 *
 * This module handles the initialization and setup of the Axum HTTP server,
 * including store selection, state creation, and route configuration.
 *
 * # Initialization Process
 *
 * 1. Select the store backend (PostgreSQL if configured, else in-memory)
 * 2. Derive the JWT keys from the configured secret
 * 3. Create and configure the router
 */

use axum::Router;

use crate::backend::auth::sessions::JwtKeys;
use crate::backend::routes::router::create_router;
use crate::backend::server::config::{load_store, ServerConfig};
use crate::backend::server::state::AppState;

/// Create and configure the Axum application
///
/// # Error Handling
///
/// The function is designed to be resilient:
/// - Missing database: conversations are kept in memory
/// - Migration failures: logged but don't prevent startup
pub async fn create_app(config: &ServerConfig) -> Router<()> {
    tracing::info!("Initializing conversation store server");

    let store = load_store(config).await;
    tracing::info!("Using {} conversation store", store.backend_name());

    let state = AppState::new(store, JwtKeys::from_secret(&config.jwt_secret));
    create_router(state)
}
