/**
 * Server Configuration
 *
 * This module handles loading of server configuration from the
 * environment, focusing on the optional PostgreSQL database connection.
 *
 * # Configuration Sources
 *
 * - `SERVER_PORT` - listen port (default 3000)
 * - `DATABASE_URL` - PostgreSQL URL; unset means the in-memory store
 * - `JWT_SECRET` - HS256 secret shared with the portal's login flow
 *
 * # Error Handling
 *
 * Database errors are logged but do not prevent server startup. If the
 * database cannot be reached, or its schema cannot be brought up to date,
 * the server falls back to the in-memory store.
 */

use sqlx::migrate::MigrateError;
use sqlx::PgPool;

use crate::backend::messaging::store::ConversationStore;

const DEFAULT_PORT: u16 = 3000;
const DEV_JWT_SECRET: &str = "realty-chat-dev-secret";

/// Server settings read from the environment
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub database_url: Option<String>,
    pub jwt_secret: String,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let port = std::env::var("SERVER_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let jwt_secret = match std::env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ => {
                tracing::warn!("JWT_SECRET not set. Using the development secret.");
                DEV_JWT_SECRET.to_string()
            }
        };

        Self {
            port,
            database_url,
            jwt_secret,
        }
    }
}

/// Connect to PostgreSQL and run migrations
///
/// Returns `None` if the pool cannot be created or the migrations fail.
pub async fn load_database(database_url: &str) -> Option<PgPool> {
    tracing::info!("Connecting to database...");

    let pool = match PgPool::connect(database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to create database connection pool: {:?}", e);
            return None;
        }
    };

    tracing::info!("Running database migrations...");
    let outcome = sqlx::migrate!().run(&pool).await;
    migrated_pool(pool, outcome).await
}

/// Keep the pool only if its schema is current
async fn migrated_pool(pool: PgPool, outcome: Result<(), MigrateError>) -> Option<PgPool> {
    match outcome {
        Ok(()) => {
            tracing::info!("Database migrations completed successfully");
            Some(pool)
        }
        Err(e) => {
            tracing::error!("Failed to run database migrations: {}", e);
            pool.close().await;
            None
        }
    }
}

/// Pick the store backend for this configuration
pub async fn load_store(config: &ServerConfig) -> ConversationStore {
    let Some(url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set. Conversations are kept in memory.");
        return ConversationStore::in_memory();
    };

    match load_database(url).await {
        Some(pool) => ConversationStore::postgres(pool),
        None => {
            tracing::warn!("Database unavailable. Falling back to the in-memory store.");
            ConversationStore::in_memory()
        }
    }
}
