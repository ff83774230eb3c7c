/**
 * Authentication Extractor
 *
 * Extracts and verifies the bearer JWT from the Authorization header and
 * hands the caller's identity and role to handlers. Any handler that takes
 * an `AuthenticatedUser` argument is protected; a missing or invalid token
 * yields 401 before the handler body runs.
 */

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use uuid::Uuid;

use crate::backend::auth::sessions::{verify_token, JwtKeys};
use crate::backend::error::BackendError;
use crate::shared::messaging::{ClientSummary, Role, SenderSnapshot};

/// Authenticated caller extracted from the JWT
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
}

impl AuthenticatedUser {
    /// Snapshot stored on messages this caller sends
    pub fn sender(&self) -> SenderSnapshot {
        SenderSnapshot {
            id: self.user_id,
            name: self.name.clone(),
            role: self.role,
        }
    }

    /// Summary stored on conversations this caller opens
    pub fn client_summary(&self) -> ClientSummary {
        ClientSummary {
            id: self.user_id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }

    pub fn require_admin(&self) -> Result<(), BackendError> {
        if self.role.is_admin() {
            Ok(())
        } else {
            Err(BackendError::forbidden("Admin role required"))
        }
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    JwtKeys: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| {
                tracing::warn!("Missing Authorization header");
                BackendError::unauthorized("Unauthorized")
            })?;

        // Format: "Bearer <token>"
        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            tracing::warn!("Invalid Authorization header format");
            BackendError::unauthorized("Unauthorized")
        })?;

        let keys = JwtKeys::from_ref(state);
        let claims = verify_token(&keys, token).map_err(|e| {
            tracing::warn!("Invalid token: {:?}", e);
            BackendError::unauthorized("Unauthorized")
        })?;

        let user_id = Uuid::parse_str(&claims.sub).map_err(|e| {
            tracing::warn!("Invalid user ID in token: {:?}", e);
            BackendError::unauthorized("Unauthorized")
        })?;

        Ok(AuthenticatedUser {
            user_id,
            email: claims.email,
            name: claims.name,
            role: claims.role,
        })
    }
}
