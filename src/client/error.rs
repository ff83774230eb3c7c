//! Client error types
//!
//! `ClientError` covers talking to the conversation store. `ComposeError`
//! is what the Composer hands back for a send or delete that did not happen.

use thiserror::Error;

use crate::shared::error::SharedError;

/// Failures talking to the conversation store
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-success response from the store
    #[error("Request failed with {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Not authenticated")]
    NotAuthenticated,
}

impl ClientError {
    /// HTTP status when the store answered with an error
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            Self::NotAuthenticated => None,
        }
    }
}

/// Why a compose action did not go through
#[derive(Debug, Error)]
pub enum ComposeError {
    /// Rejected locally, nothing was sent
    #[error(transparent)]
    Validation(#[from] SharedError),

    /// Another send is still in flight
    #[error("A message is already being sent")]
    InFlight,

    #[error("Only admins can delete messages")]
    NotPermitted,

    /// The store rejected or never received the request
    #[error(transparent)]
    Remote(#[from] ClientError),
}
