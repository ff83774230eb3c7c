//! Authentication Module
//!
//! Identity for the conversation store comes from HS256 JWTs. Token issuance
//! belongs to the portal's login flow; this module only defines the claims,
//! verifies tokens, and offers `create_token` for tooling and tests.

pub mod sessions;

pub use sessions::{create_token, verify_token, Claims, JwtKeys};
