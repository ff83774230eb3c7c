//! API integration tests
//!
//! Integration tests for all conversation store endpoints
