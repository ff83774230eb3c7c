//! Client integration tests

mod composer_test;
mod http_service_test;
