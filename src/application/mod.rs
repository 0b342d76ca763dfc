//! Application layer - Use cases and application services
//!
//! This layer orchestrates domain objects to fulfill use cases.
//! It's responsible for:
//! - Coordinating stores and the provider registry
//! - Enforcing call lifecycle rules
//! - Shaping what leaves the server (filtered reads, pagination)

pub mod call_service;

pub use call_service::{CallService, CreateCall, Paginated};
