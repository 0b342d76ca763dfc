//! Confab - A call lifecycle server for team chat
//!
//! This is a Domain-Driven Design (DDD) implementation of call
//! orchestration for chat rooms: direct calls, group conferences and
//! livechat calls, backed by pluggable conferencing providers.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interface;

// Re-export commonly used types
pub use domain::shared::error::DomainError;
pub use domain::shared::result::Result;
