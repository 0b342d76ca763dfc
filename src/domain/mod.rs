//! Domain layer - Core business logic and rules
//!
//! This layer contains:
//! - Entities: Objects with identity
//! - Value Objects: Immutable objects without identity
//! - Repository Interfaces: Ports for persistence
//! - The call state machine and message block model

pub mod call;
pub mod message;
pub mod provider;
pub mod room;
pub mod shared;
pub mod user;

// Re-export commonly used types
pub use shared::{DomainError, Result};
