//! Infrastructure layer - Technical implementations
//!
//! This layer contains:
//! - Store implementations
//! - The configured provider registry

pub mod persistence;
pub mod provider;
