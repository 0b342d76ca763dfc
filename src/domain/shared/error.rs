//! Domain errors

use thiserror::Error;

/// Domain result type
pub type Result<T> = std::result::Result<T, DomainError>;

#[derive(Error, Debug, Clone)]
pub enum DomainError {
    #[error("Invalid room")]
    InvalidRoom,

    #[error("User not found")]
    UserNotFound,

    #[error("Call type and room are not compatible")]
    TypeRoomMismatch,

    #[error("Invalid call target")]
    InvalidCallTarget,

    #[error("No active call provider")]
    NoActiveProvider,

    #[error("Invalid call")]
    InvalidCall,

    #[error("Invalid call status")]
    InvalidCallStatus,

    #[error("Call provider unavailable")]
    ProviderUnavailable,

    #[error("Provider operation failed: {0}")]
    ProviderFailed(String),

    #[error("Storage error: {0}")]
    Storage(String),
}
