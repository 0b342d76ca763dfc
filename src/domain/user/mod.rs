//! User bounded context
//!
//! The orchestrator only needs to resolve users by id; account management
//! lives elsewhere in the platform.

use crate::domain::shared::result::Result;
use crate::domain::shared::value_objects::UserId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub name: Option<String>,
}

impl User {
    pub fn new(username: String, name: Option<String>) -> Self {
        Self {
            id: UserId::new(),
            username,
            name,
        }
    }

    /// Display label: full name when set, username otherwise
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.username)
    }
}

/// Denormalized user miniature stored on call records and messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: UserId,
    pub username: String,
    pub name: Option<String>,
}

impl From<&User> for UserRef {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            name: user.name.clone(),
        }
    }
}

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>>;
}
