//! Room bounded context
//!
//! Rooms are owned by the wider chat platform; the orchestrator reads them
//! to validate call targets and to classify which kind of call a room gets.

use crate::domain::call::CallType;
use crate::domain::shared::result::Result;
use crate::domain::shared::value_objects::{RoomId, UserId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Room variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RoomKind {
    /// One-to-one (or self) conversation; carries its member ids
    Direct { member_ids: Vec<UserId> },
    /// Public channel
    Channel,
    /// Private group
    Private,
    /// Livechat conversation between a visitor and agents
    Livechat,
}

/// Room entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub kind: RoomKind,
    pub name: Option<String>,
    /// Human-facing name, preferred over `name` when present
    pub display_name: Option<String>,
}

impl Room {
    pub fn direct(member_ids: Vec<UserId>) -> Self {
        Self {
            id: RoomId::new(),
            kind: RoomKind::Direct { member_ids },
            name: None,
            display_name: None,
        }
    }

    pub fn channel(name: String) -> Self {
        Self {
            id: RoomId::new(),
            kind: RoomKind::Channel,
            name: Some(name),
            display_name: None,
        }
    }

    pub fn private(name: String) -> Self {
        Self {
            id: RoomId::new(),
            kind: RoomKind::Private,
            name: Some(name),
            display_name: None,
        }
    }

    pub fn livechat() -> Self {
        Self {
            id: RoomId::new(),
            kind: RoomKind::Livechat,
            name: None,
            display_name: None,
        }
    }

    pub fn with_display_name(mut self, display_name: String) -> Self {
        self.display_name = Some(display_name);
        self
    }

    pub fn member_ids(&self) -> Option<&[UserId]> {
        match &self.kind {
            RoomKind::Direct { member_ids } => Some(member_ids),
            _ => None,
        }
    }
}

/// Room repository trait
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Find room by ID
    async fn find_by_id(&self, id: &RoomId) -> Result<Option<Room>>;
}

/// Decides which kind of call a room gets
pub trait CallTypeClassifier: Send + Sync {
    fn classify(&self, room: &Room) -> CallType;
}

/// Standard classification rules
///
/// Livechat rooms get livechat calls. Direct rooms with at most two members
/// get direct calls. Everything else, including a direct room that grew past
/// two members, gets a group call.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardCallTypeClassifier;

impl CallTypeClassifier for StandardCallTypeClassifier {
    fn classify(&self, room: &Room) -> CallType {
        match &room.kind {
            RoomKind::Livechat => CallType::Livechat,
            RoomKind::Direct { member_ids } if member_ids.len() <= 2 => CallType::Direct,
            _ => CallType::Group,
        }
    }
}
