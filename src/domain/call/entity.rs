//! Call record entity

use crate::domain::call::value_object::{CallStatus, CallType};
use crate::domain::shared::error::DomainError;
use crate::domain::shared::result::Result;
use crate::domain::shared::value_objects::{CallId, MessageId, RoomId, UserId};
use crate::domain::user::UserRef;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Call variant
///
/// Only group calls carry a title; it is resolved once at creation time
/// (explicit title, then room display name, then room name).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CallKind {
    Direct,
    #[serde(rename = "videoconference")]
    Group { title: String },
    Livechat,
}

impl CallKind {
    pub fn call_type(&self) -> CallType {
        match self {
            CallKind::Direct => CallType::Direct,
            CallKind::Group { .. } => CallType::Group,
            CallKind::Livechat => CallType::Livechat,
        }
    }
}

/// A user on a call and when they joined
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallParticipant {
    pub user: UserRef,
    pub joined_at: DateTime<Utc>,
}

impl CallParticipant {
    pub fn new(user: UserRef) -> Self {
        Self {
            user,
            joined_at: Utc::now(),
        }
    }

    pub fn with_joined_at(user: UserRef, joined_at: DateTime<Utc>) -> Self {
        Self { user, joined_at }
    }
}

/// Chat messages attached to a call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallMessages {
    pub started: Option<MessageId>,
    pub ended: Option<MessageId>,
}

/// Persisted state of one call instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallRecord {
    pub id: CallId,
    pub kind: CallKind,
    pub room_id: RoomId,
    pub created_by: UserRef,
    pub status: CallStatus,
    /// Joinable URL, generated at most once and cached here
    pub url: Option<String>,
    pub participants: Vec<CallParticipant>,
    pub messages: CallMessages,
    pub ended_by: Option<UserRef>,
    pub ended_at: Option<DateTime<Utc>>,
    pub provider_name: String,
    /// Opaque provider state, stripped from filtered reads
    pub provider_data: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl CallRecord {
    fn new(kind: CallKind, room_id: RoomId, created_by: UserRef, provider_name: String) -> Self {
        let status = match kind {
            CallKind::Direct => CallStatus::Calling,
            CallKind::Group { .. } | CallKind::Livechat => CallStatus::Started,
        };

        Self {
            id: CallId::new(),
            kind,
            room_id,
            created_by,
            status,
            url: None,
            participants: Vec::new(),
            messages: CallMessages::default(),
            ended_by: None,
            ended_at: None,
            provider_name,
            provider_data: None,
            created_at: Utc::now(),
        }
    }

    /// Create a direct call record (starts out ringing)
    pub fn direct(room_id: RoomId, created_by: UserRef, provider_name: String) -> Self {
        Self::new(CallKind::Direct, room_id, created_by, provider_name)
    }

    /// Create a group call record (starts out live)
    pub fn group(
        room_id: RoomId,
        created_by: UserRef,
        provider_name: String,
        title: String,
    ) -> Self {
        Self::new(CallKind::Group { title }, room_id, created_by, provider_name)
    }

    /// Create a livechat call record (starts out live)
    pub fn livechat(room_id: RoomId, created_by: UserRef, provider_name: String) -> Self {
        Self::new(CallKind::Livechat, room_id, created_by, provider_name)
    }

    pub fn call_type(&self) -> CallType {
        self.kind.call_type()
    }

    pub fn title(&self) -> Option<&str> {
        match &self.kind {
            CallKind::Group { title } => Some(title),
            _ => None,
        }
    }

    /// Transition to a new status
    pub fn transition_to(&mut self, new_status: CallStatus) -> Result<()> {
        if !self.status.can_transition_to(&new_status) {
            return Err(DomainError::InvalidCallStatus);
        }

        self.status = new_status;
        Ok(())
    }

    /// Force-mark the call ended, recording who ended it and when
    pub fn mark_ended(&mut self, ended_by: Option<UserRef>, ended_at: DateTime<Utc>) {
        self.status = CallStatus::Ended;
        self.ended_by = ended_by;
        self.ended_at = Some(ended_at);
    }

    pub fn has_participant(&self, user_id: &UserId) -> bool {
        self.participants.iter().any(|p| p.user.id == *user_id)
    }

    /// Append a participant unless a participant with the same user id
    /// already exists. Returns whether the participant was appended.
    pub fn add_participant(&mut self, participant: CallParticipant) -> bool {
        if self.has_participant(&participant.user.id) {
            return false;
        }

        self.participants.push(participant);
        true
    }

    pub fn is_ended(&self) -> bool {
        self.status.is_ended()
    }

    /// Drop the opaque provider blob, for reads that leave the server
    pub fn without_provider_data(mut self) -> Self {
        self.provider_data = None;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creator() -> UserRef {
        UserRef {
            id: UserId::new(),
            username: "alice".to_string(),
            name: Some("Alice".to_string()),
        }
    }

    #[test]
    fn test_initial_status_per_kind() {
        let direct = CallRecord::direct(RoomId::new(), creator(), "jitsi".to_string());
        assert_eq!(direct.status, CallStatus::Calling);
        assert_eq!(direct.call_type(), CallType::Direct);

        let group = CallRecord::group(
            RoomId::new(),
            creator(),
            "jitsi".to_string(),
            "Standup".to_string(),
        );
        assert_eq!(group.status, CallStatus::Started);
        assert_eq!(group.title(), Some("Standup"));

        let livechat = CallRecord::livechat(RoomId::new(), creator(), "jitsi".to_string());
        assert_eq!(livechat.status, CallStatus::Started);
        assert_eq!(livechat.title(), None);
    }

    #[test]
    fn test_new_record_has_no_participants_or_url() {
        let call = CallRecord::direct(RoomId::new(), creator(), "jitsi".to_string());
        assert!(call.participants.is_empty());
        assert!(call.url.is_none());
        assert!(call.messages.started.is_none());
    }

    #[test]
    fn test_transition_guard() {
        let mut call = CallRecord::direct(RoomId::new(), creator(), "jitsi".to_string());

        call.transition_to(CallStatus::Started).unwrap();
        call.transition_to(CallStatus::Ended).unwrap();

        let result = call.transition_to(CallStatus::Started);
        assert!(matches!(result, Err(DomainError::InvalidCallStatus)));
    }

    #[test]
    fn test_add_participant_is_idempotent() {
        let mut call = CallRecord::group(
            RoomId::new(),
            creator(),
            "jitsi".to_string(),
            "Standup".to_string(),
        );

        let user = UserRef {
            id: UserId::new(),
            username: "bob".to_string(),
            name: None,
        };

        assert!(call.add_participant(CallParticipant::new(user.clone())));
        assert!(!call.add_participant(CallParticipant::new(user.clone())));
        assert_eq!(call.participants.len(), 1);
        assert!(call.has_participant(&user.id));
    }

    #[test]
    fn test_mark_ended() {
        let mut call = CallRecord::direct(RoomId::new(), creator(), "jitsi".to_string());
        let by = creator();

        call.mark_ended(Some(by.clone()), Utc::now());
        assert!(call.is_ended());
        assert_eq!(call.ended_by.as_ref().map(|u| u.id), Some(by.id));
        assert!(call.ended_at.is_some());
    }

    #[test]
    fn test_without_provider_data() {
        let mut call = CallRecord::livechat(RoomId::new(), creator(), "jitsi".to_string());
        call.provider_data = Some(serde_json::json!({ "session": "abc" }));

        let filtered = call.clone().without_provider_data();
        assert!(filtered.provider_data.is_none());
        assert_eq!(filtered.id, call.id);
    }

    #[test]
    fn test_kind_serializes_with_wire_tag() {
        let group = CallKind::Group {
            title: "Standup".to_string(),
        };
        let json = serde_json::to_value(&group).unwrap();
        assert_eq!(json["type"], "videoconference");
        assert_eq!(json["title"], "Standup");

        let direct: CallKind = serde_json::from_value(serde_json::json!({ "type": "direct" })).unwrap();
        assert_eq!(direct, CallKind::Direct);
    }
}
