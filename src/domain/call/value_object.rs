//! Call value objects

use crate::domain::shared::value_objects::{CallId, UserId};
use serde::{Deserialize, Serialize};

/// Call type tag
///
/// The wire form used in instruction payloads and API responses. Group
/// calls are tagged `videoconference` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallType {
    /// Two-party call in a direct room
    Direct,
    /// Multi-party call in a channel or private group
    #[serde(rename = "videoconference")]
    Group,
    /// Call between a livechat visitor and an agent
    Livechat,
}

impl CallType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallType::Direct => "direct",
            CallType::Group => "videoconference",
            CallType::Livechat => "livechat",
        }
    }
}

/// Call status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallStatus {
    /// Callee is being alerted (direct calls start here)
    Calling,
    /// Call is live
    Started,
    /// Call has ended
    Ended,
}

impl CallStatus {
    /// Check if status transition is valid
    pub fn can_transition_to(&self, new_status: &CallStatus) -> bool {
        use CallStatus::*;

        match (self, new_status) {
            // From Calling
            (Calling, Started) => true,
            (Calling, Ended) => true,

            // From Started
            (Started, Ended) => true,

            // Can't transition out of Ended
            (Ended, _) => false,

            // All other transitions are invalid
            _ => false,
        }
    }

    pub fn is_ended(&self) -> bool {
        matches!(self, CallStatus::Ended)
    }

    pub fn is_active(&self) -> bool {
        !self.is_ended()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CallStatus::Calling => "calling",
            CallStatus::Started => "started",
            CallStatus::Ended => "ended",
        }
    }
}

/// What the caller should do after a call was created
///
/// Direct calls carry the resolved callee so the client can ring them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CallInstructions {
    Direct {
        call_id: CallId,
        callee: UserId,
    },
    #[serde(rename = "videoconference")]
    Group {
        call_id: CallId,
    },
    Livechat {
        call_id: CallId,
    },
}

impl CallInstructions {
    pub fn call_id(&self) -> CallId {
        match self {
            CallInstructions::Direct { call_id, .. } => *call_id,
            CallInstructions::Group { call_id } => *call_id,
            CallInstructions::Livechat { call_id } => *call_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_status_transitions() {
        let calling = CallStatus::Calling;
        assert!(calling.can_transition_to(&CallStatus::Started));
        assert!(calling.can_transition_to(&CallStatus::Ended));

        let started = CallStatus::Started;
        assert!(started.can_transition_to(&CallStatus::Ended));
        assert!(!started.can_transition_to(&CallStatus::Calling));
    }

    #[test]
    fn test_invalid_status_transitions() {
        let ended = CallStatus::Ended;
        assert!(!ended.can_transition_to(&CallStatus::Calling));
        assert!(!ended.can_transition_to(&CallStatus::Started));
        assert!(!ended.can_transition_to(&CallStatus::Ended));
    }

    #[test]
    fn test_is_active() {
        assert!(CallStatus::Calling.is_active());
        assert!(CallStatus::Started.is_active());
        assert!(!CallStatus::Ended.is_active());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&CallStatus::Calling).unwrap(),
            "\"calling\""
        );
        assert_eq!(
            serde_json::to_string(&CallStatus::Ended).unwrap(),
            "\"ended\""
        );
    }

    #[test]
    fn test_instructions_carry_type_tag() {
        let instructions = CallInstructions::Group {
            call_id: CallId::new(),
        };
        let json = serde_json::to_value(&instructions).unwrap();
        assert_eq!(json["type"], "videoconference");

        let direct = CallInstructions::Direct {
            call_id: CallId::new(),
            callee: UserId::new(),
        };
        let json = serde_json::to_value(&direct).unwrap();
        assert_eq!(json["type"], "direct");
        assert!(json["callee"].is_string());
    }
}
