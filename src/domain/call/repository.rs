//! Call repository interface

use crate::domain::call::entity::{CallParticipant, CallRecord};
use crate::domain::call::value_object::CallStatus;
use crate::domain::shared::result::Result;
use crate::domain::shared::value_objects::{CallId, MessageId, RoomId};
use crate::domain::user::UserRef;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Repository interface for call records
///
/// This is defined in the domain layer as a trait (port),
/// and implemented in the infrastructure layer (adapter).
///
/// Mutations on unknown call ids fail with `InvalidCall`.
#[async_trait]
pub trait CallRepository: Send + Sync {
    /// Persist a new call record
    async fn create(&self, call: &CallRecord) -> Result<()>;

    /// Find a call by its ID
    async fn find_by_id(&self, id: &CallId) -> Result<Option<CallRecord>>;

    /// Recent calls for a room, newest first
    async fn find_recent_by_room(
        &self,
        room_id: &RoomId,
        offset: usize,
        count: usize,
    ) -> Result<Vec<CallRecord>>;

    /// Total calls recorded for a room
    async fn count_by_room(&self, room_id: &RoomId) -> Result<i64>;

    /// Cache the generated join URL
    async fn set_url(&self, id: &CallId, url: &str) -> Result<()>;

    /// Overwrite the call status
    async fn set_status(&self, id: &CallId, status: CallStatus) -> Result<()>;

    /// Mark a call ended: status, who ended it (if attributed) and when
    async fn set_ended(
        &self,
        id: &CallId,
        ended_by: Option<UserRef>,
        ended_at: DateTime<Utc>,
    ) -> Result<()>;

    /// Record who ended the call without touching status
    async fn set_ended_by(&self, id: &CallId, ended_by: UserRef) -> Result<()>;

    /// Record when the call ended without touching status
    async fn set_ended_at(&self, id: &CallId, ended_at: DateTime<Utc>) -> Result<()>;

    /// Attach the chat message that announced the call
    async fn set_started_message(&self, id: &CallId, message_id: &MessageId) -> Result<()>;

    /// Replace the opaque provider blob
    async fn set_provider_data(
        &self,
        id: &CallId,
        data: Option<serde_json::Value>,
    ) -> Result<()>;

    /// Append a participant unless one with the same user id is already on
    /// the call. The check and the append are a single atomic operation.
    /// Returns whether the participant was appended.
    async fn add_participant_if_absent(
        &self,
        id: &CallId,
        participant: CallParticipant,
    ) -> Result<bool>;
}
