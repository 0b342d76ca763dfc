//! Call lifecycle orchestration
//!
//! `CallService` coordinates the room, user, call and message stores with
//! the provider registry: it validates who may call where, persists call
//! records, resolves join URLs and keeps the announcement message in sync
//! with the call state.

use crate::domain::call::{
    CallInstructions, CallParticipant, CallRecord, CallRepository, CallStatus, CallType,
};
use crate::domain::message::{Message, MessageBlock, MessageRepository};
use crate::domain::provider::{CallDescriptor, JoinOptions, ProviderInfo, ProviderRegistry};
use crate::domain::room::{CallTypeClassifier, Room, RoomRepository};
use crate::domain::shared::error::DomainError;
use crate::domain::shared::result::Result;
use crate::domain::shared::value_objects::{CallId, RoomId, UserId};
use crate::domain::user::{User, UserRef, UserRepository};
use chrono::{DateTime, Utc};
use futures::join;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Input for creating a call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCall {
    pub call_type: CallType,
    pub room_id: RoomId,
    pub created_by: UserId,
    pub provider_name: String,
    pub title: Option<String>,
}

/// One page of results
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub offset: usize,
    pub count: usize,
    pub total: i64,
}

/// Call lifecycle orchestrator
pub struct CallService {
    calls: Arc<dyn CallRepository>,
    rooms: Arc<dyn RoomRepository>,
    users: Arc<dyn UserRepository>,
    messages: Arc<dyn MessageRepository>,
    providers: Arc<dyn ProviderRegistry>,
    classifier: Arc<dyn CallTypeClassifier>,
    /// Site base URL, used to build avatar image links
    base_url: String,
}

impl CallService {
    pub fn new(
        calls: Arc<dyn CallRepository>,
        rooms: Arc<dyn RoomRepository>,
        users: Arc<dyn UserRepository>,
        messages: Arc<dyn MessageRepository>,
        providers: Arc<dyn ProviderRegistry>,
        classifier: Arc<dyn CallTypeClassifier>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            calls,
            rooms,
            users,
            messages,
            providers,
            classifier,
            base_url: base_url.into(),
        }
    }

    /// Start a call in a room: resolve the active provider, classify the
    /// room, then create the matching call kind
    pub async fn start(
        &self,
        caller: &UserId,
        room_id: &RoomId,
        title: Option<String>,
    ) -> Result<CallInstructions> {
        let provider_name = self
            .providers
            .active_provider()
            .ok_or(DomainError::NoActiveProvider)?;

        let room = self
            .rooms
            .find_by_id(room_id)
            .await?
            .ok_or(DomainError::InvalidRoom)?;
        let call_type = self.classifier.classify(&room);

        self.create(CreateCall {
            call_type,
            room_id: *room_id,
            created_by: *caller,
            provider_name,
            title,
        })
        .await
    }

    /// Validate room and creator, persist the record and announce the call
    /// in the room. Returns instructions telling the caller what to do next.
    pub async fn create(&self, data: CreateCall) -> Result<CallInstructions> {
        // Independent lookups; a missing room wins over a missing user
        let (room, user) = join!(
            self.rooms.find_by_id(&data.room_id),
            self.users.find_by_id(&data.created_by),
        );
        let room = room?.ok_or(DomainError::InvalidRoom)?;
        let user = user?.ok_or(DomainError::UserNotFound)?;

        match data.call_type {
            CallType::Direct => {
                let member_ids = match room.member_ids() {
                    Some(ids) if ids.len() <= 2 => ids,
                    _ => return Err(DomainError::TypeRoomMismatch),
                };
                let callee = member_ids
                    .iter()
                    .find(|id| **id != user.id)
                    .copied()
                    .ok_or(DomainError::InvalidCallTarget)?;

                self.create_direct_call(room, user, data.provider_name, callee)
                    .await
            }
            CallType::Group => {
                self.create_group_call(room, user, data.provider_name, data.title)
                    .await
            }
            CallType::Livechat => {
                self.create_livechat_call(room, user, data.provider_name)
                    .await
            }
        }
    }

    async fn create_direct_call(
        &self,
        room: Room,
        user: User,
        provider_name: String,
        callee: UserId,
    ) -> Result<CallInstructions> {
        let creator = UserRef::from(&user);
        let call = CallRecord::direct(room.id, creator.clone(), provider_name);
        self.calls.create(&call).await?;

        let url = self.generate_new_url(&call).await?;
        self.calls.set_url(&call.id, &url).await?;

        let text = format!("{} is calling", user.username);
        let message = Message::new(
            room.id,
            creator,
            text.clone(),
            vec![MessageBlock::section(text)],
        );
        let message_id = self.messages.create(message).await?;
        self.calls.set_started_message(&call.id, &message_id).await?;

        info!("Created direct call {} in room {}", call.id, room.id);

        Ok(CallInstructions::Direct {
            call_id: call.id,
            callee,
        })
    }

    async fn create_group_call(
        &self,
        room: Room,
        user: User,
        provider_name: String,
        title: Option<String>,
    ) -> Result<CallInstructions> {
        let title = title
            .filter(|t| !t.is_empty())
            .or_else(|| room.display_name.clone().filter(|t| !t.is_empty()))
            .or_else(|| room.name.clone().filter(|t| !t.is_empty()))
            .unwrap_or_default();

        let creator = UserRef::from(&user);
        let mut call = CallRecord::group(room.id, creator.clone(), provider_name, title.clone());
        self.calls.create(&call).await?;

        // The announcement's join button carries the call URL
        let url = self.get_url(&mut call, None, &JoinOptions::default()).await?;

        let text = format!("{} started a call", user.username);
        let message = Message::new(
            room.id,
            creator,
            text.clone(),
            vec![
                MessageBlock::section(text),
                MessageBlock::join_button(&call.id, &title, &url),
                MessageBlock::avatar_strip(),
            ],
        );
        let message_id = self.messages.create(message).await?;
        self.calls.set_started_message(&call.id, &message_id).await?;

        info!("Created group call {} in room {}", call.id, room.id);

        Ok(CallInstructions::Group { call_id: call.id })
    }

    async fn create_livechat_call(
        &self,
        room: Room,
        user: User,
        provider_name: String,
    ) -> Result<CallInstructions> {
        let creator = UserRef::from(&user);
        let mut call = CallRecord::livechat(room.id, creator.clone(), provider_name);
        self.calls.create(&call).await?;

        let url = self.get_url(&mut call, None, &JoinOptions::default()).await?;

        let text = format!("{} started a call", user.username);
        let message = Message::new(
            room.id,
            creator,
            text.clone(),
            vec![
                MessageBlock::section(text),
                MessageBlock::join_button(&call.id, "", &url),
            ],
        );
        let message_id = self.messages.create(message).await?;
        self.calls.set_started_message(&call.id, &message_id).await?;

        info!("Created livechat call {} in room {}", call.id, room.id);

        Ok(CallInstructions::Livechat { call_id: call.id })
    }

    /// Resolve the join URL for a user. Non-livechat calls also track the
    /// participant, and non-direct calls grow the avatar strip on the
    /// announcement message.
    pub async fn join(
        &self,
        user_id: &UserId,
        call_id: &CallId,
        options: JoinOptions,
    ) -> Result<String> {
        let mut call = self
            .calls
            .find_by_id(call_id)
            .await?
            .ok_or(DomainError::InvalidCall)?;
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::UserNotFound)?;

        let url = self.get_url(&mut call, Some(&user), &options).await?;

        if call.call_type() != CallType::Livechat {
            self.add_user_to_call(&call, &user, Utc::now()).await?;
        }

        info!("User {} joined call {}", user.username, call.id);

        Ok(url)
    }

    /// Cancel a ringing direct call before it was answered
    pub async fn cancel(&self, user_id: &UserId, call_id: &CallId) -> Result<()> {
        let call = self
            .calls
            .find_by_id(call_id)
            .await?
            .ok_or(DomainError::InvalidCall)?;
        if call.call_type() != CallType::Direct {
            return Err(DomainError::InvalidCall);
        }
        if call.status != CallStatus::Calling || call.ended_by.is_some() || call.ended_at.is_some()
        {
            return Err(DomainError::InvalidCallStatus);
        }

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::UserNotFound)?;

        if let Some(message_id) = call.messages.started {
            let text = format!("Call from {} was not answered", call.created_by.username);
            self.messages
                .set_blocks(&message_id, vec![MessageBlock::section(text)])
                .await?;
        }

        self.calls
            .set_ended(&call.id, Some(UserRef::from(&user)), Utc::now())
            .await?;

        info!("Call {} canceled by {}", call.id, user.username);

        Ok(())
    }

    /// End a livechat call. Returns false, touching nothing, when the call
    /// is missing or not a livechat call.
    pub async fn end_livechat_call(&self, call_id: &CallId) -> Result<bool> {
        let Some(call) = self.calls.find_by_id(call_id).await? else {
            return Ok(false);
        };
        if call.call_type() != CallType::Livechat {
            return Ok(false);
        }

        if let Some(message_id) = call.messages.started {
            let text = format!(
                "Video call from {} was not answered",
                call.created_by.username
            );
            self.messages
                .set_blocks(&message_id, vec![MessageBlock::section(text)])
                .await?;
        }

        self.calls.set_ended(&call.id, None, Utc::now()).await?;

        info!("Livechat call {} ended", call.id);

        Ok(true)
    }

    /// Overwrite the call status, honoring the transition table
    pub async fn set_status(&self, call_id: &CallId, status: CallStatus) -> Result<()> {
        let call = self
            .calls
            .find_by_id(call_id)
            .await?
            .ok_or(DomainError::InvalidCall)?;
        if !call.status.can_transition_to(&status) {
            return Err(DomainError::InvalidCallStatus);
        }

        self.calls.set_status(&call.id, status).await
    }

    /// Record which user ended the call
    pub async fn set_ended_by(&self, call_id: &CallId, user_id: &UserId) -> Result<()> {
        let call = self
            .calls
            .find_by_id(call_id)
            .await?
            .ok_or(DomainError::InvalidCall)?;
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::UserNotFound)?;

        self.calls.set_ended_by(&call.id, UserRef::from(&user)).await
    }

    /// Record when the call ended
    pub async fn set_ended_at(&self, call_id: &CallId, ended_at: DateTime<Utc>) -> Result<()> {
        let call = self
            .calls
            .find_by_id(call_id)
            .await?
            .ok_or(DomainError::InvalidCall)?;

        self.calls.set_ended_at(&call.id, ended_at).await
    }

    /// Replace the opaque provider blob on the record
    pub async fn set_provider_data(
        &self,
        call_id: &CallId,
        data: Option<serde_json::Value>,
    ) -> Result<()> {
        let call = self
            .calls
            .find_by_id(call_id)
            .await?
            .ok_or(DomainError::InvalidCall)?;

        self.calls.set_provider_data(&call.id, data).await
    }

    /// Put a user on a call without going through join
    pub async fn add_user(
        &self,
        call_id: &CallId,
        user_id: &UserId,
        joined_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let call = self
            .calls
            .find_by_id(call_id)
            .await?
            .ok_or(DomainError::InvalidCall)?;
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::UserNotFound)?;

        self.add_user_to_call(&call, &user, joined_at.unwrap_or_else(Utc::now))
            .await
    }

    /// Fetch a call with the provider blob stripped
    pub async fn get(&self, call_id: &CallId) -> Result<Option<CallRecord>> {
        Ok(self
            .calls
            .find_by_id(call_id)
            .await?
            .map(CallRecord::without_provider_data))
    }

    /// Fetch a call including provider state; server-side use only
    pub async fn get_unfiltered(&self, call_id: &CallId) -> Result<Option<CallRecord>> {
        self.calls.find_by_id(call_id).await
    }

    /// Recent calls for a room, newest first, provider blobs stripped
    pub async fn list(
        &self,
        room_id: &RoomId,
        offset: usize,
        count: usize,
    ) -> Result<Paginated<CallRecord>> {
        let data: Vec<CallRecord> = self
            .calls
            .find_recent_by_room(room_id, offset, count)
            .await?
            .into_iter()
            .map(CallRecord::without_provider_data)
            .collect();
        let total = self.calls.count_by_room(room_id).await?;

        let count = data.len();
        Ok(Paginated {
            data,
            offset,
            count,
            total,
        })
    }

    /// All registered providers
    pub fn list_providers(&self) -> Vec<ProviderInfo> {
        self.providers.provider_list()
    }

    /// Track a participant; for non-direct calls also grow the avatar strip
    /// on the announcement message. Both appends are store-side if-absent
    /// operations, so repeated joins converge.
    async fn add_user_to_call(
        &self,
        call: &CallRecord,
        user: &User,
        joined_at: DateTime<Utc>,
    ) -> Result<()> {
        let participant = CallParticipant::with_joined_at(UserRef::from(user), joined_at);
        let added = self
            .calls
            .add_participant_if_absent(&call.id, participant)
            .await?;

        if !added || call.call_type() == CallType::Direct {
            return Ok(());
        }
        let Some(message_id) = call.messages.started else {
            return Ok(());
        };

        let image_url = format!("{}/avatar/{}", self.base_url, user.username);
        self.messages
            .append_avatar_if_absent(&message_id, &image_url, user.label())
            .await?;

        Ok(())
    }

    /// Tailor the stored call URL for one join, regenerating it first if
    /// the record has none. The provider must be available on every
    /// resolution, cached URL or not.
    async fn get_url(
        &self,
        call: &mut CallRecord,
        user: Option<&User>,
        options: &JoinOptions,
    ) -> Result<String> {
        if !self.providers.is_available(&call.provider_name) {
            return Err(DomainError::ProviderUnavailable);
        }

        if call.url.is_none() {
            let url = self.generate_new_url(call).await?;
            self.calls.set_url(&call.id, &url).await?;
            call.url = Some(url);
        }

        let descriptor = CallDescriptor::from(&*call);
        let user_ref = user.map(UserRef::from);
        self.providers
            .customize_url(&call.provider_name, &descriptor, user_ref.as_ref(), options)
            .await
            .map_err(wrap_provider_err)
    }

    async fn generate_new_url(&self, call: &CallRecord) -> Result<String> {
        if !self.providers.is_available(&call.provider_name) {
            return Err(DomainError::ProviderUnavailable);
        }

        let descriptor = CallDescriptor::from(call);
        self.providers
            .generate_url(&call.provider_name, &descriptor)
            .await
            .map_err(wrap_provider_err)
    }
}

/// Failures inside a provider surface as `ProviderFailed`
fn wrap_provider_err(err: DomainError) -> DomainError {
    match err {
        DomainError::ProviderFailed(_) => err,
        other => DomainError::ProviderFailed(other.to_string()),
    }
}
