//! In-memory store implementations
//!
//! Each store keeps its records in a `HashMap` behind a single mutex, so
//! the if-absent operations check and append under one lock.

use crate::domain::call::{CallParticipant, CallRecord, CallRepository, CallStatus};
use crate::domain::message::{Message, MessageBlock, MessageRepository};
use crate::domain::room::{Room, RoomRepository};
use crate::domain::shared::error::DomainError;
use crate::domain::shared::result::Result;
use crate::domain::shared::value_objects::{CallId, MessageId, RoomId, UserId};
use crate::domain::user::{User, UserRef, UserRepository};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory room store
#[derive(Default)]
pub struct InMemoryRoomRepository {
    rooms: Mutex<HashMap<RoomId, Room>>,
}

impl InMemoryRoomRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a room, used for seeding
    pub fn insert(&self, room: Room) {
        let mut rooms = self.rooms.lock().unwrap();
        rooms.insert(room.id, room);
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn find_by_id(&self, id: &RoomId) -> Result<Option<Room>> {
        let rooms = self.rooms.lock().unwrap();
        Ok(rooms.get(id).cloned())
    }
}

/// In-memory user store
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a user, used for seeding
    pub fn insert(&self, user: User) {
        let mut users = self.users.lock().unwrap();
        users.insert(user.id, user);
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.get(id).cloned())
    }
}

/// In-memory call store
#[derive(Default)]
pub struct InMemoryCallRepository {
    calls: Mutex<HashMap<CallId, CallRecord>>,
}

impl InMemoryCallRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a mutation against a stored call, failing on unknown ids
    fn update<F>(&self, id: &CallId, mutate: F) -> Result<()>
    where
        F: FnOnce(&mut CallRecord),
    {
        let mut calls = self.calls.lock().unwrap();
        match calls.get_mut(id) {
            Some(call) => {
                mutate(call);
                Ok(())
            }
            None => Err(DomainError::InvalidCall),
        }
    }
}

#[async_trait]
impl CallRepository for InMemoryCallRepository {
    async fn create(&self, call: &CallRecord) -> Result<()> {
        let mut calls = self.calls.lock().unwrap();
        calls.insert(call.id, call.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &CallId) -> Result<Option<CallRecord>> {
        let calls = self.calls.lock().unwrap();
        Ok(calls.get(id).cloned())
    }

    async fn find_recent_by_room(
        &self,
        room_id: &RoomId,
        offset: usize,
        count: usize,
    ) -> Result<Vec<CallRecord>> {
        let calls = self.calls.lock().unwrap();
        let mut matching: Vec<CallRecord> = calls
            .values()
            .filter(|c| c.room_id == *room_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(matching.into_iter().skip(offset).take(count).collect())
    }

    async fn count_by_room(&self, room_id: &RoomId) -> Result<i64> {
        let calls = self.calls.lock().unwrap();
        Ok(calls.values().filter(|c| c.room_id == *room_id).count() as i64)
    }

    async fn set_url(&self, id: &CallId, url: &str) -> Result<()> {
        self.update(id, |call| call.url = Some(url.to_string()))
    }

    async fn set_status(&self, id: &CallId, status: CallStatus) -> Result<()> {
        self.update(id, |call| call.status = status)
    }

    async fn set_ended(
        &self,
        id: &CallId,
        ended_by: Option<UserRef>,
        ended_at: DateTime<Utc>,
    ) -> Result<()> {
        self.update(id, |call| call.mark_ended(ended_by, ended_at))
    }

    async fn set_ended_by(&self, id: &CallId, ended_by: UserRef) -> Result<()> {
        self.update(id, |call| call.ended_by = Some(ended_by))
    }

    async fn set_ended_at(&self, id: &CallId, ended_at: DateTime<Utc>) -> Result<()> {
        self.update(id, |call| call.ended_at = Some(ended_at))
    }

    async fn set_started_message(&self, id: &CallId, message_id: &MessageId) -> Result<()> {
        let message_id = *message_id;
        self.update(id, |call| call.messages.started = Some(message_id))
    }

    async fn set_provider_data(
        &self,
        id: &CallId,
        data: Option<serde_json::Value>,
    ) -> Result<()> {
        self.update(id, |call| call.provider_data = data)
    }

    async fn add_participant_if_absent(
        &self,
        id: &CallId,
        participant: CallParticipant,
    ) -> Result<bool> {
        let mut calls = self.calls.lock().unwrap();
        match calls.get_mut(id) {
            Some(call) => Ok(call.add_participant(participant)),
            None => Err(DomainError::InvalidCall),
        }
    }
}

/// In-memory chat message store
#[derive(Default)]
pub struct InMemoryMessageRepository {
    messages: Mutex<HashMap<MessageId, Message>>,
}

impl InMemoryMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn create(&self, message: Message) -> Result<MessageId> {
        let mut messages = self.messages.lock().unwrap();
        let id = message.id;
        messages.insert(id, message);
        Ok(id)
    }

    async fn find_by_id(&self, id: &MessageId) -> Result<Option<Message>> {
        let messages = self.messages.lock().unwrap();
        Ok(messages.get(id).cloned())
    }

    async fn set_blocks(&self, id: &MessageId, blocks: Vec<MessageBlock>) -> Result<()> {
        let mut messages = self.messages.lock().unwrap();
        if let Some(message) = messages.get_mut(id) {
            message.blocks = blocks;
        }
        Ok(())
    }

    async fn append_avatar_if_absent(
        &self,
        id: &MessageId,
        image_url: &str,
        alt_text: &str,
    ) -> Result<bool> {
        let mut messages = self.messages.lock().unwrap();
        Ok(messages
            .get_mut(id)
            .map(|m| m.append_avatar_if_absent(image_url, alt_text))
            .unwrap_or(false))
    }
}
