//! Chat message bounded context
//!
//! Calls announce themselves through a chat message whose blocks are
//! mutated as the call progresses: a status line, a join button, and an
//! avatar strip that grows as users join.

use crate::domain::shared::result::Result;
use crate::domain::shared::value_objects::{CallId, MessageId, RoomId};
use crate::domain::user::UserRef;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Rich content fragment of a chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MessageBlock {
    /// Status line ("alice is calling", "Call from alice was not answered")
    Section { text: String },
    /// Interactive elements, here always the join button
    Actions {
        block_id: String,
        elements: Vec<ActionElement>,
    },
    /// Small trailing elements, here the participant avatar strip
    Context { elements: Vec<ContextElement> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ActionElement {
    Button {
        action_id: String,
        text: String,
        value: String,
        url: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContextElement {
    Image { image_url: String, alt_text: String },
}

impl MessageBlock {
    pub fn section(text: impl Into<String>) -> Self {
        MessageBlock::Section { text: text.into() }
    }

    /// The join button for a call, labeled with the call title
    pub fn join_button(call_id: &CallId, title: &str, url: &str) -> Self {
        MessageBlock::Actions {
            block_id: call_id.to_string(),
            elements: vec![ActionElement::Button {
                action_id: "join-call".to_string(),
                text: "Join call".to_string(),
                value: title.to_string(),
                url: url.to_string(),
            }],
        }
    }

    /// Empty avatar strip, filled in as users join
    pub fn avatar_strip() -> Self {
        MessageBlock::Context {
            elements: Vec::new(),
        }
    }
}

/// Chat message entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub room_id: RoomId,
    pub sender: UserRef,
    pub text: String,
    pub blocks: Vec<MessageBlock>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(room_id: RoomId, sender: UserRef, text: String, blocks: Vec<MessageBlock>) -> Self {
        Self {
            id: MessageId::new(),
            room_id,
            sender,
            text,
            blocks,
            created_at: Utc::now(),
        }
    }

    /// Append an avatar to the context block unless one with the same image
    /// URL is already there. Creates the context block if the message has
    /// none. Returns whether an element was appended.
    pub fn append_avatar_if_absent(&mut self, image_url: &str, alt_text: &str) -> bool {
        let elements = match self
            .blocks
            .iter_mut()
            .find(|b| matches!(b, MessageBlock::Context { .. }))
        {
            Some(MessageBlock::Context { elements }) => elements,
            _ => {
                self.blocks.push(MessageBlock::avatar_strip());
                match self.blocks.last_mut() {
                    Some(MessageBlock::Context { elements }) => elements,
                    _ => unreachable!(),
                }
            }
        };

        let already_there = elements.iter().any(|e| {
            let ContextElement::Image { image_url: existing, .. } = e;
            existing == image_url
        });
        if already_there {
            return false;
        }

        elements.push(ContextElement::Image {
            image_url: image_url.to_string(),
            alt_text: alt_text.to_string(),
        });
        true
    }
}

/// Message repository trait
///
/// Block updates on unknown message ids are ignored: chat messages can be
/// purged independently of the calls that reference them.
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Persist a new message, returning its id
    async fn create(&self, message: Message) -> Result<MessageId>;

    /// Find message by ID
    async fn find_by_id(&self, id: &MessageId) -> Result<Option<Message>>;

    /// Replace the message blocks
    async fn set_blocks(&self, id: &MessageId, blocks: Vec<MessageBlock>) -> Result<()>;

    /// Append an avatar to the message's context block unless one with the
    /// same image URL exists. The check and the append are a single atomic
    /// operation. Returns whether an element was appended.
    async fn append_avatar_if_absent(
        &self,
        id: &MessageId,
        image_url: &str,
        alt_text: &str,
    ) -> Result<bool>;
}
