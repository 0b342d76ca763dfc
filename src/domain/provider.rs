//! Provider registry port
//!
//! Conferencing providers live outside this service; the registry resolves
//! which one is active and turns call records into joinable URLs. It is
//! injected wherever needed, never a process-wide singleton.

use crate::domain::call::{CallRecord, CallType};
use crate::domain::shared::result::Result;
use crate::domain::shared::value_objects::{CallId, RoomId};
use crate::domain::user::UserRef;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Provider identity shown to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    pub key: String,
    pub label: String,
}

/// The call fields a provider needs to build a URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallDescriptor {
    pub id: CallId,
    pub call_type: CallType,
    pub room_id: RoomId,
    pub created_by: UserRef,
    pub title: Option<String>,
    pub url: Option<String>,
    pub provider_data: Option<serde_json::Value>,
}

impl From<&CallRecord> for CallDescriptor {
    fn from(call: &CallRecord) -> Self {
        Self {
            id: call.id,
            call_type: call.call_type(),
            room_id: call.room_id,
            created_by: call.created_by.clone(),
            title: call.title().map(str::to_string),
            url: call.url.clone(),
            provider_data: call.provider_data.clone(),
        }
    }
}

/// Device preferences carried into a customized join URL
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinOptions {
    pub mic: Option<bool>,
    pub cam: Option<bool>,
}

/// Registry of conferencing providers
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProviderRegistry: Send + Sync {
    /// Key of the currently active provider, if any
    fn active_provider(&self) -> Option<String>;

    /// Whether the named provider is registered and ready
    fn is_available(&self, name: &str) -> bool;

    /// Produce the base join URL for a call
    async fn generate_url(&self, name: &str, call: &CallDescriptor) -> Result<String>;

    /// Tailor the cached URL for one joining user
    async fn customize_url<'a>(
        &self,
        name: &str,
        call: &CallDescriptor,
        user: Option<&'a UserRef>,
        options: &JoinOptions,
    ) -> Result<String>;

    /// All registered providers
    fn provider_list(&self) -> Vec<ProviderInfo>;
}
