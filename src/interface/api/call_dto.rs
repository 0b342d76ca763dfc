//! Call API DTOs (Data Transfer Objects)

use crate::application::{CreateCall, Paginated};
use crate::domain::call::{CallParticipant, CallRecord, CallStatus, CallType};
use crate::domain::shared::value_objects::{CallId, MessageId, RoomId, UserId};
use crate::domain::user::UserRef;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Call response DTO
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallResponse {
    pub id: CallId,
    #[serde(rename = "type")]
    pub call_type: CallType,
    pub title: Option<String>,
    pub room_id: RoomId,
    pub created_by: UserRef,
    pub status: CallStatus,
    pub url: Option<String>,
    pub participants: Vec<CallParticipant>,
    pub started_message_id: Option<MessageId>,
    pub ended_by: Option<UserRef>,
    pub ended_at: Option<DateTime<Utc>>,
    pub provider_name: String,
    pub created_at: DateTime<Utc>,
}

/// Call list response
#[derive(Debug, Serialize)]
pub struct CallListResponse {
    pub calls: Vec<CallResponse>,
    pub total: i64,
    pub offset: usize,
    pub count: usize,
}

/// Start call request: the room decides the call kind
#[derive(Debug, Deserialize)]
pub struct StartCallRequest {
    pub room_id: RoomId,
    pub user_id: UserId,
    pub title: Option<String>,
}

/// Create call request with an explicit kind and provider
#[derive(Debug, Deserialize)]
pub struct CreateCallRequest {
    #[serde(rename = "type")]
    pub call_type: CallType,
    pub room_id: RoomId,
    pub created_by: UserId,
    pub provider_name: String,
    pub title: Option<String>,
}

/// Join call request
#[derive(Debug, Deserialize)]
pub struct JoinCallRequest {
    pub user_id: UserId,
    pub mic: Option<bool>,
    pub cam: Option<bool>,
}

/// Join call response
#[derive(Debug, Serialize, Deserialize)]
pub struct JoinCallResponse {
    pub url: String,
}

/// Cancel call request
#[derive(Debug, Deserialize)]
pub struct CancelCallRequest {
    pub user_id: UserId,
}

/// End livechat call response
#[derive(Debug, Serialize, Deserialize)]
pub struct EndCallResponse {
    pub ended: bool,
}

/// Set status request
#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: CallStatus,
}

/// Set ended-at request
#[derive(Debug, Deserialize)]
pub struct SetEndedAtRequest {
    pub ended_at: DateTime<Utc>,
}

/// Set provider data request
#[derive(Debug, Deserialize)]
pub struct SetProviderDataRequest {
    pub data: Option<serde_json::Value>,
}

/// Add user request
#[derive(Debug, Deserialize)]
pub struct AddUserRequest {
    pub user_id: UserId,
    pub joined_at: Option<DateTime<Utc>>,
}

/// Query parameters for listing calls
#[derive(Debug, Deserialize)]
pub struct ListCallsQuery {
    #[serde(default)]
    pub offset: usize,
    #[serde(default = "default_count")]
    pub count: usize,
}

fn default_count() -> usize {
    25
}

/// Generic API response
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

/// Convert domain CallRecord to CallResponse
impl From<CallRecord> for CallResponse {
    fn from(call: CallRecord) -> Self {
        Self {
            id: call.id,
            call_type: call.call_type(),
            title: call.title().map(str::to_string),
            room_id: call.room_id,
            created_by: call.created_by,
            status: call.status,
            url: call.url,
            participants: call.participants,
            started_message_id: call.messages.started,
            ended_by: call.ended_by,
            ended_at: call.ended_at,
            provider_name: call.provider_name,
            created_at: call.created_at,
        }
    }
}

/// Convert a page of call records to CallListResponse
impl From<Paginated<CallRecord>> for CallListResponse {
    fn from(page: Paginated<CallRecord>) -> Self {
        Self {
            calls: page.data.into_iter().map(CallResponse::from).collect(),
            total: page.total,
            offset: page.offset,
            count: page.count,
        }
    }
}

/// Convert CreateCallRequest to the application input
impl From<CreateCallRequest> for CreateCall {
    fn from(req: CreateCallRequest) -> Self {
        Self {
            call_type: req.call_type,
            room_id: req.room_id,
            created_by: req.created_by,
            provider_name: req.provider_name,
            title: req.title,
        }
    }
}
