//! Call API handlers

use super::call_dto::{
    AddUserRequest, ApiResponse, CallListResponse, CallResponse, CancelCallRequest,
    CreateCallRequest, EndCallResponse, JoinCallRequest, JoinCallResponse, ListCallsQuery,
    SetEndedAtRequest, SetProviderDataRequest, SetStatusRequest, StartCallRequest,
};
use super::metrics_handler::{record_call_created, record_call_ended, record_call_joined};
use crate::application::CallService;
use crate::domain::call::CallInstructions;
use crate::domain::provider::{JoinOptions, ProviderInfo};
use crate::domain::shared::error::DomainError;
use crate::domain::shared::value_objects::{CallId, RoomId, UserId};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::{error, info};

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub call_service: Arc<CallService>,
}

/// Map a domain error to the HTTP status it travels under
fn error_status(err: &DomainError) -> StatusCode {
    match err {
        DomainError::InvalidRoom | DomainError::UserNotFound | DomainError::InvalidCall => {
            StatusCode::NOT_FOUND
        }
        DomainError::TypeRoomMismatch | DomainError::InvalidCallTarget => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        DomainError::InvalidCallStatus => StatusCode::CONFLICT,
        DomainError::NoActiveProvider | DomainError::ProviderUnavailable => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        DomainError::ProviderFailed(_) => StatusCode::BAD_GATEWAY,
        DomainError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn instruction_type(instructions: &CallInstructions) -> &'static str {
    match instructions {
        CallInstructions::Direct { .. } => "direct",
        CallInstructions::Group { .. } => "videoconference",
        CallInstructions::Livechat { .. } => "livechat",
    }
}

/// Start a call in a room; the room decides the call kind
pub async fn start_call(
    State(state): State<AppState>,
    Json(req): Json<StartCallRequest>,
) -> (StatusCode, Json<ApiResponse<CallInstructions>>) {
    info!("API: Starting call in room {}", req.room_id);

    match state
        .call_service
        .start(&req.user_id, &req.room_id, req.title)
        .await
    {
        Ok(instructions) => {
            info!("API: Created call {}", instructions.call_id());
            record_call_created(instruction_type(&instructions));
            (StatusCode::CREATED, Json(ApiResponse::success(instructions)))
        }
        Err(e) => {
            error!("API: Failed to start call: {}", e);
            (error_status(&e), Json(ApiResponse::error(e.to_string())))
        }
    }
}

/// Create a call with an explicit kind and provider
pub async fn create_call(
    State(state): State<AppState>,
    Json(req): Json<CreateCallRequest>,
) -> (StatusCode, Json<ApiResponse<CallInstructions>>) {
    info!("API: Creating {} call in room {}", req.call_type.as_str(), req.room_id);

    match state.call_service.create(req.into()).await {
        Ok(instructions) => {
            info!("API: Created call {}", instructions.call_id());
            record_call_created(instruction_type(&instructions));
            (StatusCode::CREATED, Json(ApiResponse::success(instructions)))
        }
        Err(e) => {
            error!("API: Failed to create call: {}", e);
            (error_status(&e), Json(ApiResponse::error(e.to_string())))
        }
    }
}

/// Get a call by ID, with provider state stripped
pub async fn get_call(
    State(state): State<AppState>,
    Path(id): Path<CallId>,
) -> (StatusCode, Json<ApiResponse<CallResponse>>) {
    info!("API: Getting call {}", id);

    match state.call_service.get(&id).await {
        Ok(Some(call)) => (StatusCode::OK, Json(ApiResponse::success(call.into()))),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error(format!("Call {} not found", id))),
        ),
        Err(e) => {
            error!("API: Failed to get call: {}", e);
            (error_status(&e), Json(ApiResponse::error(e.to_string())))
        }
    }
}

/// Join a call and get the URL to open
pub async fn join_call(
    State(state): State<AppState>,
    Path(id): Path<CallId>,
    Json(req): Json<JoinCallRequest>,
) -> (StatusCode, Json<ApiResponse<JoinCallResponse>>) {
    info!("API: User {} joining call {}", req.user_id, id);

    let options = JoinOptions {
        mic: req.mic,
        cam: req.cam,
    };

    match state.call_service.join(&req.user_id, &id, options).await {
        Ok(url) => {
            record_call_joined();
            (
                StatusCode::OK,
                Json(ApiResponse::success(JoinCallResponse { url })),
            )
        }
        Err(e) => {
            error!("API: Failed to join call: {}", e);
            (error_status(&e), Json(ApiResponse::error(e.to_string())))
        }
    }
}

/// Cancel a ringing direct call
pub async fn cancel_call(
    State(state): State<AppState>,
    Path(id): Path<CallId>,
    Json(req): Json<CancelCallRequest>,
) -> (StatusCode, Json<ApiResponse<()>>) {
    info!("API: User {} canceling call {}", req.user_id, id);

    match state.call_service.cancel(&req.user_id, &id).await {
        Ok(()) => {
            record_call_ended("canceled");
            (StatusCode::OK, Json(ApiResponse::success(())))
        }
        Err(e) => {
            error!("API: Failed to cancel call: {}", e);
            (error_status(&e), Json(ApiResponse::error(e.to_string())))
        }
    }
}

/// End a livechat call
pub async fn end_livechat_call(
    State(state): State<AppState>,
    Path(id): Path<CallId>,
) -> (StatusCode, Json<ApiResponse<EndCallResponse>>) {
    info!("API: Ending livechat call {}", id);

    match state.call_service.end_livechat_call(&id).await {
        Ok(ended) => {
            if ended {
                record_call_ended("livechat");
            }
            (
                StatusCode::OK,
                Json(ApiResponse::success(EndCallResponse { ended })),
            )
        }
        Err(e) => {
            error!("API: Failed to end livechat call: {}", e);
            (error_status(&e), Json(ApiResponse::error(e.to_string())))
        }
    }
}

/// Set the call status
pub async fn set_call_status(
    State(state): State<AppState>,
    Path(id): Path<CallId>,
    Json(req): Json<SetStatusRequest>,
) -> (StatusCode, Json<ApiResponse<()>>) {
    info!("API: Setting status {} for call {}", req.status.as_str(), id);

    match state.call_service.set_status(&id, req.status).await {
        Ok(()) => (StatusCode::OK, Json(ApiResponse::success(()))),
        Err(e) => {
            error!("API: Failed to set status: {}", e);
            (error_status(&e), Json(ApiResponse::error(e.to_string())))
        }
    }
}

/// Record which user ended a call
pub async fn set_call_ended_by(
    State(state): State<AppState>,
    Path((id, user_id)): Path<(CallId, UserId)>,
) -> (StatusCode, Json<ApiResponse<()>>) {
    info!("API: Setting ended-by {} for call {}", user_id, id);

    match state.call_service.set_ended_by(&id, &user_id).await {
        Ok(()) => (StatusCode::OK, Json(ApiResponse::success(()))),
        Err(e) => {
            error!("API: Failed to set ended-by: {}", e);
            (error_status(&e), Json(ApiResponse::error(e.to_string())))
        }
    }
}

/// Record when a call ended
pub async fn set_call_ended_at(
    State(state): State<AppState>,
    Path(id): Path<CallId>,
    Json(req): Json<SetEndedAtRequest>,
) -> (StatusCode, Json<ApiResponse<()>>) {
    info!("API: Setting ended-at for call {}", id);

    match state.call_service.set_ended_at(&id, req.ended_at).await {
        Ok(()) => (StatusCode::OK, Json(ApiResponse::success(()))),
        Err(e) => {
            error!("API: Failed to set ended-at: {}", e);
            (error_status(&e), Json(ApiResponse::error(e.to_string())))
        }
    }
}

/// Replace the opaque provider blob on a call
pub async fn set_call_provider_data(
    State(state): State<AppState>,
    Path(id): Path<CallId>,
    Json(req): Json<SetProviderDataRequest>,
) -> (StatusCode, Json<ApiResponse<()>>) {
    info!("API: Setting provider data for call {}", id);

    match state.call_service.set_provider_data(&id, req.data).await {
        Ok(()) => (StatusCode::OK, Json(ApiResponse::success(()))),
        Err(e) => {
            error!("API: Failed to set provider data: {}", e);
            (error_status(&e), Json(ApiResponse::error(e.to_string())))
        }
    }
}

/// Put a user on a call without going through join
pub async fn add_call_user(
    State(state): State<AppState>,
    Path(id): Path<CallId>,
    Json(req): Json<AddUserRequest>,
) -> (StatusCode, Json<ApiResponse<()>>) {
    info!("API: Adding user {} to call {}", req.user_id, id);

    match state
        .call_service
        .add_user(&id, &req.user_id, req.joined_at)
        .await
    {
        Ok(()) => (StatusCode::OK, Json(ApiResponse::success(()))),
        Err(e) => {
            error!("API: Failed to add user: {}", e);
            (error_status(&e), Json(ApiResponse::error(e.to_string())))
        }
    }
}

/// List recent calls for a room
pub async fn list_room_calls(
    State(state): State<AppState>,
    Path(room_id): Path<RoomId>,
    Query(query): Query<ListCallsQuery>,
) -> (StatusCode, Json<ApiResponse<CallListResponse>>) {
    info!(
        "API: Listing calls for room {} (offset: {}, count: {})",
        room_id, query.offset, query.count
    );

    match state
        .call_service
        .list(&room_id, query.offset, query.count)
        .await
    {
        Ok(page) => (StatusCode::OK, Json(ApiResponse::success(page.into()))),
        Err(e) => {
            error!("API: Failed to list calls: {}", e);
            (error_status(&e), Json(ApiResponse::error(e.to_string())))
        }
    }
}

/// List the configured providers
pub async fn list_providers(
    State(state): State<AppState>,
) -> Json<ApiResponse<Vec<ProviderInfo>>> {
    info!("API: Listing providers");

    Json(ApiResponse::success(state.call_service.list_providers()))
}

/// Health check endpoint
pub async fn health_check() -> Json<ApiResponse<&'static str>> {
    Json(ApiResponse::success("OK"))
}
