//! API Router configuration

use super::call_handler::{
    add_call_user, cancel_call, create_call, end_livechat_call, get_call, health_check,
    join_call, list_providers, list_room_calls, set_call_ended_at, set_call_ended_by,
    set_call_provider_data, set_call_status, start_call, AppState,
};
use super::metrics_handler::metrics_handler;
use axum::{
    routing::{get, post, put},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the API router
pub fn build_router(state: AppState, prometheus_handle: PrometheusHandle) -> Router {
    // Health check route
    let health_routes = Router::new().route("/health", get(health_check));

    // Call lifecycle routes
    let call_routes = Router::new()
        .route("/calls", post(create_call))
        .route("/calls/start", post(start_call))
        .route("/calls/:id", get(get_call))
        .route("/calls/:id/join", post(join_call))
        .route("/calls/:id/cancel", post(cancel_call))
        .route("/calls/:id/end-livechat", post(end_livechat_call))
        .route("/calls/:id/status", put(set_call_status))
        .route("/calls/:id/ended-by/:user_id", put(set_call_ended_by))
        .route("/calls/:id/ended-at", put(set_call_ended_at))
        .route("/calls/:id/provider-data", put(set_call_provider_data))
        .route("/calls/:id/users", post(add_call_user))
        .route("/rooms/:room_id/calls", get(list_room_calls));

    // Provider routes
    let provider_routes = Router::new().route("/providers", get(list_providers));

    // Metrics route (separate state)
    let metrics_routes = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(prometheus_handle);

    // Combine routes with state
    Router::new()
        .merge(health_routes)
        .merge(call_routes)
        .merge(provider_routes)
        .with_state(state)
        .merge(metrics_routes)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
