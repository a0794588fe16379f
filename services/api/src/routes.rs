use std::sync::Arc;

use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;

use campus_match::social::conversations::{
    conversation_router, ConversationRepository, MessagePublisher, MessagingService,
};
use campus_match::social::friends::{friend_router, FriendGraphService, FriendRepository};
use campus_match::social::profiles::{profile_router, ProfileRepository, ProfileService};

use crate::infra::AppState;

/// Assemble the full API surface: the per-concern domain routers plus the
/// operational endpoints.
pub(crate) fn api_router<R, P, C, B>(
    friends: Arc<FriendGraphService<R, P>>,
    profiles: Arc<ProfileService<P>>,
    messaging: Arc<MessagingService<C, P, B>>,
) -> axum::Router
where
    R: FriendRepository + 'static,
    P: ProfileRepository + 'static,
    C: ConversationRepository + 'static,
    B: MessagePublisher + 'static,
{
    friend_router(friends)
        .merge(profile_router(profiles))
        .merge(conversation_router(messaging))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
