use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::RequestId;
use super::repository::FriendRepository;
use super::service::{FriendGraphError, FriendGraphService};
use crate::social::actor::ActorId;
use crate::social::matching::DiscoverFilter;
use crate::social::profiles::{ClassYear, Profile, ProfileId, ProfileRepository};
use crate::social::storage::RepositoryError;

/// Router builder exposing discovery and the friend-request lifecycle.
pub fn friend_router<R, P>(service: Arc<FriendGraphService<R, P>>) -> Router
where
    R: FriendRepository + 'static,
    P: ProfileRepository + 'static,
{
    Router::new()
        .route("/api/v1/discover", get(discover_handler::<R, P>))
        .route("/api/v1/friends", get(friends_handler::<R, P>))
        .route(
            "/api/v1/friends/requests",
            post(send_handler::<R, P>).get(pending_handler::<R, P>),
        )
        .route(
            "/api/v1/friends/requests/:request_id/accept",
            post(accept_handler::<R, P>),
        )
        .route(
            "/api/v1/friends/requests/:request_id/decline",
            post(decline_handler::<R, P>),
        )
        .route(
            "/api/v1/friends/requests/:request_id/cancel",
            post(cancel_handler::<R, P>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct DiscoverQuery {
    year: Option<String>,
    interests: Option<String>,
}

impl DiscoverQuery {
    fn into_filter(self) -> DiscoverFilter {
        DiscoverFilter {
            year: self.year.as_deref().and_then(ClassYear::parse),
            interests: self
                .interests
                .map(|raw| {
                    raw.split(',')
                        .map(str::trim)
                        .filter(|tag| !tag.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SendRequestBody {
    to_user: String,
    #[serde(default)]
    note: Option<String>,
}

pub(crate) async fn discover_handler<R, P>(
    State(service): State<Arc<FriendGraphService<R, P>>>,
    ActorId(actor): ActorId,
    Query(query): Query<DiscoverQuery>,
) -> Response
where
    R: FriendRepository + 'static,
    P: ProfileRepository + 'static,
{
    match service.discover(&actor, &query.into_filter()) {
        Ok(candidates) => (StatusCode::OK, axum::Json(candidates)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn friends_handler<R, P>(
    State(service): State<Arc<FriendGraphService<R, P>>>,
    ActorId(actor): ActorId,
) -> Response
where
    R: FriendRepository + 'static,
    P: ProfileRepository + 'static,
{
    match service.friends(&actor) {
        Ok(friends) => {
            let cards: Vec<_> = friends.iter().map(Profile::card).collect();
            (StatusCode::OK, axum::Json(cards)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn send_handler<R, P>(
    State(service): State<Arc<FriendGraphService<R, P>>>,
    ActorId(actor): ActorId,
    axum::Json(body): axum::Json<SendRequestBody>,
) -> Response
where
    R: FriendRepository + 'static,
    P: ProfileRepository + 'static,
{
    match service.send_request(&actor, &ProfileId(body.to_user), body.note) {
        Ok(request) => (StatusCode::CREATED, axum::Json(request)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn pending_handler<R, P>(
    State(service): State<Arc<FriendGraphService<R, P>>>,
    ActorId(actor): ActorId,
) -> Response
where
    R: FriendRepository + 'static,
    P: ProfileRepository + 'static,
{
    match service.pending_overview(&actor) {
        Ok(overview) => (StatusCode::OK, axum::Json(overview)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn accept_handler<R, P>(
    State(service): State<Arc<FriendGraphService<R, P>>>,
    ActorId(actor): ActorId,
    Path(request_id): Path<String>,
) -> Response
where
    R: FriendRepository + 'static,
    P: ProfileRepository + 'static,
{
    match service.accept_request(&actor, &RequestId(request_id)) {
        Ok(friendship) => (StatusCode::OK, axum::Json(friendship)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn decline_handler<R, P>(
    State(service): State<Arc<FriendGraphService<R, P>>>,
    ActorId(actor): ActorId,
    Path(request_id): Path<String>,
) -> Response
where
    R: FriendRepository + 'static,
    P: ProfileRepository + 'static,
{
    match service.decline_request(&actor, &RequestId(request_id)) {
        Ok(request) => (StatusCode::OK, axum::Json(request)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn cancel_handler<R, P>(
    State(service): State<Arc<FriendGraphService<R, P>>>,
    ActorId(actor): ActorId,
    Path(request_id): Path<String>,
) -> Response
where
    R: FriendRepository + 'static,
    P: ProfileRepository + 'static,
{
    match service.cancel_request(&actor, &RequestId(request_id)) {
        Ok(request) => (StatusCode::OK, axum::Json(request)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: FriendGraphError) -> Response {
    let status = match &error {
        FriendGraphError::SelfRequest
        | FriendGraphError::NoteTooLong
        | FriendGraphError::AlreadyFriends(_)
        | FriendGraphError::AlreadyPending(_)
        | FriendGraphError::CounterpartPending(_) => StatusCode::UNPROCESSABLE_ENTITY,
        FriendGraphError::UnknownProfile(_) | FriendGraphError::UnknownRequest(_) => {
            StatusCode::NOT_FOUND
        }
        FriendGraphError::NotRecipient | FriendGraphError::NotSender => StatusCode::FORBIDDEN,
        FriendGraphError::AlreadyResolved { .. } => StatusCode::CONFLICT,
        FriendGraphError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        FriendGraphError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        FriendGraphError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let body = axum::Json(json!({ "error": error.to_string() }));
    (status, body).into_response()
}
