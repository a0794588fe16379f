use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
    Router,
};
use serde_json::json;

use super::domain::{ProfileDraft, ProfileId};
use super::repository::ProfileRepository;
use super::service::{ProfileError, ProfileService};
use crate::social::actor::ActorId;
use crate::social::storage::RepositoryError;

/// Router builder exposing HTTP endpoints for viewing and editing profiles.
pub fn profile_router<P>(service: Arc<ProfileService<P>>) -> Router
where
    P: ProfileRepository + 'static,
{
    Router::new()
        .route("/api/v1/profile", put(upsert_handler::<P>))
        .route("/api/v1/profiles/:profile_id", get(fetch_handler::<P>))
        .with_state(service)
}

pub(crate) async fn upsert_handler<P>(
    State(service): State<Arc<ProfileService<P>>>,
    ActorId(actor): ActorId,
    axum::Json(draft): axum::Json<ProfileDraft>,
) -> Response
where
    P: ProfileRepository + 'static,
{
    match service.upsert(&actor, draft) {
        Ok(profile) => (StatusCode::OK, axum::Json(profile)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn fetch_handler<P>(
    State(service): State<Arc<ProfileService<P>>>,
    ActorId(_actor): ActorId,
    Path(profile_id): Path<String>,
) -> Response
where
    P: ProfileRepository + 'static,
{
    match service.fetch(&ProfileId(profile_id)) {
        Ok(profile) => (StatusCode::OK, axum::Json(profile)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: ProfileError) -> Response {
    let status = match &error {
        ProfileError::EmptyName | ProfileError::BioTooLong { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ProfileError::UnknownProfile(_) => StatusCode::NOT_FOUND,
        ProfileError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        ProfileError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        ProfileError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let body = axum::Json(json!({ "error": error.to_string() }));
    (status, body).into_response()
}
