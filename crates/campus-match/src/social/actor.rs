use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use super::profiles::ProfileId;

/// Header carrying the authenticated actor's profile id. Session handling
/// belongs to the external identity provider; the gateway in front of this
/// service resolves the session and forwards the bare id here.
pub const ACTOR_HEADER: &str = "x-actor-id";

/// The profile acting in the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorId(pub ProfileId);

#[axum::async_trait]
impl<S> FromRequestParts<S> for ActorId
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(ACTOR_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| ActorId(ProfileId(value.to_string())))
            .ok_or_else(|| {
                let body = Json(json!({ "error": format!("missing {ACTOR_HEADER} header") }));
                (StatusCode::UNAUTHORIZED, body).into_response()
            })
    }
}
