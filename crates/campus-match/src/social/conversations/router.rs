use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::ConversationId;
use super::events::MessagePublisher;
use super::repository::ConversationRepository;
use super::service::{MessagingError, MessagingService};
use crate::social::actor::ActorId;
use crate::social::profiles::{ProfileId, ProfileRepository};
use crate::social::storage::RepositoryError;

/// Router builder exposing conversations and messages.
pub fn conversation_router<C, P, B>(service: Arc<MessagingService<C, P, B>>) -> Router
where
    C: ConversationRepository + 'static,
    P: ProfileRepository + 'static,
    B: MessagePublisher + 'static,
{
    Router::new()
        .route("/api/v1/conversations", get(list_handler::<C, P, B>))
        .route(
            "/api/v1/conversations/direct",
            post(open_direct_handler::<C, P, B>),
        )
        .route(
            "/api/v1/conversations/group",
            post(create_group_handler::<C, P, B>),
        )
        .route(
            "/api/v1/conversations/:conversation_id/messages",
            get(messages_handler::<C, P, B>).post(send_handler::<C, P, B>),
        )
        .route(
            "/api/v1/conversations/:conversation_id/read",
            post(mark_read_handler::<C, P, B>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenDirectBody {
    other_user: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateGroupBody {
    #[serde(default)]
    name: Option<String>,
    member_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SendMessageBody {
    content: String,
}

pub(crate) async fn list_handler<C, P, B>(
    State(service): State<Arc<MessagingService<C, P, B>>>,
    ActorId(actor): ActorId,
) -> Response
where
    C: ConversationRepository + 'static,
    P: ProfileRepository + 'static,
    B: MessagePublisher + 'static,
{
    match service.conversation_list(&actor) {
        Ok(summaries) => (StatusCode::OK, axum::Json(summaries)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn open_direct_handler<C, P, B>(
    State(service): State<Arc<MessagingService<C, P, B>>>,
    ActorId(actor): ActorId,
    axum::Json(body): axum::Json<OpenDirectBody>,
) -> Response
where
    C: ConversationRepository + 'static,
    P: ProfileRepository + 'static,
    B: MessagePublisher + 'static,
{
    match service.open_direct(&actor, &ProfileId(body.other_user)) {
        Ok(conversation) => (StatusCode::OK, axum::Json(conversation)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_group_handler<C, P, B>(
    State(service): State<Arc<MessagingService<C, P, B>>>,
    ActorId(actor): ActorId,
    axum::Json(body): axum::Json<CreateGroupBody>,
) -> Response
where
    C: ConversationRepository + 'static,
    P: ProfileRepository + 'static,
    B: MessagePublisher + 'static,
{
    let members = body.member_ids.into_iter().map(ProfileId).collect();
    match service.create_group(&actor, body.name, members) {
        Ok(conversation) => (StatusCode::CREATED, axum::Json(conversation)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn messages_handler<C, P, B>(
    State(service): State<Arc<MessagingService<C, P, B>>>,
    ActorId(actor): ActorId,
    Path(conversation_id): Path<String>,
) -> Response
where
    C: ConversationRepository + 'static,
    P: ProfileRepository + 'static,
    B: MessagePublisher + 'static,
{
    match service.messages(&actor, &ConversationId(conversation_id)) {
        Ok(messages) => (StatusCode::OK, axum::Json(messages)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn send_handler<C, P, B>(
    State(service): State<Arc<MessagingService<C, P, B>>>,
    ActorId(actor): ActorId,
    Path(conversation_id): Path<String>,
    axum::Json(body): axum::Json<SendMessageBody>,
) -> Response
where
    C: ConversationRepository + 'static,
    P: ProfileRepository + 'static,
    B: MessagePublisher + 'static,
{
    match service.send_message(&actor, &ConversationId(conversation_id), &body.content) {
        Ok(message) => (StatusCode::CREATED, axum::Json(message)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn mark_read_handler<C, P, B>(
    State(service): State<Arc<MessagingService<C, P, B>>>,
    ActorId(actor): ActorId,
    Path(conversation_id): Path<String>,
) -> Response
where
    C: ConversationRepository + 'static,
    P: ProfileRepository + 'static,
    B: MessagePublisher + 'static,
{
    match service.mark_read(&actor, &ConversationId(conversation_id)) {
        Ok(marked) => (StatusCode::OK, axum::Json(json!({ "marked": marked }))).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: MessagingError) -> Response {
    let status = match &error {
        MessagingError::SelfConversation
        | MessagingError::GroupTooSmall { .. }
        | MessagingError::InvalidContent => StatusCode::UNPROCESSABLE_ENTITY,
        MessagingError::UnknownProfile(_) | MessagingError::UnknownConversation(_) => {
            StatusCode::NOT_FOUND
        }
        MessagingError::NotParticipant(_) => StatusCode::FORBIDDEN,
        MessagingError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        MessagingError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        MessagingError::Repository(RepositoryError::Unavailable(_))
        | MessagingError::Publish(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let body = axum::Json(json!({ "error": error.to_string() }));
    (status, body).into_response()
}
