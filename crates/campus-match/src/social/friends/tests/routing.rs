use std::sync::Arc;

use axum::http::{header, Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use super::common::*;
use crate::social::actor::ACTOR_HEADER;
use crate::social::friends::router::friend_router;

fn json_post(uri: &str, actor: &str, body: serde_json::Value) -> Request<axum::body::Body> {
    Request::post(uri)
        .header(ACTOR_HEADER, actor)
        .header(header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

#[tokio::test]
async fn requests_without_actor_header_are_unauthorized() {
    let (service, _, _) = build_service();
    let router = friend_router(Arc::new(service));

    let response = router
        .oneshot(
            Request::get("/api/v1/discover")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn send_route_creates_a_pending_request() {
    let (service, _, _) = build_service();
    let router = friend_router(Arc::new(service));

    let response = router
        .oneshot(json_post(
            "/api/v1/friends/requests",
            "ava",
            json!({ "to_user": "ben", "note": "Intro to Rust study group?" }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["status"], json!("pending"));
    assert_eq!(payload["from_user"], json!("ava"));
    assert_eq!(payload["to_user"], json!("ben"));
}

#[tokio::test]
async fn mirrored_request_is_unprocessable() {
    let (service, _, _) = build_service();
    service
        .send_request(&profile_id("ava"), &profile_id("ben"), None)
        .expect("sends");
    let router = friend_router(Arc::new(service));

    let response = router
        .oneshot(json_post(
            "/api/v1/friends/requests",
            "ben",
            json!({ "to_user": "ava" }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn accept_by_non_recipient_is_forbidden() {
    let (service, _, _) = build_service();
    let request = service
        .send_request(&profile_id("ava"), &profile_id("ben"), None)
        .expect("sends");
    let router = friend_router(Arc::new(service));

    let response = router
        .oneshot(json_post(
            &format!("/api/v1/friends/requests/{}/accept", request.id),
            "cleo",
            json!({}),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn second_accept_conflicts_without_a_second_edge() {
    let (service, repository, _) = build_service();
    let request = service
        .send_request(&profile_id("ava"), &profile_id("ben"), None)
        .expect("sends");
    service
        .accept_request(&profile_id("ben"), &request.id)
        .expect("first accept");
    let router = friend_router(Arc::new(service));

    let response = router
        .oneshot(json_post(
            &format!("/api/v1/friends/requests/{}/accept", request.id),
            "ben",
            json!({}),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(repository.friendship_rows().len(), 1);
}

#[tokio::test]
async fn unknown_request_maps_to_not_found() {
    let (service, _, _) = build_service();
    let router = friend_router(Arc::new(service));

    let response = router
        .oneshot(json_post(
            "/api/v1/friends/requests/req-999999/cancel",
            "ava",
            json!({}),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn discover_route_returns_annotated_candidates() {
    let (service, _, _) = build_service();
    service
        .send_request(&profile_id("ava"), &profile_id("cleo"), None)
        .expect("sends");
    let router = friend_router(Arc::new(service));

    let response = router
        .oneshot(
            Request::get("/api/v1/discover")
                .header(ACTOR_HEADER, "ava")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let feed = payload.as_array().expect("array payload");
    assert_eq!(feed.len(), 2);
    for entry in feed {
        assert!(entry["score"].as_u64().unwrap() <= 100);
        assert!(entry["reasons"].is_array());
    }
    let cleo = feed
        .iter()
        .find(|entry| entry["profile"]["id"] == json!("cleo"))
        .expect("cleo listed");
    assert_eq!(cleo["relationship"], json!("request_sent"));
}

#[tokio::test]
async fn friends_route_lists_cards_after_acceptance() {
    let (service, _, _) = build_service();
    let request = service
        .send_request(&profile_id("ava"), &profile_id("ben"), None)
        .expect("sends");
    service
        .accept_request(&profile_id("ben"), &request.id)
        .expect("accepts");
    let router = friend_router(Arc::new(service));

    let response = router
        .oneshot(
            Request::get("/api/v1/friends")
                .header(ACTOR_HEADER, "ava")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let friends = payload.as_array().expect("array payload");
    assert_eq!(friends.len(), 1);
    assert_eq!(friends[0]["full_name"], json!("Ben Brooks"));
}
