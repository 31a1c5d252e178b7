use axum::body::{to_bytes, Body};
use axum::Router;
use http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use availability_cell::router::availability_routes;
use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestUser};

fn test_router() -> (Router, String) {
    let config = TestConfig::default();
    let state = config.to_state();
    let user = TestUser::doctor("doctor@clinic.test");
    let auth_header = JwtTestUtils::auth_header(&user, &config.jwt_secret);
    (availability_routes(state), auth_header)
}

fn request(method: &str, uri: &str, auth: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, auth)
        .header(header::CONTENT_TYPE, "application/json");
    match body {
        Some(value) => builder.body(Body::from(value.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn response_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn monday_schedule() -> Value {
    json!({
        "doctor_id": "doc-1",
        "days": [
            { "day": "Monday", "start_time": "09:00:00", "end_time": "17:00:00" }
        ]
    })
}

#[tokio::test]
async fn adding_a_schedule_returns_created_then_ok_on_repeat() {
    let (router, auth) = test_router();

    let response = router
        .clone()
        .oneshot(request("POST", "/", &auth, Some(monday_schedule())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    assert_eq!(body["message"], "Doctor availability added successfully.");

    let response = router
        .clone()
        .oneshot(request("POST", "/", &auth, Some(monday_schedule())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["message"], "Availability is already added.");
}

#[tokio::test]
async fn get_returns_the_stored_schedule() {
    let (router, auth) = test_router();

    router
        .clone()
        .oneshot(request("POST", "/", &auth, Some(monday_schedule())))
        .await
        .unwrap();

    let response = router
        .clone()
        .oneshot(request("GET", "/?doctor_id=doc-1", &auth, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["availability"]["days"][0]["day"], "Monday");
}

#[tokio::test]
async fn resetting_an_unknown_doctor_is_not_found() {
    let (router, auth) = test_router();

    let response = router
        .clone()
        .oneshot(request("PUT", "/", &auth, Some(monday_schedule())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = response_json(response).await;
    assert_eq!(body["kind"], "not_found");
}

#[tokio::test]
async fn inverted_windows_are_rejected() {
    let (router, auth) = test_router();

    let body = json!({
        "doctor_id": "doc-1",
        "days": [
            { "day": "Monday", "start_time": "17:00:00", "end_time": "09:00:00" }
        ]
    });
    let response = router
        .clone()
        .oneshot(request("POST", "/", &auth, Some(body)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn requests_without_a_token_are_unauthorized() {
    let (router, _auth) = test_router();

    let unauthenticated = Request::builder()
        .method("GET")
        .uri("/?doctor_id=doc-1")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(unauthenticated).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
