//! Authentication integration tests

use axum::http::{header, Method, Request, StatusCode};
use axum::body::Body;
use tower::ServiceExt;
use uuid::Uuid;

use crate::common::{
    anonymous_request, authed_request, create_test_jwt, parse_body, TestApp, TEST_JWT_SECRET,
};

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let app = TestApp::new();

    let resp = app
        .router()
        .oneshot(anonymous_request(Method::GET, "/api/v1/conversations", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body = parse_body(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Not authorized to access this route");
}

#[tokio::test]
async fn test_token_signed_with_other_secret_is_rejected() {
    let app = TestApp::new();
    let fixture = app.create_test_user().await;
    let forged = create_test_jwt(fixture.user.id, "some-other-secret");

    let resp = app
        .router()
        .oneshot(authed_request(
            Method::GET,
            "/api/v1/conversations",
            &forged,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(parse_body(resp).await["message"], "Invalid or expired token");
}

#[tokio::test]
async fn test_unknown_user_is_rejected() {
    let app = TestApp::new();
    let jwt = create_test_jwt(Uuid::new_v4(), TEST_JWT_SECRET);

    let resp = app
        .router()
        .oneshot(authed_request(Method::GET, "/api/v1/conversations", &jwt, None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(parse_body(resp).await["message"], "User not found");
}

#[tokio::test]
async fn test_deactivated_user_is_rejected() {
    let app = TestApp::new();
    let fixture = app.create_test_user().await;
    assert!(app.accounts.set_active(fixture.user.id, false).await);

    let resp = app
        .router()
        .oneshot(authed_request(
            Method::GET,
            "/api/v1/conversations",
            &fixture.jwt,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        parse_body(resp).await["message"],
        "User account is deactivated"
    );
}

#[tokio::test]
async fn test_token_cookie_is_accepted() {
    let app = TestApp::new();
    let fixture = app.create_test_user().await;

    let req = Request::builder()
        .method(Method::GET)
        .uri("/api/v1/conversations")
        .header(header::COOKIE, format!("theme=dark; token={}", fixture.jwt))
        .body(Body::empty())
        .unwrap();

    let resp = app.router().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = TestApp::new();

    let resp = app
        .router()
        .oneshot(anonymous_request(Method::GET, "/api/v2/anything", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(parse_body(resp).await["message"], "Route not found");
}
