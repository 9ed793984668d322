//! Message listing and clearing integration tests

use axum::http::{Method, StatusCode};
use tower::ServiceExt;

use crate::common::{authed_request, parse_body, send_turn, TestApp};

#[tokio::test]
async fn test_messages_listed_oldest_first_with_pagination() {
    let app = TestApp::new();
    let fixture = app.create_test_user().await;

    let body = send_turn(&app, &fixture.jwt, "one", None).await.unwrap();
    let id = body["data"]["conversation"].as_str().unwrap().to_string();
    send_turn(&app, &fixture.jwt, "two", Some(&id)).await.unwrap();

    let resp = app
        .router()
        .oneshot(authed_request(
            Method::GET,
            &format!("/api/v1/conversations/{}/messages?limit=3", id),
            &fixture.jwt,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body = parse_body(resp).await;
    let contents: Vec<&str> = body["data"]["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["content"].as_str().unwrap())
        .collect();
    assert_eq!(contents, vec!["one", "Echo: one", "two"]);
    assert_eq!(body["data"]["pagination"]["total"], 4);
    assert_eq!(body["data"]["pagination"]["pages"], 2);
    assert_eq!(body["data"]["messages"][1]["conversationId"], id);
}

#[tokio::test]
async fn test_foreign_messages_are_not_found() {
    let app = TestApp::new();
    let owner = app.create_test_user().await;
    let other = app.create_test_user().await;

    let body = send_turn(&app, &owner.jwt, "secret", None).await.unwrap();
    let id = body["data"]["conversation"].as_str().unwrap();

    let resp = app
        .router()
        .oneshot(authed_request(
            Method::GET,
            &format!("/api/v1/conversations/{}/messages", id),
            &other.jwt,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_clear_removes_messages_and_keeps_conversation() {
    let app = TestApp::new();
    let fixture = app.create_test_user().await;

    let body = send_turn(&app, &fixture.jwt, "forget me", None).await.unwrap();
    let id = body["data"]["conversation"].as_str().unwrap().to_string();
    let uri = format!("/api/v1/conversations/{}/messages", id);

    let resp = app
        .router()
        .oneshot(authed_request(Method::DELETE, &uri, &fixture.jwt, None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        parse_body(resp).await["message"],
        "Conversation cleared successfully"
    );

    let resp = app
        .router()
        .oneshot(authed_request(Method::GET, &uri, &fixture.jwt, None))
        .await
        .unwrap();
    let body = parse_body(resp).await;
    assert!(body["data"]["messages"].as_array().unwrap().is_empty());

    let resp = app
        .router()
        .oneshot(authed_request(
            Method::GET,
            &format!("/api/v1/conversations/{}", id),
            &fixture.jwt,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // The next turn starts from an empty history
    send_turn(&app, &fixture.jwt, "fresh", Some(&id)).await.unwrap();
    let last = app.llm.histories().pop().unwrap();
    assert_eq!(last.len(), 1);
    assert_eq!(last[0].content, "fresh");
}
