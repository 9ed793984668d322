//! Conversation CRUD integration tests

use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

use crate::common::{authed_request, parse_body, send_turn, TestApp};

async fn create(app: &TestApp, jwt: &str, title: Option<&str>) -> serde_json::Value {
    let body = match title {
        Some(t) => json!({ "title": t }),
        None => json!({}),
    };
    let resp = app
        .router()
        .oneshot(authed_request(
            Method::POST,
            "/api/v1/conversations",
            jwt,
            Some(body),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    parse_body(resp).await
}

mod test_create_conversation {
    use super::*;

    #[tokio::test]
    async fn test_create_defaults_title() {
        let app = TestApp::new();
        let fixture = app.create_test_user().await;

        let body = create(&app, &fixture.jwt, None).await;
        assert_eq!(body["message"], "Conversation created successfully");

        let conversation = &body["data"]["conversation"];
        assert_eq!(conversation["title"], "New Conversation");
        assert_eq!(conversation["isActive"], true);
        assert_eq!(conversation["userId"], fixture.user.id.to_string());
    }

    #[tokio::test]
    async fn test_create_with_title() {
        let app = TestApp::new();
        let fixture = app.create_test_user().await;

        let body = create(&app, &fixture.jwt, Some("Trip planning")).await;
        assert_eq!(body["data"]["conversation"]["title"], "Trip planning");
    }

    #[tokio::test]
    async fn test_create_rejects_long_title() {
        let app = TestApp::new();
        let fixture = app.create_test_user().await;

        let resp = app
            .router()
            .oneshot(authed_request(
                Method::POST,
                "/api/v1/conversations",
                &fixture.jwt,
                Some(json!({ "title": "t".repeat(101) })),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(parse_body(resp).await["errors"][0]["field"], "title");
    }
}

mod test_list_conversations {
    use super::*;

    #[tokio::test]
    async fn test_list_is_scoped_to_caller() {
        let app = TestApp::new();
        let alice = app.create_test_user().await;
        let bob = app.create_test_user().await;

        create(&app, &alice.jwt, Some("a1")).await;
        create(&app, &alice.jwt, Some("a2")).await;
        create(&app, &bob.jwt, Some("b1")).await;

        let resp = app
            .router()
            .oneshot(authed_request(
                Method::GET,
                "/api/v1/conversations",
                &alice.jwt,
                None,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = parse_body(resp).await;
        assert_eq!(body["message"], "Success");
        assert_eq!(body["data"]["conversations"].as_array().unwrap().len(), 2);
        assert_eq!(body["data"]["pagination"]["total"], 2);
        assert_eq!(body["data"]["pagination"]["limit"], 20);
        assert_eq!(body["data"]["pagination"]["pages"], 1);
    }

    #[tokio::test]
    async fn test_list_orders_by_latest_activity() {
        let app = TestApp::new();
        let fixture = app.create_test_user().await;

        let first = send_turn(&app, &fixture.jwt, "older", None).await.unwrap();
        let first_id = first["data"]["conversation"].as_str().unwrap().to_string();
        let second = send_turn(&app, &fixture.jwt, "newer", None).await.unwrap();
        let second_id = second["data"]["conversation"].as_str().unwrap().to_string();

        send_turn(&app, &fixture.jwt, "bump", Some(&first_id))
            .await
            .unwrap();

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
        let body = parse_body(resp).await;
        let ids: Vec<&str> = body["data"]["conversations"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec![first_id.as_str(), second_id.as_str()]);
    }

    #[tokio::test]
    async fn test_list_paginates() {
        let app = TestApp::new();
        let fixture = app.create_test_user().await;
        for i in 0..3 {
            create(&app, &fixture.jwt, Some(&format!("c{}", i))).await;
        }

        let resp = app
            .router()
            .oneshot(authed_request(
                Method::GET,
                "/api/v1/conversations?page=2&limit=2",
                &fixture.jwt,
                None,
            ))
            .await
            .unwrap();
        let body = parse_body(resp).await;
        assert_eq!(body["data"]["conversations"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"]["pagination"]["page"], 2);
        assert_eq!(body["data"]["pagination"]["pages"], 2);
    }

    #[tokio::test]
    async fn test_list_rejects_invalid_pagination() {
        let app = TestApp::new();
        let fixture = app.create_test_user().await;

        for query in ["page=0", "limit=101", "limit=abc"] {
            let resp = app
                .router()
                .oneshot(authed_request(
                    Method::GET,
                    &format!("/api/v1/conversations?{}", query),
                    &fixture.jwt,
                    None,
                ))
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "query {}", query);
        }
    }
}

mod test_get_conversation {
    use super::*;

    #[tokio::test]
    async fn test_get_foreign_conversation_is_not_found() {
        let app = TestApp::new();
        let owner = app.create_test_user().await;
        let other = app.create_test_user().await;

        let body = create(&app, &owner.jwt, None).await;
        let id = body["data"]["conversation"]["id"].as_str().unwrap();

        let resp = app
            .router()
            .oneshot(authed_request(
                Method::GET,
                &format!("/api/v1/conversations/{}", id),
                &other.jwt,
                None,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_get_invalid_id_is_bad_request() {
        let app = TestApp::new();
        let fixture = app.create_test_user().await;

        let resp = app
            .router()
            .oneshot(authed_request(
                Method::GET,
                "/api/v1/conversations/not-a-uuid",
                &fixture.jwt,
                None,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body = parse_body(resp).await;
        assert_eq!(body["errors"][0]["message"], "Invalid conversation Id");
    }
}

mod test_update_conversation {
    use super::*;

    #[tokio::test]
    async fn test_rename_trims_title() {
        let app = TestApp::new();
        let fixture = app.create_test_user().await;
        let body = create(&app, &fixture.jwt, None).await;
        let id = body["data"]["conversation"]["id"].as_str().unwrap();

        let resp = app
            .router()
            .oneshot(authed_request(
                Method::PUT,
                &format!("/api/v1/conversations/{}", id),
                &fixture.jwt,
                Some(json!({ "title": "  Renamed  " })),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = parse_body(resp).await;
        assert_eq!(body["message"], "Conversation updated successfully");
        assert_eq!(body["data"]["conversation"]["title"], "Renamed");
    }

    #[tokio::test]
    async fn test_rename_requires_title() {
        let app = TestApp::new();
        let fixture = app.create_test_user().await;
        let body = create(&app, &fixture.jwt, None).await;
        let id = body["data"]["conversation"]["id"].as_str().unwrap();

        let resp = app
            .router()
            .oneshot(authed_request(
                Method::PUT,
                &format!("/api/v1/conversations/{}", id),
                &fixture.jwt,
                Some(json!({ "title": "" })),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_rename_unknown_conversation_is_not_found() {
        let app = TestApp::new();
        let fixture = app.create_test_user().await;

        let resp = app
            .router()
            .oneshot(authed_request(
                Method::PUT,
                &format!("/api/v1/conversations/{}", Uuid::new_v4()),
                &fixture.jwt,
                Some(json!({ "title": "x" })),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}

mod test_delete_conversation {
    use super::*;

    #[tokio::test]
    async fn test_delete_hides_conversation_and_is_idempotent() {
        let app = TestApp::new();
        let fixture = app.create_test_user().await;
        let body = create(&app, &fixture.jwt, None).await;
        let id = body["data"]["conversation"]["id"].as_str().unwrap().to_string();
        let uri = format!("/api/v1/conversations/{}", id);

        for _ in 0..2 {
            let resp = app
                .router()
                .oneshot(authed_request(Method::DELETE, &uri, &fixture.jwt, None))
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::OK);

            let body = parse_body(resp).await;
            assert_eq!(body["message"], "Conversation deleted successfully");
            assert!(body["data"].is_null());
        }

        let resp = app
            .router()
            .oneshot(authed_request(Method::GET, &uri, &fixture.jwt, None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let body = send_turn(&app, &fixture.jwt, "still there?", Some(&id))
            .await
            .unwrap();
        assert_eq!(body["message"], "Conversation not found");
    }

    #[tokio::test]
    async fn test_delete_foreign_conversation_is_not_found() {
        let app = TestApp::new();
        let owner = app.create_test_user().await;
        let other = app.create_test_user().await;
        let body = create(&app, &owner.jwt, None).await;
        let id = body["data"]["conversation"]["id"].as_str().unwrap();

        let resp = app
            .router()
            .oneshot(authed_request(
                Method::DELETE,
                &format!("/api/v1/conversations/{}", id),
                &other.jwt,
                None,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
