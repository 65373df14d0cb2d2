//! Authentication endpoint integration tests
//!
//! Exercises the auth routes end-to-end against the in-memory identity
//! provider. None of these tests need a database: the only route that
//! touches the store is sign-up, whose local write is best-effort by
//! contract.

mod common;

use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

use common::{
    body_json, get_auth, post_auth, post_json, unique_email, TestApp,
};

mod signup {
    use super::*;

    #[tokio::test]
    async fn test_signup_returns_created_user_and_message() {
        let app = TestApp::without_database();

        let response = app
            .router
            .clone()
            .oneshot(post_json(
                "/auth/signup",
                &json!({"email": "a@x.com", "password": "abcdef"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);

        let body = body_json(response).await;
        assert_eq!(body["message"], "User created successfully");
        assert!(body["user"]["id"].is_string());
        assert_eq!(body["user"]["email"], "a@x.com");
        assert!(body["user"]["created_at"].is_string());
    }

    #[tokio::test]
    async fn test_signup_succeeds_when_local_store_is_down() {
        // The pool points at nothing, so the shadow profile insert fails.
        // Identity-provider success must still yield a 201.
        let app = TestApp::without_database();

        let response = app
            .router
            .clone()
            .oneshot(post_json(
                "/auth/signup",
                &json!({"email": "resilient@x.com", "password": "abcdef"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(app.provider.user_count(), 1);

        let body = body_json(response).await;
        assert_eq!(body["user"]["email"], "resilient@x.com");
        assert_eq!(body["message"], "User created successfully");
    }

    #[tokio::test]
    async fn test_signup_duplicate_email_is_validation_error() {
        let app = TestApp::without_database();
        app.provider.register_user("taken@x.com", "abcdef", None);

        let response = app
            .router
            .clone()
            .oneshot(post_json(
                "/auth/signup",
                &json!({"email": "taken@x.com", "password": "abcdef"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("already been registered"));
    }

    #[tokio::test]
    async fn test_signup_rejects_short_password() {
        let app = TestApp::without_database();

        let response = app
            .router
            .clone()
            .oneshot(post_json(
                "/auth/signup",
                &json!({"email": "a@x.com", "password": "abc"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(app.provider.user_count(), 0);
    }

    #[tokio::test]
    async fn test_signup_sanitizes_metadata_credentials() {
        let app = TestApp::without_database();

        let response = app
            .router
            .clone()
            .oneshot(post_json(
                "/auth/signup",
                &json!({
                    "email": "a@x.com",
                    "password": "abcdef",
                    "metadata": {
                        "firstName": "Ann",
                        "password": "hunter2",
                        "nested": {"password_hash": "abc"}
                    }
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);

        let body = body_json(response).await;
        let user_metadata = &body["user"]["user_metadata"];
        assert_eq!(user_metadata["firstName"], "Ann");
        assert!(user_metadata.get("password").is_none());
        assert!(user_metadata["nested"].get("password_hash").is_none());
        assert!(body["user"].get("password").is_none());
        assert!(body["user"].get("encrypted_password").is_none());
    }
}

mod signin {
    use super::*;

    #[tokio::test]
    async fn test_signin_returns_tokens_and_sanitized_user() {
        let app = TestApp::without_database();
        app.provider.register_user("a@x.com", "abcdef", None);

        let response = app
            .router
            .clone()
            .oneshot(post_json(
                "/auth/signin",
                &json!({"email": "a@x.com", "password": "abcdef"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert!(body["access_token"].is_string());
        assert!(body["refresh_token"].is_string());
        assert_eq!(body["user"]["email"], "a@x.com");
        assert!(body["user"].get("password").is_none());
    }

    #[tokio::test]
    async fn test_signin_wrong_password_has_no_token_fields() {
        let app = TestApp::without_database();
        app.provider.register_user("a@x.com", "abcdef", None);

        let response = app
            .router
            .clone()
            .oneshot(post_json(
                "/auth/signin",
                &json!({"email": "a@x.com", "password": "wrong!"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "AUTHENTICATION_ERROR");
        assert!(body.get("access_token").is_none());
        assert!(body.get("refresh_token").is_none());
    }

    #[tokio::test]
    async fn test_signin_unknown_user_is_unauthorized() {
        let app = TestApp::without_database();

        let response = app
            .router
            .clone()
            .oneshot(post_json(
                "/auth/signin",
                &json!({"email": "nobody@x.com", "password": "abcdef"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

mod guard {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;

    #[tokio::test]
    async fn test_missing_header_and_empty_bearer_yield_same_error_kind() {
        let app = TestApp::without_database();

        let no_header = app
            .router
            .clone()
            .oneshot(common::get("/auth/me"))
            .await
            .unwrap();

        let empty_bearer = app
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/auth/me")
                    .header("authorization", "Bearer ")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(no_header.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(empty_bearer.status(), StatusCode::UNAUTHORIZED);

        let first = body_json(no_header).await;
        let second = body_json(empty_bearer).await;
        assert_eq!(first["error"]["code"], second["error"]["code"]);
    }

    #[tokio::test]
    async fn test_invalid_token_is_unauthorized() {
        let app = TestApp::without_database();

        let response = app
            .router
            .clone()
            .oneshot(get_auth("/auth/me", "mock-access-unknown"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    }
}

mod me {
    use super::*;

    #[tokio::test]
    async fn test_me_returns_sanitized_identity() {
        let app = TestApp::without_database();
        let email = unique_email();
        let session = app.signed_in_user(&email);

        let response = app
            .router
            .clone()
            .oneshot(get_auth("/auth/me", &session.access_token))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["email"], email.as_str());
        assert!(body["id"].is_string());
        assert!(body["created_at"].is_string());
        assert!(body.get("password").is_none());
        assert!(body.get("role").is_none());
    }
}

mod signout {
    use super::*;

    #[tokio::test]
    async fn test_signout_invalidates_session() {
        let app = TestApp::without_database();
        let session = app.signed_in_user("a@x.com");

        let response = app
            .router
            .clone()
            .oneshot(post_auth("/auth/signout", &session.access_token))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Signed out successfully");

        // The token no longer passes the guard
        let after = app
            .router
            .clone()
            .oneshot(get_auth("/auth/me", &session.access_token))
            .await
            .unwrap();
        assert_eq!(after.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_signout_requires_auth() {
        let app = TestApp::without_database();

        let response = app
            .router
            .clone()
            .oneshot(post_json("/auth/signout", &json!({})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

mod refresh {
    use super::*;

    #[tokio::test]
    async fn test_refresh_rotates_tokens() {
        let app = TestApp::without_database();
        let session = app.signed_in_user("a@x.com");

        let response = app
            .router
            .clone()
            .oneshot(post_json(
                "/auth/refresh",
                &json!({"refresh_token": session.refresh_token}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert!(body["access_token"].is_string());
        assert_ne!(body["access_token"], session.access_token.as_str());
        assert_ne!(body["refresh_token"], session.refresh_token.as_str());
    }

    #[tokio::test]
    async fn test_refresh_with_unknown_token_is_unauthorized() {
        let app = TestApp::without_database();

        let response = app
            .router
            .clone()
            .oneshot(post_json(
                "/auth/refresh",
                &json!({"refresh_token": "mock-refresh-unknown"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "AUTHENTICATION_ERROR");
    }
}
