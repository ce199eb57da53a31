//! Integration tests for registration, sign-in, and token lifecycle.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use helpers::{PASSWORD, TestApp};

#[tokio::test]
async fn test_register_and_me() {
    let app = TestApp::new();
    let session = app.register("Ada@Example.com").await;
    assert_eq!(session.email, "ada@example.com");

    let res = app.get("/api/auth/me", Some(&session.access_token)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["email"], "ada@example.com");
    assert_eq!(res.data()["role"], "member");
    assert!(res.data()["impersonated_by"].is_null());
    assert!(res.data().get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_duplicate_email_conflicts() {
    let app = TestApp::new();
    app.register("ada@example.com").await;

    let res = app
        .request(
            "POST",
            "/api/auth/register",
            Some(json!({
                "email": "ADA@example.com",
                "password": PASSWORD,
                "confirm_password": PASSWORD,
            })),
            None,
        )
        .await;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(res.body["error"], "CONFLICT");
}

#[tokio::test]
async fn test_register_validation_details() {
    let app = TestApp::new();

    let res = app
        .request(
            "POST",
            "/api/auth/register",
            Some(json!({
                "email": "not-an-email",
                "password": PASSWORD,
                "confirm_password": PASSWORD,
            })),
            None,
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"], "VALIDATION");
    assert!(res.body["details"]["email"].is_array());

    let res = app
        .request(
            "POST",
            "/api/auth/register",
            Some(json!({
                "email": "ada@example.com",
                "password": PASSWORD,
                "confirm_password": "something-else",
            })),
            None,
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["details"]["confirm_password"][0], "Passwords don't match");
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let app = TestApp::new();
    app.register("ada@example.com").await;

    let res = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "email": "ada@example.com", "password": "wrong-password" })),
            None,
        )
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body["message"], "Invalid email or password");

    let res = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "email": "nobody@example.com", "password": PASSWORD })),
            None,
        )
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body["message"], "Invalid email or password");
}

#[tokio::test]
async fn test_missing_or_garbage_token_is_unauthorized() {
    let app = TestApp::new();

    let res = app.get("/api/auth/me", None).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = app.get("/api/gists", Some("not-a-jwt")).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body["error"], "AUTHENTICATION");
}

#[tokio::test]
async fn test_refresh_rotates_tokens() {
    let app = TestApp::new();
    let session = app.register("ada@example.com").await;

    let body = json!({ "refresh_token": session.refresh_token });
    let res = app
        .request("POST", "/api/auth/refresh", Some(body.clone()), None)
        .await;
    assert_eq!(res.status, StatusCode::OK);
    let new_access = res.data()["access_token"].as_str().unwrap().to_string();

    let res = app.get("/api/auth/me", Some(&new_access)).await;
    assert_eq!(res.status, StatusCode::OK);

    // The old refresh token is single-use.
    let res = app.request("POST", "/api/auth/refresh", Some(body), None).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    // An access token is not a refresh token.
    let res = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(json!({ "refresh_token": new_access })),
            None,
        )
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_revokes_tokens() {
    let app = TestApp::new();
    let session = app.register("ada@example.com").await;

    let res = app
        .request(
            "POST",
            "/api/auth/logout",
            Some(json!({ "refresh_token": session.refresh_token })),
            Some(&session.access_token),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);

    let res = app.get("/api/auth/me", Some(&session.access_token)).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(json!({ "refresh_token": session.refresh_token })),
            None,
        )
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_without_body() {
    let app = TestApp::new();
    let session = app.register("ada@example.com").await;

    let res = app
        .request("POST", "/api/auth/logout", None, Some(&session.access_token))
        .await;
    assert_eq!(res.status, StatusCode::OK);

    let res = app.get("/api/auth/me", Some(&session.access_token)).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_profile_update_and_password_change() {
    let app = TestApp::new();
    let session = app.register("ada@example.com").await;
    let token = session.access_token.as_str();

    let res = app
        .request("PUT", "/api/users/me", Some(json!({ "name": "A" })), Some(token))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["details"]["name"][0], "Name must be at least 2 characters");

    let res = app
        .request("PUT", "/api/users/me", Some(json!({ "name": "Ada" })), Some(token))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["name"], "Ada");

    let res = app
        .request(
            "PUT",
            "/api/users/me/password",
            Some(json!({
                "current_password": "wrong-password",
                "new_password": "new-password-1",
                "confirm_password": "new-password-1",
            })),
            Some(token),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body["details"]["current_password"].is_array());

    let res = app
        .request(
            "PUT",
            "/api/users/me/password",
            Some(json!({
                "current_password": PASSWORD,
                "new_password": "new-password-1",
                "confirm_password": "new-password-1",
            })),
            Some(token),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);

    let res = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "email": "ada@example.com", "password": "new-password-1" })),
            None,
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
}
