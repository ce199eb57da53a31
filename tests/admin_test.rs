//! Integration tests for the admin surface.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use helpers::TestApp;

#[tokio::test]
async fn test_member_cannot_use_admin_routes() {
    let app = TestApp::new();
    let bob = app.register("bob@example.com").await;
    let token = Some(bob.access_token.as_str());

    let res = app.get("/api/admin/users", token).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.body["error"], "AUTHORIZATION");

    let res = app.get("/api/admin/gists", token).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let res = app
        .request(
            "PUT",
            &format!("/api/admin/users/{}/role", bob.user_id),
            Some(json!({ "role": "admin" })),
            token,
        )
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let res = app.get("/api/admin/users", None).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_lists_users_by_email() {
    let app = TestApp::new();
    app.register("carol@example.com").await;
    app.register("bob@example.com").await;
    let admin = app.admin("alice@example.com").await;

    let res = app.get("/api/admin/users", Some(&admin.access_token)).await;
    assert_eq!(res.status, StatusCode::OK);
    let emails: Vec<&str> = res
        .data()
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["email"].as_str().unwrap())
        .collect();
    assert_eq!(
        emails,
        vec!["alice@example.com", "bob@example.com", "carol@example.com"]
    );
}

#[tokio::test]
async fn test_admin_role_changes() {
    let app = TestApp::new();
    let admin = app.admin("alice@example.com").await;
    let bob = app.register("bob@example.com").await;
    let token = Some(admin.access_token.as_str());

    let res = app
        .request(
            "PUT",
            &format!("/api/admin/users/{}/role", admin.user_id),
            Some(json!({ "role": "member" })),
            token,
        )
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.body["message"], "Cannot modify your own role");

    let res = app
        .request(
            "PUT",
            &format!("/api/admin/users/{}/role", bob.user_id),
            Some(json!({ "role": "admin" })),
            token,
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["role"], "admin");

    let res = app
        .request(
            "PUT",
            &format!("/api/admin/users/{}/role", bob.user_id),
            Some(json!({ "role": "owner" })),
            token,
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app
        .request(
            "PUT",
            &format!("/api/admin/users/{}/role", uuid::Uuid::new_v4()),
            Some(json!({ "role": "admin" })),
            token,
        )
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_browses_all_gists() {
    let app = TestApp::new();
    let admin = app.admin("alice@example.com").await;
    let bob = app.register("bob@example.com").await;
    for i in 0..12 {
        app.create_gist(&bob.access_token, &format!("Gist {i}"), "x", "go", i % 2 == 0)
            .await;
    }
    app.create_gist(&admin.access_token, "Admin notes", "y", "sql", false)
        .await;
    let token = Some(admin.access_token.as_str());

    let res = app.get("/api/admin/gists", token).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["total_items"], 13);
    assert_eq!(res.data()["items"].as_array().unwrap().len(), 10);

    let res = app
        .get(&format!("/api/admin/gists?user_id={}", bob.user_id), token)
        .await;
    assert_eq!(res.data()["total_items"], 12);

    let res = app.get("/api/admin/gists?search=admin", token).await;
    assert_eq!(res.data()["total_items"], 1);
}

#[tokio::test]
async fn test_impersonation() {
    let app = TestApp::new();
    let admin = app.admin("alice@example.com").await;
    let bob = app.register("bob@example.com").await;
    let bob_gist = app
        .create_gist(&bob.access_token, "Bob's", "x", "go", false)
        .await;

    let res = app
        .request(
            "POST",
            &format!("/api/admin/users/{}/impersonate", admin.user_id),
            None,
            Some(&admin.access_token),
        )
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.body["message"], "Cannot impersonate yourself");

    let res = app
        .request(
            "POST",
            &format!("/api/admin/users/{}/impersonate", bob.user_id),
            None,
            Some(&admin.access_token),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    let token = res.data()["access_token"].as_str().unwrap().to_string();
    assert_eq!(res.data()["user"]["email"], "bob@example.com");

    let res = app.get("/api/auth/me", Some(&token)).await;
    assert_eq!(res.data()["email"], "bob@example.com");
    assert_eq!(res.data()["impersonated_by"], admin.user_id.to_string());

    let res = app
        .get(&format!("/api/gists/{bob_gist}/details"), Some(&token))
        .await;
    assert_eq!(res.status, StatusCode::OK);

    // The impersonated session has the target's role, not the admin's.
    let res = app.get("/api/admin/users", Some(&token)).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_gists_with_huge_page_is_empty() {
    let app = TestApp::new();
    let admin = app.admin("alice@example.com").await;
    app.create_gist(&admin.access_token, "Notes", "y", "sql", false)
        .await;

    let res = app
        .get(
            "/api/admin/gists?page=18446744073709551615",
            Some(admin.access_token.as_str()),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.data()["items"].as_array().unwrap().is_empty());
    assert_eq!(res.data()["total_items"], 1);
}

#[tokio::test]
async fn test_demoted_admin_token_stops_working() {
    let app = TestApp::new();
    let alice = app.admin("alice@example.com").await;
    let bob = app.admin("bob@example.com").await;
    let bob_token = Some(bob.access_token.as_str());

    let res = app.get("/api/admin/users", bob_token).await;
    assert_eq!(res.status, StatusCode::OK);

    let res = app
        .request(
            "PUT",
            &format!("/api/admin/users/{}/role", bob.user_id),
            Some(json!({ "role": "member" })),
            Some(alice.access_token.as_str()),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);

    let res = app.get("/api/admin/users", bob_token).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    let res = app.get("/api/admin/gists", bob_token).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
}
