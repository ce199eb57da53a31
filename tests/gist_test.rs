//! Integration tests for owner gist operations: CRUD, versions, favorites, forks.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use helpers::{TestApp, id_of};

#[tokio::test]
async fn test_update_appends_version() {
    let app = TestApp::new();
    let ada = app.register("ada@example.com").await;
    let token = ada.access_token.as_str();

    let id = app.create_gist(token, "T", "X", "python", false).await;

    let res = app
        .request(
            "PUT",
            &format!("/api/gists/{id}"),
            Some(json!({ "title": "T", "body": "Y", "language": "python", "is_public": false })),
            Some(token),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    let versions = res.data()["versions"].as_array().unwrap();
    assert_eq!(versions.len(), 2);
    assert_eq!(versions[0]["version"], 2);
    assert_eq!(versions[0]["body"], "Y");

    let res = app.get(&format!("/api/gists/{id}/versions"), Some(token)).await;
    assert_eq!(res.status, StatusCode::OK);
    let numbers: Vec<i64> = res
        .data()
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["version"].as_i64().unwrap())
        .collect();
    assert_eq!(numbers, vec![2, 1]);

    let res = app.get(&format!("/api/gists/{id}/versions/1"), Some(token)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["body"], "X");

    let res = app.get(&format!("/api/gists/{id}/versions/9"), Some(token)).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body["message"], "Version not found");
}

#[tokio::test]
async fn test_stranger_cannot_see_or_modify_private_gist() {
    let app = TestApp::new();
    let ada = app.register("ada@example.com").await;
    let bob = app.register("bob@example.com").await;
    let id = app
        .create_gist(&ada.access_token, "Secret", "x = 1", "python", false)
        .await;

    let missing = uuid::Uuid::new_v4();
    let absent = app
        .get(&format!("/api/gists/{missing}/details"), Some(&bob.access_token))
        .await;
    let hidden = app
        .get(&format!("/api/gists/{id}/details"), Some(&bob.access_token))
        .await;
    assert_eq!(hidden.status, StatusCode::NOT_FOUND);
    assert_eq!(absent.status, StatusCode::NOT_FOUND);
    assert_eq!(hidden.body, absent.body);

    let res = app
        .request(
            "PUT",
            &format!("/api/gists/{id}"),
            Some(json!({ "title": "Mine", "body": "", "language": "python" })),
            Some(&bob.access_token),
        )
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let res = app
        .request("DELETE", &format!("/api/gists/{id}"), None, Some(&bob.access_token))
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let res = app
        .get(&format!("/api/gists/{id}/details"), Some(&ada.access_token))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["title"], "Secret");
}

#[tokio::test]
async fn test_create_validation() {
    let app = TestApp::new();
    let ada = app.register("ada@example.com").await;
    let token = ada.access_token.as_str();

    let res = app
        .request(
            "POST",
            "/api/gists",
            Some(json!({ "title": "   ", "body": "x", "language": "rust" })),
            Some(token),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["details"]["title"][0], "Title is required");

    let res = app
        .request(
            "POST",
            "/api/gists",
            Some(json!({ "title": "T", "body": "x", "language": "cobol" })),
            Some(token),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"], "VALIDATION");

    let res = app.get("/api/gists/not-a-uuid/details", Some(token)).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app.get("/api/gists", Some(token)).await;
    assert_eq!(res.data()["total_items"], 0);
}

#[tokio::test]
async fn test_delete_removes_gist() {
    let app = TestApp::new();
    let ada = app.register("ada@example.com").await;
    let token = ada.access_token.as_str();
    let id = app.create_gist(token, "T", "X", "go", true).await;

    let res = app
        .request("DELETE", &format!("/api/gists/{id}"), None, Some(token))
        .await;
    assert_eq!(res.status, StatusCode::OK);

    let res = app.get(&format!("/api/gists/{id}/details"), Some(token)).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    let res = app.get(&format!("/api/gists/{id}"), None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_favorite_toggle_is_self_inverse() {
    let app = TestApp::new();
    let ada = app.register("ada@example.com").await;
    let bob = app.register("bob@example.com").await;
    let id = app
        .create_gist(&ada.access_token, "Shared", "fn main() {}", "rust", true)
        .await;
    let path = format!("/api/gists/{id}/favorite");

    let first = app.request("POST", &path, None, Some(&bob.access_token)).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.data()["is_favorite"], true);

    let res = app
        .get("/api/gists?favorites_only=true", Some(&bob.access_token))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["total_items"], 0, "favorites_only stays within own gists");

    let res = app
        .get(&format!("/api/public/gists/{id}"), Some(&bob.access_token))
        .await;
    assert_eq!(res.data()["is_favorite"], true);

    let second = app.request("POST", &path, None, Some(&bob.access_token)).await;
    assert_eq!(second.data()["is_favorite"], false);

    let res = app
        .get(&format!("/api/public/gists/{id}"), Some(&bob.access_token))
        .await;
    assert_eq!(res.data()["is_favorite"], false);
}

#[tokio::test]
async fn test_stranger_cannot_favorite_private_gist() {
    let app = TestApp::new();
    let ada = app.register("ada@example.com").await;
    let bob = app.register("bob@example.com").await;
    let id = app
        .create_gist(&ada.access_token, "Secret", "x", "ruby", false)
        .await;

    let res = app
        .request("POST", &format!("/api/gists/{id}/favorite"), None, Some(&bob.access_token))
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body["message"], "Gist not found");

    let favorite = app
        .stores
        .gists
        .is_favorite(bob.user_id, id)
        .await
        .unwrap();
    assert!(!favorite);
}

#[tokio::test]
async fn test_fork_copies_latest_and_counts() {
    let app = TestApp::new();
    let ada = app.register("ada@example.com").await;
    let bob = app.register("bob@example.com").await;
    let source = app
        .create_gist(&ada.access_token, "Util", "v1", "typescript", true)
        .await;
    app.request(
        "PUT",
        &format!("/api/gists/{source}"),
        Some(json!({ "title": "Util", "body": "v2", "language": "typescript", "is_public": true })),
        Some(&ada.access_token),
    )
    .await;

    let res = app
        .request("POST", &format!("/api/gists/{source}/fork"), None, Some(&bob.access_token))
        .await;
    assert_eq!(res.status, StatusCode::CREATED);
    let fork = res.data();
    let fork_id = id_of(fork);
    assert_eq!(fork["forked_from_id"], source.to_string());
    assert_eq!(fork["forked_from"]["id"], source.to_string());
    assert_eq!(fork["language"], "typescript");
    assert_eq!(fork["user_id"], bob.user_id.to_string());
    let versions = fork["versions"].as_array().unwrap();
    assert_eq!(versions.len(), 1);
    assert_eq!(versions[0]["version"], 1);
    assert_eq!(versions[0]["body"], "v2");

    let res = app.get(&format!("/api/public/gists/{source}"), None).await;
    assert_eq!(res.data()["forks_count"], 1);

    let res = app
        .request("DELETE", &format!("/api/gists/{fork_id}"), None, Some(&bob.access_token))
        .await;
    assert_eq!(res.status, StatusCode::OK);

    let res = app.get(&format!("/api/public/gists/{source}"), None).await;
    assert_eq!(res.data()["forks_count"], 1);
}

#[tokio::test]
async fn test_fork_private_gist_is_not_found_even_for_owner() {
    let app = TestApp::new();
    let ada = app.register("ada@example.com").await;
    let id = app
        .create_gist(&ada.access_token, "Secret", "x", "sql", false)
        .await;

    let res = app
        .request("POST", &format!("/api/gists/{id}/fork"), None, Some(&ada.access_token))
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body["message"], "Gist not found or is not public");
}

#[tokio::test]
async fn test_list_filters_and_search() {
    let app = TestApp::new();
    let ada = app.register("ada@example.com").await;
    let token = ada.access_token.as_str();

    app.create_gist(token, "Public python", "print('hello')", "python", true)
        .await;
    app.create_gist(token, "Private python", "import os", "python", false)
        .await;
    app.create_gist(token, "Rusty", "fn main() { hello() }", "rust", true)
        .await;

    let res = app.get("/api/gists?is_public=true", Some(token)).await;
    assert_eq!(res.status, StatusCode::OK);
    let items = res.data()["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|g| g["is_public"] == true));

    let res = app.get("/api/gists?language=python", Some(token)).await;
    assert_eq!(res.data()["total_items"], 2);

    let res = app.get("/api/gists?search=HELLO", Some(token)).await;
    assert_eq!(res.data()["total_items"], 2);

    let res = app.get("/api/gists?search=100%25", Some(token)).await;
    assert_eq!(res.data()["total_items"], 0);

    let res = app.get("/api/gists?per_page=1&page=2", Some(token)).await;
    assert_eq!(res.data()["items"].as_array().unwrap().len(), 1);
    assert_eq!(res.data()["total_items"], 3);
    assert_eq!(res.data()["page"], 2);

    let res = app.get("/api/gists?page=abc", Some(token)).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_with_huge_page_is_empty() {
    let app = TestApp::new();
    let ada = app.register("ada@example.com").await;
    let token = ada.access_token.as_str();
    app.create_gist(token, "Only", "x", "python", false).await;

    let res = app
        .get("/api/gists?page=18446744073709551615&per_page=100", Some(token))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.data()["items"].as_array().unwrap().is_empty());
    assert_eq!(res.data()["total_items"], 1);
    assert_eq!(res.data()["has_next"], false);
}
