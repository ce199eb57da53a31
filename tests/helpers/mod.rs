//! Shared test helpers for integration tests.

#![allow(dead_code)]

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use gisthub_api::{build_app, build_state};
use gisthub_core::config::AppConfig;
use gisthub_database::store::Stores;
use gisthub_entity::user::UserRole;

pub const PASSWORD: &str = "password123";

/// Test application over a fresh in-memory store.
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Direct store access for setup that has no HTTP surface
    pub stores: Stores,
    /// Application config
    pub config: AppConfig,
}

/// A captured response.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub bytes: Vec<u8>,
    pub body: Value,
}

impl TestResponse {
    /// The response body as UTF-8 text.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }

    /// A response header as a string.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// `body.data`
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }
}

/// A signed-in user.
pub struct Session {
    pub user_id: Uuid,
    pub email: String,
    pub access_token: String,
    pub refresh_token: String,
}

impl TestApp {
    /// Create a new test application
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.database.url = "memory://".into();
        config.auth.jwt_secret = "integration-test-secret".into();
        config.server.public_base_url = "https://gists.example.com".into();

        let stores = Stores::memory();
        let router = build_app(build_state(config.clone(), stores.clone()));

        Self {
            router,
            stores,
            config,
        }
    }

    /// Send a request with an optional JSON body and bearer token.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            bytes,
            body,
        }
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> TestResponse {
        self.request("GET", path, None, token).await
    }

    /// Register a member and return their session.
    pub async fn register(&self, email: &str) -> Session {
        let res = self
            .request(
                "POST",
                "/api/auth/register",
                Some(serde_json::json!({
                    "email": email,
                    "password": PASSWORD,
                    "confirm_password": PASSWORD,
                })),
                None,
            )
            .await;
        assert_eq!(res.status, StatusCode::OK, "register failed: {}", res.text());
        session_from(&res)
    }

    /// Log in and return a fresh session.
    pub async fn login(&self, email: &str) -> Session {
        let res = self
            .request(
                "POST",
                "/api/auth/login",
                Some(serde_json::json!({ "email": email, "password": PASSWORD })),
                None,
            )
            .await;
        assert_eq!(res.status, StatusCode::OK, "login failed: {}", res.text());
        session_from(&res)
    }

    /// Register a user and promote them to admin.
    pub async fn admin(&self, email: &str) -> Session {
        let session = self.register(email).await;
        self.stores
            .users
            .update_role(session.user_id, UserRole::Admin)
            .await
            .unwrap();
        session
    }

    /// Create a gist and return its id.
    pub async fn create_gist(
        &self,
        token: &str,
        title: &str,
        body: &str,
        language: &str,
        is_public: bool,
    ) -> Uuid {
        let res = self
            .request(
                "POST",
                "/api/gists",
                Some(serde_json::json!({
                    "title": title,
                    "body": body,
                    "language": language,
                    "is_public": is_public,
                })),
                Some(token),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "create failed: {}", res.text());
        id_of(res.data())
    }
}

/// Parse the `id` field of a JSON object.
pub fn id_of(value: &Value) -> Uuid {
    value["id"].as_str().unwrap().parse().unwrap()
}

fn session_from(res: &TestResponse) -> Session {
    let data = res.data();
    Session {
        user_id: id_of(&data["user"]),
        email: data["user"]["email"].as_str().unwrap().to_string(),
        access_token: data["access_token"].as_str().unwrap().to_string(),
        refresh_token: data["refresh_token"].as_str().unwrap().to_string(),
    }
}
