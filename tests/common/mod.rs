//! Shared harness for HTTP-level tests.
//!
//! Builds the production router over an in-memory catalog store, so the
//! suites run without a database. Requests go through `tower::ServiceExt::oneshot`.
#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use upstore::api::auth::SessionConfig;
use upstore::api::{build_router, AppState};
use upstore::domain::aggregates::AdminRole;
use upstore::services::{AccountService, EventSink, LogoLibrary};
use upstore::store::{CatalogStore, MemoryCatalogStore};

pub const ADMIN_EMAIL: &str = "admin@upstore.ru";
pub const ADMIN_PASSWORD: &str = "admin123";
pub const LOGO_PREFIX: &str = "/src/logoanim";

pub struct TestApp {
    pub router: Router,
    pub store: Arc<dyn CatalogStore>,
    /// Backs the logo library; dropped with the app.
    pub logos_dir: TempDir,
}

/// Router over a fresh in-memory store with one SUPERADMIN account.
pub async fn build_test_app() -> TestApp {
    let store: Arc<dyn CatalogStore> = Arc::new(MemoryCatalogStore::new());
    AccountService::new(store.clone())
        .ensure_admin(ADMIN_EMAIL, ADMIN_PASSWORD, AdminRole::Superadmin)
        .await
        .expect("admin seeding should succeed");

    let logos_dir = tempfile::tempdir().expect("tempdir");
    let session = SessionConfig { secret: "test-secret".into(), max_age_days: 30 };
    let state = AppState::new(
        store.clone(),
        EventSink::disabled(),
        LogoLibrary::new(logos_dir.path(), LOGO_PREFIX),
        session,
    );

    TestApp { router: build_router(state), store, logos_dir }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.expect("router is infallible")
    }

    /// Logs in as the seeded admin and returns the bearer token.
    pub async fn token(&self) -> String {
        let response = self
            .post_json("/api/auth/login", json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        body["token"].as_str().expect("token in login response").to_string()
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.send(request(Method::GET, uri, None, None)).await
    }

    pub async fn get_auth(&self, uri: &str, token: &str) -> Response {
        self.send(request(Method::GET, uri, Some(token), None)).await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> Response {
        self.send(request(Method::POST, uri, None, Some(body))).await
    }

    /// POST with neither a body nor a content type.
    pub async fn post_empty(&self, uri: &str) -> Response {
        self.send(request(Method::POST, uri, None, None)).await
    }

    pub async fn post_json_auth(&self, uri: &str, token: &str, body: Value) -> Response {
        self.send(request(Method::POST, uri, Some(token), Some(body))).await
    }

    pub async fn put_json_auth(&self, uri: &str, token: &str, body: Value) -> Response {
        self.send(request(Method::PUT, uri, Some(token), Some(body))).await
    }

    pub async fn delete_auth(&self, uri: &str, token: &str) -> Response {
        self.send(request(Method::DELETE, uri, Some(token), None)).await
    }

    /// Creates a resource through the admin API and returns its JSON.
    pub async fn create(&self, uri: &str, token: &str, body: Value) -> Value {
        let response = self.post_json_auth(uri, token, body).await;
        assert_eq!(response.status(), StatusCode::CREATED, "POST {uri}");
        body_json(response).await
    }
}

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("valid request"),
        None => builder.body(Body::empty()).expect("valid request"),
    }
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.expect("readable body").to_bytes();
    serde_json::from_slice(&bytes).expect("JSON body")
}

/// The iPhone fixture: Цвет {Black, White} x Память {128GB}, two priced variants.
pub fn iphone_payload(category_id: Option<&str>) -> Value {
    json!({
        "name": "iPhone 15 Pro",
        "description": "Titanium flagship",
        "categoryId": category_id,
        "mainImage": "/img/iphone.png",
        "options": [
            { "name": "Цвет", "values": [
                { "value": "Black", "colorCode": "#000000", "image": "/img/black.png" },
                { "value": "White", "colorCode": "#FFFFFF" }
            ]},
            { "name": "Память", "values": [ { "value": "128GB" } ] }
        ],
        "variants": [
            { "optionValues": ["Black", "128GB"], "price": 90000 },
            { "optionValues": ["White", "128GB"], "price": 95000, "oldPrice": 99000 }
        ]
    })
}

/// `(option name, value label) -> value id` lookup over a product JSON.
pub fn value_id(product: &Value, option: &str, label: &str) -> String {
    product["options"]
        .as_array()
        .into_iter()
        .flatten()
        .filter(|o| o["name"] == option)
        .flat_map(|o| o["values"].as_array().into_iter().flatten())
        .find(|v| v["value"] == label)
        .and_then(|v| v["id"].as_str())
        .unwrap_or_else(|| panic!("no value {label} under {option}"))
        .to_string()
}

pub fn option_id(product: &Value, option: &str) -> String {
    product["options"]
        .as_array()
        .into_iter()
        .flatten()
        .find(|o| o["name"] == option)
        .and_then(|o| o["id"].as_str())
        .unwrap_or_else(|| panic!("no option {option}"))
        .to_string()
}
