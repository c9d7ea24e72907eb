//! Shared fixtures: the real router wired to in-memory adapters.
#![allow(dead_code)]

use std::sync::Arc;

use api_lib::config::Config;
use api_lib::web::{build_router, session::SessionKeys, state::AppState};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use medsum_core::testing::{InMemoryDatabase, InMemoryStorage};
use serde_json::Value;
use tower::ServiceExt;

pub const SECRET: &str = "integration-test-secret";
pub const BOUNDARY: &str = "medsum-test-boundary";

pub struct TestApp {
    pub router: Router,
    pub db: Arc<InMemoryDatabase>,
    pub storage: Arc<InMemoryStorage>,
}

pub fn test_config() -> Config {
    test_config_with(&[])
}

/// The base test settings, with `overrides` taking precedence.
pub fn test_config_with(overrides: &[(&str, &str)]) -> Config {
    Config::from_lookup(|key| {
        if let Some((_, v)) = overrides.iter().find(|(k, _)| *k == key) {
            return Some(v.to_string());
        }
        match key {
            "DATABASE_URL" => Some("postgres://unused/med_sum".to_string()),
            "JWT_SECRET" => Some(SECRET.to_string()),
            "MAX_UPLOAD_BYTES" => Some("4096".to_string()),
            _ => None,
        }
    })
    .expect("test config must load")
}

pub fn spawn_app() -> TestApp {
    spawn_app_with_storage(InMemoryStorage::default())
}

pub fn spawn_app_with_storage(storage: InMemoryStorage) -> TestApp {
    spawn_app_with(test_config(), storage)
}

pub fn spawn_app_with(config: Config, storage: InMemoryStorage) -> TestApp {
    let config = Arc::new(config);
    let db = Arc::new(InMemoryDatabase::default());
    let storage = Arc::new(storage);
    let state = Arc::new(AppState {
        db: db.clone(),
        storage: storage.clone(),
        sessions: SessionKeys::new(SECRET, config.jwt_ttl),
        config,
    });
    let router = build_router(state).expect("router must build");
    TestApp { router, db, storage }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("body must be JSON")
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.body.clone()).expect("body must be UTF-8")
    }
}

impl TestApp {
    pub async fn send(&self, req: Request<Body>) -> TestResponse {
        let res = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("router is infallible");
        let status = res.status();
        let headers = res.headers().clone();
        let body = to_bytes(res.into_body(), usize::MAX)
            .await
            .expect("body must be readable")
            .to_vec();
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn login(&self, phone: &str) -> (String, Value) {
        let res = self
            .send(json_request(
                Method::POST,
                "/login",
                serde_json::json!({ "phone_number": phone }),
            ))
            .await;
        assert_eq!(res.status, StatusCode::OK, "login failed: {}", res.text());
        let body = res.json();
        let token = body["token"].as_str().expect("token").to_string();
        (token, body["user"].clone())
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(authed(Method::GET, uri, token, Body::empty())).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(authed(Method::DELETE, uri, token, Body::empty())).await
    }

    pub async fn upload(&self, token: &str, file_name: &str, data: &[u8]) -> TestResponse {
        let mut req = authed(
            Method::POST,
            "/documents",
            Some(token),
            Body::from(multipart_body("file", file_name, data)),
        );
        req.headers_mut().insert(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY)
                .parse()
                .expect("content type must parse"),
        );
        self.send(req).await
    }
}

pub fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request must build")
}

pub fn authed(method: Method, uri: &str, token: Option<&str>, body: Body) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(body).expect("request must build")
}

pub fn multipart_body(field: &str, file_name: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/pdf\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}
