#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::Value;
use stockroom_auth_mock::StaticTokenAuth;
use stockroom_core::prelude::*;
use stockroom_memory::{InMemoryAssetRepository, InMemoryBlobStorage, InMemoryRecordStore};
use stockroom_server::prelude::*;
use tower::ServiceExt;

pub const JWT_SECRET: &str = "test-secret";
pub const U1: &str = "token-u1";
pub const U2: &str = "token-u2";

pub struct TestApp {
    pub router: Router,
    pub assets: InMemoryAssetRepository,
    pub blobs: InMemoryBlobStorage,
    pub records: InMemoryRecordStore,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub raw: Vec<u8>,
    pub body: Value,
}

pub fn auth() -> StaticTokenAuth {
    StaticTokenAuth::new()
        .with_token(U1, "u1")
        .with_token(U2, "u2")
}

pub async fn app() -> TestApp {
    app_with(StockroomServerConfig::default()).await
}

pub async fn app_with(config: StockroomServerConfig) -> TestApp {
    let assets = InMemoryAssetRepository::new();
    assets.open().await.unwrap();
    let blobs = InMemoryBlobStorage::new();
    let records = InMemoryRecordStore::new();

    let router = StockroomServer::new(config.with_jwt_secret(JWT_SECRET)).build(
        assets.clone(),
        blobs.clone(),
        records.clone(),
        auth(),
    );

    TestApp {
        router,
        assets,
        blobs,
        records,
    }
}

/// Builds a router over any repository, for failure injection.
pub fn router_over<R: AssetRepository>(assets: R) -> Router {
    router_over_with_blobs(assets, InMemoryBlobStorage::new())
}

pub fn router_over_with_blobs<R: AssetRepository>(assets: R, blobs: InMemoryBlobStorage) -> Router {
    StockroomServer::new(StockroomServerConfig::default().with_jwt_secret(JWT_SECRET)).build(
        assets,
        blobs,
        InMemoryRecordStore::new(),
        auth(),
    )
}

pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> TestResponse {
    let body = body.map(|b| b.to_string().into_bytes()).unwrap_or_default();
    send_raw(router, method, uri, token, body).await
}

pub async fn send_raw(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Vec<u8>,
) -> TestResponse {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = builder.body(Body::from(body)).unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let raw = response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec();
    let body = if raw.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&raw).unwrap_or(Value::Null)
    };

    TestResponse {
        status,
        headers,
        raw,
        body,
    }
}

/// Creates an asset as `token` and returns its JSON.
pub async fn create(router: &Router, token: &str, owner: &str, name: &str, category: &str) -> Value {
    let response = send(
        router,
        Method::POST,
        "/assets",
        Some(token),
        Some(serde_json::json!({"ownerId": owner, "name": name, "category": category})),
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    response.body["data"].clone()
}

pub fn assert_standard_headers(response: &TestResponse) {
    assert_eq!(response.headers["access-control-allow-origin"], "*");
    assert_eq!(response.headers["access-control-allow-credentials"], "true");
}
