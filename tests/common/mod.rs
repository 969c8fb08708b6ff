//! Shared helpers for router-level tests.

#![allow(dead_code)]

use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use storefront::{
    app::build_app,
    config::{AppConfig, JwtConfig, UploadConfig},
    memory::MemoryStore,
    state::AppState,
    storage::StorageClient,
};
use tempfile::TempDir;
use tower::ServiceExt;

/// Records uploads instead of talking to a real object store.
#[derive(Default)]
pub struct FakeStorage {
    pub fail: bool,
    pub objects: Mutex<Vec<(String, Vec<u8>, String)>>,
}

#[async_trait]
impl StorageClient for FakeStorage {
    async fn put_file(&self, key: &str, path: &Path, content_type: &str) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("provider rejected the file");
        }
        let bytes = tokio::fs::read(path).await?;
        self.objects
            .lock()
            .unwrap()
            .push((key.to_string(), bytes, content_type.to_string()));
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("https://cdn.test/{}", key)
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub storage: Arc<FakeStorage>,
    pub tmp_dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_storage(FakeStorage::default())
    }

    pub fn with_storage(storage: FakeStorage) -> Self {
        let tmp_dir = TempDir::new().expect("temp dir");
        let config = Arc::new(test_config(tmp_dir.path().to_path_buf()));
        let store = Arc::new(MemoryStore::new());
        let storage = Arc::new(storage);
        let state = AppState::from_parts(config, store.clone(), store, storage.clone());
        Self {
            router: build_app(state.clone()),
            state,
            storage,
            tmp_dir,
        }
    }

    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let res = self.router.clone().oneshot(req).await.expect("router responds");
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .expect("read body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    pub async fn post_json(&self, uri: &str, body: Value, token: Option<&str>) -> (StatusCode, Value) {
        self.send(json_request(Method::POST, uri, Some(body), token)).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(json_request(Method::GET, uri, None, token)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(json_request(Method::DELETE, uri, None, token)).await
    }

    /// Registers and signs in a user, returning the bearer token.
    pub async fn signed_in(&self, username: &str, email: &str, password: &str) -> String {
        let (status, _) = self
            .post_json(
                "/api/auth/register",
                serde_json::json!({ "username": username, "email": email, "password": password }),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, body) = self
            .post_json(
                "/api/auth/signin",
                serde_json::json!({ "email": email, "password": password }),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().expect("token").to_string()
    }

    pub fn tmp_entries(&self) -> usize {
        std::fs::read_dir(self.tmp_dir.path()).unwrap().count()
    }
}

pub fn test_config(tmp_dir: PathBuf) -> AppConfig {
    AppConfig {
        host: "127.0.0.1".into(),
        port: 0,
        database_url: None,
        cors_origin: None,
        jwt: JwtConfig {
            secret: "test-secret".into(),
            ttl_minutes: 60,
        },
        upload: UploadConfig {
            endpoint: "http://localhost:9000".into(),
            bucket: "test".into(),
            access_key: "test".into(),
            secret_key: "test".into(),
            region: "us-east-1".into(),
            folder: "uploads".into(),
            public_base_url: "https://cdn.test".into(),
            tmp_dir,
            max_bytes: 1024 * 1024,
        },
    }
}

pub fn json_request(method: Method, uri: &str, body: Option<Value>, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// JSON-typed request carrying an arbitrary, possibly broken, body.
pub fn raw_json_request(method: Method, uri: &str, body: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub const BOUNDARY: &str = "storefront-test-boundary";

/// Single-field multipart body.
pub fn multipart_request(
    field: &str,
    file_name: &str,
    content_type: &str,
    data: &[u8],
    token: Option<&str>,
) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
             Content-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/api/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body)).unwrap()
}
