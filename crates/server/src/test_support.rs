//! Router fixtures: in-memory repository, fake collaborators, temp uploads

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use axum::Router;
use chrono::NaiveDate;
use parking_lot::Mutex;
use std::sync::Arc;
use tower::ServiceExt;

use cash_track_config::Settings;
use cash_track_core::{Error, FixedClock, LanguageModel, Repository, Result, TextRecognizer};
use cash_track_persistence::SqliteRepository;

use crate::http::create_router;
use crate::state::{AppState, ReadinessProbe};
use crate::storage::UploadStorage;
use crate::user_context::USER_COOKIE;

/// Always unreachable, so interpretation takes the rule-based path
pub struct OfflineModel;

#[async_trait]
impl LanguageModel for OfflineModel {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        Err(Error::Generation("connection refused".into()))
    }

    fn model_name(&self) -> &str {
        "offline"
    }
}

pub struct FakeRecognizer {
    result: Result<String>,
    pub calls: Mutex<usize>,
}

#[async_trait]
impl TextRecognizer for FakeRecognizer {
    async fn extract_text(&self, _image: &[u8], _file_name: &str) -> Result<String> {
        *self.calls.lock() += 1;
        self.result.clone()
    }
}

pub struct StaticProbe(pub &'static str, pub bool);

#[async_trait]
impl ReadinessProbe for StaticProbe {
    fn name(&self) -> &'static str {
        self.0
    }

    async fn is_ready(&self) -> bool {
        self.1
    }
}

pub struct TestApp {
    pub repository: Arc<SqliteRepository>,
    pub recognizer: Arc<FakeRecognizer>,
    pub storage: UploadStorage,
    pub default_user_id: i64,
    pub probes: Vec<Arc<dyn ReadinessProbe>>,
    pub settings: Settings,
    _uploads: tempfile::TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let repository = Arc::new(SqliteRepository::in_memory().await.unwrap());
        let default_user_id = repository.ensure_default_user().await.unwrap().id;
        let uploads = tempfile::tempdir().unwrap();

        Self {
            repository,
            recognizer: Arc::new(FakeRecognizer {
                result: Ok(String::new()),
                calls: Mutex::new(0),
            }),
            storage: UploadStorage::new(uploads.path()).unwrap(),
            default_user_id,
            probes: Vec::new(),
            settings: Settings::default(),
            _uploads: uploads,
        }
    }

    pub fn recognizing(self, result: Result<String>) -> Self {
        Self {
            recognizer: Arc::new(FakeRecognizer {
                result,
                calls: Mutex::new(0),
            }),
            ..self
        }
    }

    pub fn with_probe(mut self, probe: StaticProbe) -> Self {
        self.probes.push(Arc::new(probe));
        self
    }

    pub fn with_max_upload(mut self, bytes: usize) -> Self {
        self.settings.server.max_upload_bytes = bytes;
        self
    }

    pub fn router(&self) -> Router {
        let state = AppState::new(
            self.settings.clone(),
            self.repository.clone(),
            self.recognizer.clone(),
            Arc::new(OfflineModel),
            Arc::new(FixedClock(today())),
            self.storage.clone(),
            self.default_user_id,
        );
        let state = self
            .probes
            .iter()
            .cloned()
            .fold(state, |state, probe| state.with_probe(probe));
        create_router(state)
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router().oneshot(request).await.unwrap()
    }

    /// Create a user and return its id
    pub async fn user(&self, name: &str) -> i64 {
        self.repository.create_user(name).await.unwrap().id
    }
}

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()
}

pub fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn as_user(mut request: Request<Body>, user_id: i64) -> Request<Body> {
    request.headers_mut().insert(
        header::COOKIE,
        format!("{}={}", USER_COOKIE, user_id).parse().unwrap(),
    );
    request
}

pub fn set_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

pub async fn read_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
