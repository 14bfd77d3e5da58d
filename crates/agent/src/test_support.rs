//! Fakes shared by the service tests

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;
use std::sync::Arc;

use cash_track_core::{Error, FixedClock, LanguageModel, Repository, Result, TextRecognizer};
use cash_track_llm::IntentInterpreter;
use cash_track_persistence::SqliteRepository;

use crate::{ChatService, SlipProcessor};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub struct ScriptedModel {
    reply: Result<String>,
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        self.reply.clone()
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Returns a canned result and counts calls
pub struct FakeRecognizer {
    result: Mutex<Result<String>>,
    pub calls: Mutex<usize>,
}

impl FakeRecognizer {
    fn new(result: Result<String>) -> Self {
        Self {
            result: Mutex::new(result),
            calls: Mutex::new(0),
        }
    }
}

#[async_trait]
impl TextRecognizer for FakeRecognizer {
    async fn extract_text(&self, _image: &[u8], _file_name: &str) -> Result<String> {
        *self.calls.lock() += 1;
        self.result.lock().clone()
    }
}

/// In-memory repository, default user, fixed date 2026-01-15
pub struct Fixture {
    pub repository: Arc<SqliteRepository>,
    pub recognizer: Arc<FakeRecognizer>,
    pub model: Arc<ScriptedModel>,
    pub user_id: i64,
    pub today: NaiveDate,
}

impl Fixture {
    async fn new(reply: Result<String>) -> Self {
        let repository = Arc::new(SqliteRepository::in_memory().await.unwrap());
        let user_id = repository.ensure_default_user().await.unwrap().id;
        Self {
            repository,
            recognizer: Arc::new(FakeRecognizer::new(Ok(String::new()))),
            model: Arc::new(ScriptedModel { reply }),
            user_id,
            today: date(2026, 1, 15),
        }
    }

    pub async fn with_model_error() -> Self {
        Self::new(Err(Error::Generation("connection refused".into()))).await
    }

    pub async fn with_model_reply(reply: &str) -> Self {
        Self::new(Ok(reply.to_string())).await
    }

    pub fn recognizing(self, result: Result<String>) -> Self {
        Self {
            recognizer: Arc::new(FakeRecognizer::new(result)),
            ..self
        }
    }

    fn interpreter(&self) -> Arc<IntentInterpreter> {
        Arc::new(IntentInterpreter::new(self.model.clone()))
    }

    pub fn chat(&self) -> ChatService {
        ChatService::new(
            self.repository.clone(),
            self.recognizer.clone(),
            self.interpreter(),
            Arc::new(FixedClock(self.today)),
        )
    }

    pub fn slips(&self) -> Arc<SlipProcessor> {
        Arc::new(SlipProcessor::new(
            self.repository.clone(),
            self.recognizer.clone(),
            self.interpreter(),
            Arc::new(FixedClock(self.today)),
        ))
    }
}
