//! Application State
//!
//! Shared state across all handlers.

use async_trait::async_trait;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

use cash_track_agent::{ChatService, SlipProcessor};
use cash_track_config::Settings;
use cash_track_core::{Clock, LanguageModel, Repository, TextRecognizer};
use cash_track_llm::{IntentInterpreter, OllamaBackend};
use cash_track_ocr::HttpOcrClient;

use crate::storage::UploadStorage;

/// Dependency checked by `GET /ready`
#[async_trait]
pub trait ReadinessProbe: Send + Sync {
    fn name(&self) -> &'static str;

    async fn is_ready(&self) -> bool;
}

#[async_trait]
impl ReadinessProbe for OllamaBackend {
    fn name(&self) -> &'static str {
        "llm"
    }

    async fn is_ready(&self) -> bool {
        self.is_available().await
    }
}

#[async_trait]
impl ReadinessProbe for HttpOcrClient {
    fn name(&self) -> &'static str {
        "ocr"
    }

    async fn is_ready(&self) -> bool {
        self.health().await
    }
}

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub repository: Arc<dyn Repository>,
    pub chat: Arc<ChatService>,
    pub slips: Arc<SlipProcessor>,
    pub storage: Arc<UploadStorage>,
    pub clock: Arc<dyn Clock>,
    pub probes: Vec<Arc<dyn ReadinessProbe>>,
    /// Present when the Prometheus recorder is installed
    pub metrics: Option<PrometheusHandle>,
    /// Id of the implicit default user, resolved at startup
    pub default_user_id: i64,
}

impl AppState {
    /// Wire the chat service and slip processor over shared collaborators
    pub fn new(
        config: Settings,
        repository: Arc<dyn Repository>,
        recognizer: Arc<dyn TextRecognizer>,
        model: Arc<dyn LanguageModel>,
        clock: Arc<dyn Clock>,
        storage: UploadStorage,
        default_user_id: i64,
    ) -> Self {
        let interpreter = Arc::new(IntentInterpreter::new(model));
        let chat = ChatService::new(
            repository.clone(),
            recognizer.clone(),
            interpreter.clone(),
            clock.clone(),
        );
        let slips = SlipProcessor::new(repository.clone(), recognizer, interpreter, clock.clone());

        Self {
            config: Arc::new(config),
            repository,
            chat: Arc::new(chat),
            slips: Arc::new(slips),
            storage: Arc::new(storage),
            clock,
            probes: Vec::new(),
            metrics: None,
            default_user_id,
        }
    }

    pub fn with_probe(mut self, probe: Arc<dyn ReadinessProbe>) -> Self {
        self.probes.push(probe);
        self
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}
