//! Chat service
//!
//! One request runs sequentially: optional OCR on the referenced image,
//! interpretation, then either a saved transaction or a summary lookup.
//! Every failure past input validation becomes a localized reply.

use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

use cash_track_core::{
    cutoff_range, resolve_period, Clock, IntentResult, Language, ParsedTransaction, QueryFilters,
    Repository, SummaryQuery, TextRecognizer,
};
use cash_track_llm::{IntentInterpreter, InterpretationPath};

use crate::completion::complete;
use crate::reply::{summary_reply, transaction_reply, Notice};
use crate::{truncate, AgentError};

/// One chat turn, with the user already resolved
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub user_id: i64,
    pub cutoff_day: u32,
    pub message: String,
    /// Stored upload name of an attached slip
    pub image_reference: Option<String>,
    /// Bytes of the referenced image, when they could be read
    pub image: Option<Vec<u8>>,
    pub language: Language,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatOutcome {
    pub reply_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<i64>,
    /// The interpreted intent, as returned to the client
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<serde_json::Value>,
}

impl ChatOutcome {
    fn reply(reply_text: String, transaction_id: Option<i64>, intent: &IntentResult) -> Self {
        Self {
            reply_text,
            transaction_id,
            debug: serde_json::to_value(intent).ok(),
        }
    }
}

pub struct ChatService {
    repository: Arc<dyn Repository>,
    recognizer: Arc<dyn TextRecognizer>,
    interpreter: Arc<IntentInterpreter>,
    clock: Arc<dyn Clock>,
}

impl ChatService {
    pub fn new(
        repository: Arc<dyn Repository>,
        recognizer: Arc<dyn TextRecognizer>,
        interpreter: Arc<IntentInterpreter>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            recognizer,
            interpreter,
            clock,
        }
    }

    pub async fn handle(&self, request: ChatRequest) -> Result<ChatOutcome, AgentError> {
        let image_reference = request
            .image_reference
            .as_deref()
            .map(str::trim)
            .filter(|reference| !reference.is_empty());
        if request.message.trim().is_empty() && image_reference.is_none() {
            return Err(AgentError::EmptyRequest);
        }

        let start = Instant::now();
        tracing::info!(
            user_id = request.user_id,
            message = %truncate(&request.message, 80),
            image = image_reference.is_some(),
            "Chat request"
        );

        let slip_text = match (image_reference, request.image.as_deref()) {
            (Some(reference), Some(bytes)) => self.recognize(bytes, reference).await,
            _ => None,
        };

        let today = self.clock.today();
        let interpretation = self
            .interpreter
            .interpret(&request.message, slip_text.as_deref(), request.language, today)
            .await;

        let intent_name = interpretation.intent.intent_name();
        metrics::counter!(
            "cash_track_chat_requests_total",
            "intent" => intent_name,
            "path" => interpretation.path.as_str()
        )
        .increment(1);
        if interpretation.path == InterpretationPath::Rules {
            metrics::counter!("cash_track_llm_fallback_total").increment(1);
        }
        tracing::info!(
            user_id = request.user_id,
            intent = intent_name,
            path = interpretation.path.as_str(),
            "Chat parsed"
        );

        let outcome = match &interpretation.intent {
            IntentResult::AddTransaction { transaction, .. } => {
                self.add_transaction(
                    &request,
                    transaction,
                    image_reference,
                    slip_text.as_deref(),
                    &interpretation.intent,
                )
                .await
            }
            IntentResult::QuerySummary { filters } => {
                self.query_summary(&request, filters, &interpretation.intent).await
            }
            IntentResult::Unknown => ChatOutcome::reply(
                Notice::Unknown.text(request.language).to_string(),
                None,
                &interpretation.intent,
            ),
        };

        metrics::histogram!("cash_track_chat_latency_seconds")
            .record(start.elapsed().as_secs_f64());
        Ok(outcome)
    }

    /// OCR failure means no slip text
    async fn recognize(&self, image: &[u8], reference: &str) -> Option<String> {
        match self.recognizer.extract_text(image, reference).await {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!(
                    image = reference,
                    error = %e,
                    "OCR failed, continuing without slip text"
                );
                None
            }
        }
    }

    async fn add_transaction(
        &self,
        request: &ChatRequest,
        parsed: &ParsedTransaction,
        image_reference: Option<&str>,
        slip_text: Option<&str>,
        intent: &IntentResult,
    ) -> ChatOutcome {
        let completion = complete(parsed, &request.message, slip_text);
        let fields = completion.to_new_transaction(image_reference, slip_text);

        match self.repository.create_transaction(request.user_id, fields).await {
            Ok(created) => {
                tracing::info!(
                    user_id = request.user_id,
                    transaction_id = created.id,
                    status = completion.status.as_str(),
                    amount = completion.amount,
                    "Transaction created"
                );
                ChatOutcome::reply(
                    transaction_reply(&completion, request.language),
                    Some(created.id),
                    intent,
                )
            }
            Err(e) => {
                tracing::error!(
                    user_id = request.user_id,
                    error = %e,
                    "Failed to create transaction"
                );
                let reply = Notice::SaveFailed.text(request.language).to_string();
                ChatOutcome::reply(reply, None, intent)
            }
        }
    }

    async fn query_summary(
        &self,
        request: &ChatRequest,
        filters: &QueryFilters,
        intent: &IntentResult,
    ) -> ChatOutcome {
        let today = self.clock.today();
        // a range with a missing bound reads as the current cycle
        let range = resolve_period(&filters.period, request.cutoff_day, today)
            .unwrap_or_else(|| cutoff_range(today, request.cutoff_day));

        let query = SummaryQuery {
            direction: filters.direction,
            range,
            category: filters.category,
            channel: filters.channel,
        };

        match self.repository.query_summary(request.user_id, &query).await {
            Ok(totals) => {
                let reply = summary_reply(totals, filters, range, request.language);
                ChatOutcome::reply(reply, None, intent)
            }
            Err(e) => {
                tracing::error!(user_id = request.user_id, error = %e, "Summary query failed");
                let reply = Notice::FetchFailed.text(request.language).to_string();
                ChatOutcome::reply(reply, None, intent)
            }
        }
    }
}
