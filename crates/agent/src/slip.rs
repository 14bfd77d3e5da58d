//! Detached slip processing
//!
//! After an upload the caller already has its answer; recognition and
//! interpretation fill in the pending row later. The job runs as an inner
//! task awaited by a supervisor, so a panic or error is logged and goes no
//! further. The row's status is never changed here.

use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;

use cash_track_core::{Clock, IntentResult, Language, OcrUpdate, Repository, TextRecognizer};
use cash_track_llm::IntentInterpreter;

use crate::AgentError;

/// One uploaded slip awaiting recognition
#[derive(Debug, Clone)]
pub struct SlipJob {
    pub transaction_id: i64,
    pub image: Vec<u8>,
    pub file_name: String,
}

/// What the job wrote back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlipOutcome {
    /// Extracted fields stored
    Parsed,
    /// Only the raw text stored
    TextOnly,
    /// Recognizer found no text
    Empty,
}

impl SlipOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Parsed => "parsed",
            Self::TextOnly => "text_only",
            Self::Empty => "empty",
        }
    }
}

pub struct SlipProcessor {
    repository: Arc<dyn Repository>,
    recognizer: Arc<dyn TextRecognizer>,
    interpreter: Arc<IntentInterpreter>,
    clock: Arc<dyn Clock>,
}

impl SlipProcessor {
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

    /// Fire and forget. The handle resolves once the job has finished or failed.
    pub fn spawn(self: &Arc<Self>, job: SlipJob) -> JoinHandle<()> {
        let processor = Arc::clone(self);
        let transaction_id = job.transaction_id;

        tokio::spawn(async move {
            let start = Instant::now();
            let inner = tokio::spawn(async move { processor.process(&job).await });

            let outcome = match inner.await {
                Ok(Ok(outcome)) => {
                    tracing::info!(
                        transaction_id,
                        outcome = outcome.as_str(),
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "Slip processed"
                    );
                    outcome.as_str()
                }
                Ok(Err(e)) => {
                    tracing::warn!(
                        transaction_id,
                        error = %e,
                        "Slip processing failed, row left pending"
                    );
                    "failed"
                }
                Err(e) => {
                    tracing::error!(transaction_id, error = %e, "Slip task aborted");
                    "aborted"
                }
            };
            metrics::counter!("cash_track_slip_jobs_total", "outcome" => outcome).increment(1);
        })
    }

    /// Run the job in the current task
    pub async fn process(&self, job: &SlipJob) -> Result<SlipOutcome, AgentError> {
        let text = self
            .recognizer
            .extract_text(&job.image, &job.file_name)
            .await
            .map_err(|e| AgentError::Recognition(e.to_string()))?;

        if text.trim().is_empty() {
            return Ok(SlipOutcome::Empty);
        }

        let today = self.clock.today();
        let interpretation = self
            .interpreter
            .interpret("", Some(&text), Language::Thai, today)
            .await;

        let (update, outcome) = match interpretation.intent {
            IntentResult::AddTransaction { transaction, .. } => (
                OcrUpdate {
                    raw_text: text,
                    amount: transaction.positive_amount(),
                    txn_date: transaction.txn_date,
                    channel: transaction.channel,
                    category: transaction.category,
                    description: transaction.description,
                    llm_confidence: transaction.confidence,
                },
                SlipOutcome::Parsed,
            ),
            _ => (
                OcrUpdate {
                    raw_text: text,
                    ..OcrUpdate::default()
                },
                SlipOutcome::TextOnly,
            ),
        };

        self.repository.update_ocr_result(job.transaction_id, update).await?;
        Ok(outcome)
    }
}
