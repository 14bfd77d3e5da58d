//! Intent interpreter
//!
//! Language model first, rule-based extraction on any failure.

use chrono::NaiveDate;
use std::sync::Arc;

use cash_track_core::{IntentResult, LanguageModel, Language};
use cash_track_text_processing::RuleBasedInterpreter;

use crate::prompt::{chat_prompt, slip_prompt};
use crate::response::parse_model_output;

/// Which path produced an interpretation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpretationPath {
    Model,
    Rules,
}

impl InterpretationPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Rules => "rules",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Interpretation {
    pub intent: IntentResult,
    pub path: InterpretationPath,
}

pub struct IntentInterpreter {
    model: Arc<dyn LanguageModel>,
    rules: RuleBasedInterpreter,
}

impl IntentInterpreter {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self {
            model,
            rules: RuleBasedInterpreter::new(),
        }
    }

    /// Interpret a chat message and/or recognized slip text.
    ///
    /// Slip text, when non-blank, is the primary evidence and selects the slip
    /// prompt. Never fails: transport errors, timeouts and undecodable output
    /// all route to the rule-based interpreter.
    pub async fn interpret(
        &self,
        message: &str,
        slip_text: Option<&str>,
        language: Language,
        today: NaiveDate,
    ) -> Interpretation {
        let slip_text = slip_text.filter(|text| !text.trim().is_empty());
        let prompt = match slip_text {
            Some(text) => slip_prompt(text),
            None => chat_prompt(message, language, today),
        };

        let outcome = match self.model.generate(&prompt).await {
            Ok(output) => parse_model_output(&output).map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        match outcome {
            Ok(intent) => {
                tracing::debug!(
                    model = self.model.model_name(),
                    intent = intent.intent_name(),
                    "Model interpretation"
                );
                Interpretation {
                    intent,
                    path: InterpretationPath::Model,
                }
            }
            Err(error) => {
                tracing::warn!(
                    model = self.model.model_name(),
                    error = %error,
                    slip = slip_text.is_some(),
                    "Language model unavailable or unparseable, using rule-based fallback"
                );
                Interpretation {
                    intent: self.rules.interpret(message, slip_text, today),
                    path: InterpretationPath::Rules,
                }
            }
        }
    }
}
