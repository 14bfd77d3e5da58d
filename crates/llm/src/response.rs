//! Model output decoding
//!
//! The model's text is untrusted. The first `{` through the last `}` is
//! decoded into a schema where every field is optional, then validated into
//! an `IntentResult`. Decode failures are errors (the caller falls back to
//! rules); well-formed JSON with a bad shape becomes `Unknown`.

use chrono::{Datelike, NaiveDate};
use serde::Deserialize;

use cash_track_core::{
    round_amount, Category, Channel, Direction, IntentResult, IntentSource, ParsedTransaction,
    PeriodFilter, PeriodType, QueryFilters, SummaryDirection, DEFAULT_CURRENCY,
};

use crate::LlmError;

#[derive(Debug, Deserialize)]
struct RawModelResponse {
    intent: Option<String>,
    transaction: Option<RawTransaction>,
    filters: Option<RawFilters>,
    confidence: Option<RawNumber>,
}

#[derive(Debug, Deserialize)]
struct RawTransaction {
    txn_date: Option<String>,
    amount: Option<RawNumber>,
    currency: Option<String>,
    direction: Option<String>,
    channel: Option<String>,
    account_label: Option<String>,
    category: Option<String>,
    description: Option<String>,
    confidence: Option<RawNumber>,
}

#[derive(Debug, Deserialize)]
struct RawFilters {
    direction: Option<String>,
    period: Option<RawPeriod>,
    category: Option<String>,
    channel: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawPeriod {
    #[serde(rename = "type")]
    kind: Option<String>,
    from: Option<String>,
    to: Option<String>,
}

/// Numbers sometimes arrive quoted
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Number(f64),
    Text(String),
}

impl RawNumber {
    fn value(&self) -> Option<f64> {
        let value = match self {
            RawNumber::Number(value) => Some(*value),
            RawNumber::Text(text) => text.trim().replace(',', "").parse::<f64>().ok(),
        };
        value.filter(|value| value.is_finite())
    }
}

/// Slice from the first `{` to the last `}` inclusive
pub fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Decode and validate model output
pub fn parse_model_output(text: &str) -> Result<IntentResult, LlmError> {
    let json = extract_json(text)
        .ok_or_else(|| LlmError::InvalidResponse("no JSON object in model output".to_string()))?;

    let raw: RawModelResponse = serde_json::from_str(json)
        .map_err(|e| LlmError::InvalidResponse(format!("failed to decode model JSON: {}", e)))?;

    Ok(raw.into_intent())
}

impl RawModelResponse {
    fn into_intent(self) -> IntentResult {
        let intent = self.intent.as_deref().map(|s| s.trim().to_lowercase());
        let source = match intent.as_deref() {
            Some("add_transaction") => IntentSource::Chat,
            Some("bill_payment") => IntentSource::Slip,
            Some("query_summary") => {
                return match self.filters {
                    Some(filters) => IntentResult::QuerySummary {
                        filters: filters.into_filters(),
                    },
                    None => IntentResult::Unknown,
                };
            }
            _ => return IntentResult::Unknown,
        };

        let Some(raw) = self.transaction else {
            return IntentResult::Unknown;
        };

        let confidence = self
            .confidence
            .as_ref()
            .and_then(RawNumber::value)
            .or_else(|| raw.confidence.as_ref().and_then(RawNumber::value))
            .map(|value| value.clamp(0.0, 1.0));

        IntentResult::AddTransaction {
            source,
            transaction: raw.into_transaction(confidence),
        }
    }
}

impl RawTransaction {
    fn into_transaction(self, confidence: Option<f64>) -> ParsedTransaction {
        let currency = non_empty(self.currency)
            .map(|c| c.to_uppercase())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

        ParsedTransaction {
            txn_date: self.txn_date.as_deref().and_then(parse_model_date),
            amount: self
                .amount
                .as_ref()
                .and_then(RawNumber::value)
                .filter(|amount| *amount >= 0.0)
                .map(round_amount),
            currency,
            direction: self.direction.as_deref().and_then(Direction::parse),
            channel: self.channel.as_deref().and_then(Channel::from_token),
            account_label: non_empty(self.account_label),
            category: self.category.as_deref().and_then(Category::from_token),
            description: non_empty(self.description),
            confidence,
        }
    }
}

impl RawFilters {
    fn into_filters(self) -> QueryFilters {
        let period = self
            .period
            .map(|period| PeriodFilter {
                kind: period.kind.as_deref().map(PeriodType::parse).unwrap_or_default(),
                from: period.from.as_deref().and_then(parse_model_date),
                to: period.to.as_deref().and_then(parse_model_date),
            })
            .unwrap_or_default();

        QueryFilters {
            direction: SummaryDirection::parse(self.direction.as_deref().unwrap_or("")),
            period,
            category: self.category.as_deref().and_then(Category::from_token),
            // "unknown" as a filter means no channel
            channel: self
                .channel
                .as_deref()
                .and_then(Channel::from_token)
                .filter(|channel| *channel != Channel::Unknown),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && v != "null")
}

/// `YYYY-MM-DD`, optionally followed by a time; Buddhist years are converted
fn parse_model_date(value: &str) -> Option<NaiveDate> {
    let date_part = value.trim().get(..10)?;
    let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()?;
    if date.year() >= 2500 {
        return NaiveDate::from_ymd_opt(date.year() - 543, date.month(), date.day());
    }
    Some(date)
}
