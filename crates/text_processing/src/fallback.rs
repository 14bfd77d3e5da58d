//! Rule-based interpreter
//!
//! Deterministic stand-in for the language model: same three intents, built
//! only from the lexical extractors.

use chrono::{Datelike, Duration, NaiveDate};

use cash_track_core::{
    calendar_month, previous_calendar_month, year_range, Direction, IntentResult, IntentSource,
    ParsedTransaction, PeriodFilter, PeriodType, QueryFilters, SummaryDirection,
    DEFAULT_CURRENCY,
};

use crate::extraction::{
    contains_any, extract_amount, extract_category, extract_channel, extract_date,
    extract_direction, is_summary_query,
};

/// Confidence reported for every rule-based extraction
pub const FALLBACK_CONFIDENCE: f64 = 0.2;

const SLIP_DESCRIPTION: &str = "slip payment";

const INCOME_QUERY: (&[&str], &[&str]) = (&["รายรับ", "ได้เงิน", "เงินเข้า"], &["income", "earned"]);
const BOTH_QUERY: (&[&str], &[&str]) = (&["ทั้งสอง", "รวม"], &["both"]);
const LAST_MONTH: (&[&str], &[&str]) = (&["เดือนที่แล้ว"], &["last month"]);
const THIS_YEAR: (&[&str], &[&str]) = (&["ปีนี้"], &["this year"]);
const LAST_YEAR: (&[&str], &[&str]) = (&["ปีที่แล้ว"], &["last year"]);
const TODAY: (&[&str], &[&str]) = (&["วันนี้"], &["today"]);
const YESTERDAY: (&[&str], &[&str]) = (&["เมื่อวาน"], &["yesterday"]);

fn mentions(lower: &str, (thai, english): (&[&str], &[&str])) -> bool {
    contains_any(lower, thai, english)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedInterpreter;

impl RuleBasedInterpreter {
    pub fn new() -> Self {
        Self
    }

    /// Interpret a chat message, or slip text when present
    pub fn interpret(
        &self,
        message: &str,
        slip_text: Option<&str>,
        today: NaiveDate,
    ) -> IntentResult {
        match slip_text {
            Some(slip) if !slip.trim().is_empty() => self.interpret_slip(slip, today),
            _ => self.interpret_message(message, today),
        }
    }

    pub fn interpret_message(&self, message: &str, today: NaiveDate) -> IntentResult {
        if is_summary_query(message) {
            return IntentResult::QuerySummary {
                filters: summary_filters(message, today),
            };
        }

        let Some(amount) = extract_amount(message) else {
            tracing::debug!(chars = message.chars().count(), "No amount in message");
            return IntentResult::Unknown;
        };

        let description = message.trim();
        IntentResult::AddTransaction {
            source: IntentSource::Chat,
            transaction: ParsedTransaction {
                txn_date: extract_date(message, today),
                amount: Some(amount),
                currency: DEFAULT_CURRENCY.to_string(),
                direction: Some(extract_direction(message, Direction::Expense)),
                channel: extract_channel(message),
                account_label: None,
                category: extract_category(message),
                description: (!description.is_empty()).then(|| description.to_string()),
                confidence: Some(FALLBACK_CONFIDENCE),
            },
        }
    }

    pub fn interpret_slip(&self, slip_text: &str, today: NaiveDate) -> IntentResult {
        let Some(amount) = extract_amount(slip_text) else {
            tracing::debug!(chars = slip_text.chars().count(), "No amount in slip text");
            return IntentResult::Unknown;
        };

        IntentResult::AddTransaction {
            source: IntentSource::Slip,
            transaction: ParsedTransaction {
                txn_date: extract_date(slip_text, today),
                amount: Some(amount),
                currency: DEFAULT_CURRENCY.to_string(),
                direction: Some(Direction::Expense),
                channel: extract_channel(slip_text),
                account_label: None,
                category: extract_category(slip_text),
                description: Some(SLIP_DESCRIPTION.to_string()),
                confidence: Some(FALLBACK_CONFIDENCE),
            },
        }
    }
}

/// Filters for a summary question; defaults to this calendar month's expenses
fn summary_filters(message: &str, today: NaiveDate) -> QueryFilters {
    let lower = message.to_lowercase();

    let direction = if mentions(&lower, INCOME_QUERY) {
        SummaryDirection::Income
    } else if mentions(&lower, BOTH_QUERY) {
        SummaryDirection::Both
    } else {
        SummaryDirection::Expense
    };

    let period = if mentions(&lower, LAST_MONTH) {
        let range = previous_calendar_month(today);
        PeriodFilter::range(range.from, range.to)
    } else if mentions(&lower, THIS_YEAR) {
        let range = year_range(today.year());
        PeriodFilter::range(range.from, range.to)
    } else if mentions(&lower, LAST_YEAR) {
        let range = year_range(today.year() - 1);
        PeriodFilter::range(range.from, range.to)
    } else if mentions(&lower, TODAY) {
        PeriodFilter {
            kind: PeriodType::Day,
            from: Some(today),
            to: Some(today),
        }
    } else if mentions(&lower, YESTERDAY) {
        PeriodFilter::day(today - Duration::days(1))
    } else {
        let range = calendar_month(today);
        PeriodFilter::range(range.from, range.to)
    };

    QueryFilters {
        direction,
        period,
        category: extract_category(&lower),
        channel: extract_channel(&lower),
    }
}
