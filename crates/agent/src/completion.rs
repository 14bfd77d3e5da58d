//! Transaction completion policy
//!
//! Fills defaults, retries amount extraction on the raw input, and decides
//! whether the record can be confirmed right away.

use cash_track_core::{
    Category, Channel, Direction, Language, NewTransaction, ParsedTransaction, TransactionStatus,
    DEFAULT_CURRENCY,
};
use cash_track_text_processing::extract_amount;

/// Field the user is asked to supply for a pending record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingField {
    Category,
    Channel,
}

impl MissingField {
    pub fn label(&self, language: Language) -> &'static str {
        match (self, language) {
            (Self::Category, Language::English) => "category",
            (Self::Channel, Language::English) => "channel",
            (Self::Category, Language::Thai) => "หมวดหมู่",
            (Self::Channel, Language::Thai) => "ช่องทาง",
        }
    }
}

/// A parsed transaction after the completion policy ran
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub txn_date: Option<chrono::NaiveDate>,
    /// Zero when nothing could be extracted
    pub amount: f64,
    pub currency: String,
    pub direction: Direction,
    pub channel: Option<Channel>,
    pub account_label: Option<String>,
    pub category: Option<Category>,
    pub description: Option<String>,
    pub confidence: Option<f64>,
    pub status: TransactionStatus,
    /// Category and channel gaps, in that order
    pub missing: Vec<MissingField>,
}

impl Completion {
    pub fn is_confirmed(&self) -> bool {
        self.status == TransactionStatus::Confirmed
    }

    /// Row fields, carrying the slip reference and recognized text if any
    pub fn to_new_transaction(
        &self,
        slip_image_path: Option<&str>,
        raw_ocr_text: Option<&str>,
    ) -> NewTransaction {
        NewTransaction {
            txn_date: self.txn_date,
            amount: Some(self.amount).filter(|amount| *amount > 0.0),
            currency: self.currency.clone(),
            direction: self.direction,
            channel: self.channel,
            account_label: self.account_label.clone(),
            category: self.category,
            description: self.description.clone(),
            slip_image_path: slip_image_path.map(str::to_string),
            raw_ocr_text: raw_ocr_text.map(str::to_string),
            llm_confidence: self.confidence,
            status: self.status,
        }
    }
}

/// Apply defaults and the completeness rule.
///
/// A missing amount is retried once against the message, or the slip text
/// when the message is blank. The record is pending unless amount, category
/// and channel are all present.
pub fn complete(parsed: &ParsedTransaction, message: &str, slip_text: Option<&str>) -> Completion {
    let amount = parsed.positive_amount().or_else(|| {
        let raw = if !message.trim().is_empty() {
            Some(message)
        } else {
            slip_text
        };
        raw.and_then(extract_amount)
    });

    let currency = if parsed.currency.trim().is_empty() {
        DEFAULT_CURRENCY.to_string()
    } else {
        parsed.currency.clone()
    };

    let mut missing = Vec::new();
    if parsed.category.is_none() {
        missing.push(MissingField::Category);
    }
    if parsed.channel.is_none() {
        missing.push(MissingField::Channel);
    }

    let status = if amount.is_some() && missing.is_empty() {
        TransactionStatus::Confirmed
    } else {
        TransactionStatus::Pending
    };

    Completion {
        txn_date: parsed.txn_date,
        amount: amount.unwrap_or(0.0),
        currency,
        direction: parsed.direction.unwrap_or_default(),
        channel: parsed.channel,
        account_label: parsed.account_label.clone(),
        category: parsed.category,
        description: parsed.description.clone(),
        confidence: parsed.confidence,
        status,
        missing,
    }
}
