//! Transaction types: extracted candidates and persisted records

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::Language;

/// Default currency for every record
pub const DEFAULT_CURRENCY: &str = "THB";

/// Round a money amount to two fractional digits
pub fn round_amount(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Money flow direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Income,
    #[default]
    Expense,
    Transfer,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Transfer => "transfer",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "income" => Some(Self::Income),
            "expense" => Some(Self::Expense),
            "transfer" => Some(Self::Transfer),
            _ => None,
        }
    }
}

/// Payment channel (bank or wallet)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Cash,
    Scb,
    Kbank,
    Tmw,
    Bbl,
    Ktb,
    Unknown,
}

impl Channel {
    pub const ALL: [Channel; 7] = [
        Channel::Cash,
        Channel::Scb,
        Channel::Kbank,
        Channel::Tmw,
        Channel::Bbl,
        Channel::Ktb,
        Channel::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Scb => "scb",
            Self::Kbank => "kbank",
            Self::Tmw => "tmw",
            Self::Bbl => "bbl",
            Self::Ktb => "ktb",
            Self::Unknown => "unknown",
        }
    }

    /// Map a channel token (canonical or a known provider alias).
    ///
    /// Empty input is "no channel"; any other unrecognised token is `Unknown`.
    pub fn from_token(token: &str) -> Option<Self> {
        let token = token.trim().to_lowercase();
        let channel = match token.as_str() {
            "" => return None,
            "cash" | "เงินสด" => Self::Cash,
            "scb" | "scb easy" | "ไทยพาณิชย์" | "ธนาคารไทยพาณิชย์" => Self::Scb,
            "kbank" | "k plus" | "kplus" | "k-plus" | "กสิกร" | "กสิกรไทย" => Self::Kbank,
            "tmw" | "truemoney" | "true money" | "truemoney wallet" | "ทรูมันนี่" => Self::Tmw,
            "bbl" | "bangkok bank" | "bualuang" | "กรุงเทพ" | "ธนาคารกรุงเทพ" => Self::Bbl,
            "ktb" | "krungthai" | "krungthai bank" | "กรุงไทย" => Self::Ktb,
            _ => Self::Unknown,
        };
        Some(channel)
    }
}

/// Spending category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Food,
    Rent,
    Shopping,
    Transport,
    Bill,
    Debt,
    Other,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Food,
        Category::Rent,
        Category::Shopping,
        Category::Transport,
        Category::Bill,
        Category::Debt,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Rent => "rent",
            Self::Shopping => "shopping",
            Self::Transport => "transport",
            Self::Bill => "bill",
            Self::Debt => "debt",
            Self::Other => "other",
        }
    }

    /// Map a category token. Empty or "uncategorized" is no category,
    /// anything unrecognised is `Other`.
    pub fn from_token(token: &str) -> Option<Self> {
        let token = token.trim().to_lowercase();
        let category = match token.as_str() {
            "" | "uncategorized" => return None,
            "food" => Self::Food,
            "rent" => Self::Rent,
            "shopping" => Self::Shopping,
            "transport" => Self::Transport,
            "bill" | "bills" => Self::Bill,
            "debt" => Self::Debt,
            _ => Self::Other,
        };
        Some(category)
    }

    /// Localized label used in replies
    pub fn label(&self, language: Language) -> &'static str {
        match language {
            Language::English => match self {
                Self::Food => "food",
                Self::Rent => "rent",
                Self::Shopping => "shopping",
                Self::Transport => "transport",
                Self::Bill => "bills",
                Self::Debt => "debt",
                Self::Other => "other",
            },
            Language::Thai => match self {
                Self::Food => "อาหาร",
                Self::Rent => "ค่าเช่า",
                Self::Shopping => "ช้อปปิ้ง",
                Self::Transport => "เดินทาง",
                Self::Bill => "ค่าบริการ",
                Self::Debt => "หนี้สิน",
                Self::Other => "อื่นๆ",
            },
        }
    }
}

/// Completeness state of a stored transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Confirmed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "confirmed" => Some(Self::Confirmed),
            _ => None,
        }
    }
}

/// Transaction candidate extracted from a chat message or slip text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedTransaction {
    pub txn_date: Option<NaiveDate>,
    /// Non-negative, at most two fractional digits
    pub amount: Option<f64>,
    pub currency: String,
    pub direction: Option<Direction>,
    pub channel: Option<Channel>,
    pub account_label: Option<String>,
    pub category: Option<Category>,
    pub description: Option<String>,
    /// Self-reported model certainty, 0.2 on the rule-based path
    pub confidence: Option<f64>,
}

impl Default for ParsedTransaction {
    fn default() -> Self {
        Self {
            txn_date: None,
            amount: None,
            currency: DEFAULT_CURRENCY.to_string(),
            direction: None,
            channel: None,
            account_label: None,
            category: None,
            description: None,
            confidence: None,
        }
    }
}

impl ParsedTransaction {
    /// Amount if one was found and it is non-zero
    pub fn positive_amount(&self) -> Option<f64> {
        self.amount.filter(|amount| *amount > 0.0)
    }
}

/// Fields for a new transaction row
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub txn_date: Option<NaiveDate>,
    pub amount: Option<f64>,
    pub currency: String,
    pub direction: Direction,
    pub channel: Option<Channel>,
    pub account_label: Option<String>,
    pub category: Option<Category>,
    pub description: Option<String>,
    pub slip_image_path: Option<String>,
    pub raw_ocr_text: Option<String>,
    pub llm_confidence: Option<f64>,
    pub status: TransactionStatus,
}

impl NewTransaction {
    /// Placeholder row for an uploaded slip awaiting recognition
    pub fn pending_slip(slip_image_path: impl Into<String>) -> Self {
        Self {
            txn_date: None,
            amount: None,
            currency: DEFAULT_CURRENCY.to_string(),
            direction: Direction::Expense,
            channel: None,
            account_label: None,
            category: None,
            description: None,
            slip_image_path: Some(slip_image_path.into()),
            raw_ocr_text: None,
            llm_confidence: None,
            status: TransactionStatus::Pending,
        }
    }
}

/// Result of the background slip job
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OcrUpdate {
    pub raw_text: String,
    pub amount: Option<f64>,
    pub txn_date: Option<NaiveDate>,
    pub channel: Option<Channel>,
    pub category: Option<Category>,
    pub description: Option<String>,
    pub llm_confidence: Option<f64>,
}

/// Manually completed fields from the confirmation form
#[derive(Debug, Clone, PartialEq)]
pub struct Confirmation {
    pub amount: f64,
    pub txn_date: Option<NaiveDate>,
    pub direction: Direction,
    pub channel: Option<Channel>,
    pub account_label: Option<String>,
    pub category: Option<Category>,
    pub description: Option<String>,
}

/// Persisted transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    pub txn_date: Option<NaiveDate>,
    pub amount: Option<f64>,
    pub currency: String,
    pub direction: Direction,
    pub channel: Option<Channel>,
    pub account_label: Option<String>,
    pub category: Option<Category>,
    pub description: Option<String>,
    pub slip_image_path: Option<String>,
    pub raw_ocr_text: Option<String>,
    pub llm_confidence: Option<f64>,
    pub status: TransactionStatus,
    pub created_at: String,
    pub updated_at: String,
}
