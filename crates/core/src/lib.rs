//! Core types and traits for cash-track
//!
//! This crate provides the foundation shared by every other crate:
//! - Transaction, query and intent types
//! - The period calculator (cutoff-day billing cycles)
//! - Collaborator traits (language model, text recognition, repository)
//! - Clock abstraction and the shared error type

pub mod clock;
pub mod error;
pub mod intent;
pub mod language;
pub mod period;
pub mod query;
pub mod traits;
pub mod transaction;
pub mod user;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{Error, Result};
pub use intent::{IntentResult, IntentSource};
pub use language::Language;
pub use period::{calendar_month, cutoff_range, previous_calendar_month, resolve_period, year_range};
pub use query::{
    CategoryAmount, ChannelAmount, DashboardSummary, DateRange, PeriodFilter, PeriodType,
    QueryFilters, RangeFilter, SummaryDirection, SummaryQuery, SummaryTotals,
};
pub use traits::{LanguageModel, Repository, TextRecognizer};
pub use transaction::{
    Category, Channel, Confirmation, Direction, NewTransaction, OcrUpdate, ParsedTransaction,
    round_amount, Transaction, TransactionStatus, DEFAULT_CURRENCY,
};
pub use user::{User, DEFAULT_USER_NAME};
