//! Text processing for cash-track
//!
//! Features:
//! - Lexical extractors for amount, date, direction, channel and category
//!   (Thai and English keyword rules, Buddhist-era dates)
//! - Summary-query detection
//! - Rule-based interpreter used when the language model is unavailable

pub mod extraction;
pub mod fallback;

pub use extraction::{
    extract_amount, extract_category, extract_channel, extract_date, extract_direction,
    is_summary_query,
};
pub use fallback::{RuleBasedInterpreter, FALLBACK_CONFIDENCE};
