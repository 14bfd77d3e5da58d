//! Lexical extractors
//!
//! Pure functions over raw chat or slip text. Matching is case-insensitive;
//! Thai keywords match as substrings, English keywords on ASCII word
//! boundaries.

mod amount;
mod date;
mod keywords;

pub use amount::extract_amount;
pub use date::extract_date;
pub use keywords::{extract_category, extract_channel, extract_direction, is_summary_query};

pub(crate) use keywords::contains_any;
