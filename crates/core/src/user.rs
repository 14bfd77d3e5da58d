//! User profile

use serde::{Deserialize, Serialize};

/// Name of the implicit single-browser user
pub const DEFAULT_USER_NAME: &str = "default";

pub const MIN_CUTOFF_DAY: u32 = 1;
pub const MAX_CUTOFF_DAY: u32 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    /// Day of month the accounting cycle starts on, 1..=30
    pub cutoff_day: u32,
    pub created_at: String,
}

impl User {
    pub fn is_default(&self) -> bool {
        self.name == DEFAULT_USER_NAME
    }
}

pub fn is_valid_cutoff_day(day: u32) -> bool {
    (MIN_CUTOFF_DAY..=MAX_CUTOFF_DAY).contains(&day)
}
