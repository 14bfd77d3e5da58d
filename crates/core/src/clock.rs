//! Source of "today"

use chrono::{Duration, NaiveDate, Utc};

pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Wall clock shifted to a fixed UTC offset
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    utc_offset_hours: i32,
}

impl SystemClock {
    pub fn new(utc_offset_hours: i32) -> Self {
        Self { utc_offset_hours }
    }
}

impl Default for SystemClock {
    /// Asia/Bangkok
    fn default() -> Self {
        Self::new(7)
    }
}

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        (Utc::now() + Duration::hours(self.utc_offset_hours as i64)).date_naive()
    }
}

/// Clock pinned to one date
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
