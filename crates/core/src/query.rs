//! Summary query descriptors and aggregate shapes

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::transaction::{Category, Channel, Direction};

/// Semantic period kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PeriodType {
    #[default]
    Month,
    Day,
    Range,
    Year,
    All,
}

impl PeriodType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Month => "month",
            Self::Day => "day",
            Self::Range => "range",
            Self::Year => "year",
            Self::All => "all",
        }
    }

    /// Unrecognised values fall back to `Month`
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "day" => Self::Day,
            "range" => Self::Range,
            "year" => Self::Year,
            "all" => Self::All,
            _ => Self::Month,
        }
    }
}

/// Period request with optional explicit bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PeriodFilter {
    #[serde(rename = "type")]
    pub kind: PeriodType,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl PeriodFilter {
    pub fn range(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            kind: PeriodType::Range,
            from: Some(from),
            to: Some(to),
        }
    }

    pub fn day(date: NaiveDate) -> Self {
        Self::range(date, date)
    }

    pub fn of(kind: PeriodType) -> Self {
        Self {
            kind,
            from: None,
            to: None,
        }
    }
}

/// Which totals a summary should report. `Both` also covers an empty direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SummaryDirection {
    Income,
    Expense,
    #[default]
    Both,
}

impl SummaryDirection {
    pub fn parse(value: &str) -> Self {
        match Direction::parse(value) {
            Some(Direction::Income) => Self::Income,
            Some(Direction::Expense) => Self::Expense,
            _ => Self::Both,
        }
    }

    pub fn includes_expense(&self) -> bool {
        matches!(self, Self::Expense | Self::Both)
    }

    pub fn includes_income(&self) -> bool {
        matches!(self, Self::Income | Self::Both)
    }
}

/// Summary query candidate
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QueryFilters {
    pub direction: SummaryDirection,
    pub period: PeriodFilter,
    pub category: Option<Category>,
    pub channel: Option<Channel>,
}

/// Inclusive calendar range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}

/// Repository summary query
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryQuery {
    pub direction: SummaryDirection,
    pub range: DateRange,
    pub category: Option<Category>,
    pub channel: Option<Channel>,
}

/// Expense and income totals. A total is only computed when the direction asks for it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SummaryTotals {
    pub total_expense: f64,
    pub total_income: f64,
}

/// Range listing with optional category/channel narrowing
#[derive(Debug, Clone, PartialEq)]
pub struct RangeFilter {
    pub range: DateRange,
    pub category: Option<String>,
    pub channel: Option<String>,
    pub limit: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAmount {
    pub category: String,
    pub amount: f64,
    pub percent_of_expense: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelAmount {
    pub channel: String,
    pub amount: f64,
}

/// Dashboard payload for one range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub total_expense: f64,
    pub total_income: f64,
    pub net: f64,
    pub by_category: Vec<CategoryAmount>,
    pub by_channel: Vec<ChannelAmount>,
}
