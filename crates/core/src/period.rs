//! Period calculator: semantic period requests to inclusive date ranges

use chrono::{Datelike, NaiveDate};

use crate::query::{DateRange, PeriodFilter, PeriodType};
use crate::user::is_valid_cutoff_day;

/// Lower bound for "all time"
pub fn epoch_floor() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Resolve a period request against a user's cutoff day.
///
/// Returns `None` only for a `range` request missing one of its bounds.
pub fn resolve_period(
    filter: &PeriodFilter,
    cutoff_day: u32,
    today: NaiveDate,
) -> Option<DateRange> {
    match filter.kind {
        PeriodType::Range => match (filter.from, filter.to) {
            (Some(from), Some(to)) => Some(DateRange::new(from, to)),
            _ => None,
        },
        PeriodType::Day => Some(DateRange::new(today, today)),
        PeriodType::Year => Some(year_range(today.year())),
        PeriodType::All => Some(DateRange::new(epoch_floor(), today)),
        PeriodType::Month => match (filter.from, filter.to) {
            (Some(from), Some(to)) => Some(DateRange::new(from, to)),
            _ => Some(cutoff_range(today, cutoff_day)),
        },
    }
}

/// Billing cycle containing `today` that starts on `cutoff_day`.
///
/// Out-of-range cutoff days snap to 1. The cycle ends the day before the next
/// cutoff; day numbers past a month's end clamp to its last day.
pub fn cutoff_range(today: NaiveDate, cutoff_day: u32) -> DateRange {
    let cutoff = if is_valid_cutoff_day(cutoff_day) {
        cutoff_day
    } else {
        1
    };

    let (year, month) = (today.year(), today.month());
    let (start_year, start_month) = if today.day() >= cutoff {
        (year, month)
    } else {
        shift_month(year, month, -1)
    };
    let (end_year, end_month) = shift_month(start_year, start_month, 1);

    DateRange::new(
        clamped_date(start_year, start_month, cutoff),
        clamped_date(end_year, end_month, cutoff - 1),
    )
}

/// Calendar month containing `today`
pub fn calendar_month(today: NaiveDate) -> DateRange {
    let (year, month) = (today.year(), today.month());
    DateRange::new(
        clamped_date(year, month, 1),
        clamped_date(year, month, days_in_month(year, month)),
    )
}

/// Calendar month before the one containing `today`
pub fn previous_calendar_month(today: NaiveDate) -> DateRange {
    let (year, month) = shift_month(today.year(), today.month(), -1);
    calendar_month(clamped_date(year, month, 1))
}

pub fn year_range(year: i32) -> DateRange {
    DateRange::new(clamped_date(year, 1, 1), clamped_date(year, 12, 31))
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = shift_month(year, month, 1);
    match (
        NaiveDate::from_ymd_opt(year, month, 1),
        NaiveDate::from_ymd_opt(next_year, next_month, 1),
    ) {
        (Some(first), Some(next)) => (next - first).num_days() as u32,
        _ => 30,
    }
}

fn shift_month(year: i32, month: u32, delta: i32) -> (i32, u32) {
    let index = year * 12 + month as i32 - 1 + delta;
    (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
}

/// Day 0 is the last day of the preceding month; days past the end clamp to the last day
fn clamped_date(year: i32, month: u32, day: u32) -> NaiveDate {
    if day == 0 {
        let (prev_year, prev_month) = shift_month(year, month, -1);
        return clamped_date(prev_year, prev_month, days_in_month(prev_year, prev_month));
    }
    let day = day.min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}
