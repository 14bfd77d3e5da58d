//! Date extraction

use chrono::{Duration, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

use super::keywords::contains_word;

static ISO_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^0-9A-Za-z_])([0-9]{4})-([0-9]{2})-([0-9]{2})(?:$|[^0-9A-Za-z_])").unwrap()
});

/// D/M/Y or D-M-Y with a four-digit year
static DMY_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^0-9A-Za-z_])([0-9]{1,2})[/-]([0-9]{1,2})[/-]([0-9]{4})(?:$|[^0-9A-Za-z_])")
        .unwrap()
});

/// Years at or above this are Buddhist era
const BUDDHIST_ERA_THRESHOLD: i32 = 2500;
const BUDDHIST_ERA_OFFSET: i32 = 543;

const YESTERDAY: &[&str] = &["เมื่อวาน"];
const YESTERDAY_EN: &[&str] = &["yesterday"];
const TODAY: &[&str] = &["วันนี้", "เมื่อกี้"];
const TODAY_EN: &[&str] = &["today"];

/// Extract a transaction date.
///
/// Priority: ISO `YYYY-MM-DD`, then `D/M/Y` (Buddhist years converted),
/// then relative words resolved against `today`. Impossible calendar dates
/// are skipped.
pub fn extract_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    if let Some(date) = ISO_DATE.captures(text).and_then(|caps| {
        let year = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        let day = caps[3].parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    }) {
        return Some(date);
    }

    if let Some(date) = DMY_DATE.captures(text).and_then(|caps| {
        let day = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        let mut year: i32 = caps[3].parse().ok()?;
        if year >= BUDDHIST_ERA_THRESHOLD {
            year -= BUDDHIST_ERA_OFFSET;
        }
        NaiveDate::from_ymd_opt(year, month, day)
    }) {
        return Some(date);
    }

    let lower = text.to_lowercase();
    if YESTERDAY.iter().any(|k| lower.contains(k))
        || YESTERDAY_EN.iter().any(|k| contains_word(&lower, k))
    {
        return Some(today - Duration::days(1));
    }
    if TODAY.iter().any(|k| lower.contains(k))
        || TODAY_EN.iter().any(|k| contains_word(&lower, k))
    {
        return Some(today);
    }

    None
}
