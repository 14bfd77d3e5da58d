//! Amount extraction

use once_cell::sync::Lazy;
use regex::Regex;

use cash_track_core::round_amount;

/// Number directly followed by a baht unit
static AMOUNT_WITH_UNIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)([0-9]{1,3}(?:,[0-9]{3})+(?:\.[0-9]+)?|[0-9]+(?:\.[0-9]+)?)\s*(?:บาท|฿|thb)")
        .unwrap()
});

static BARE_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9]{1,3}(?:,[0-9]{3})+(?:\.[0-9]+)?|[0-9]+(?:\.[0-9]+)?").unwrap()
});

/// Extract a money amount.
///
/// A number followed by "บาท", "฿" or "thb" wins; otherwise the last bare
/// number in the text is taken (totals sit at the bottom of receipts).
/// Returns `None` when nothing positive is found.
pub fn extract_amount(text: &str) -> Option<f64> {
    let token = match AMOUNT_WITH_UNIT.captures(text) {
        Some(caps) => caps.get(1).map(|m| m.as_str()),
        None => BARE_NUMBER.find_iter(text).last().map(|m| m.as_str()),
    }?;

    parse_number(token).filter(|amount| *amount > 0.0)
}

fn parse_number(token: &str) -> Option<f64> {
    token
        .replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .map(round_amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_with_unit() {
        assert_eq!(extract_amount("กินข้าว 50 บาท"), Some(50.0));
        assert_eq!(extract_amount("ค่าไฟ 1,234.50 บาท"), Some(1234.50));
        assert_eq!(extract_amount("coffee 65thb"), Some(65.0));
        assert_eq!(extract_amount("Coffee 65 THB"), Some(65.0));
        assert_eq!(extract_amount("ค่าแท็กซี่ 120฿"), Some(120.0));
    }

    #[test]
    fn test_unit_beats_other_numbers() {
        assert_eq!(extract_amount("โต๊ะ 12 ข้าว 2 จาน 150 บาท ทิป 20"), Some(150.0));
        assert_eq!(extract_amount("วันที่ 2026-01-30 ค่าเช่า 8,500 บาท"), Some(8500.0));
    }

    #[test]
    fn test_last_bare_number() {
        assert_eq!(extract_amount("ยอด 96.00"), Some(96.0));
        assert_eq!(extract_amount("30/01/2569 จำนวนเงิน 96.00 TrueMoney"), Some(96.0));
        assert_eq!(extract_amount("ref 123456 total 1,050.75"), Some(1050.75));
    }

    #[test]
    fn test_no_amount() {
        assert_eq!(extract_amount("กินข้าว"), None);
        assert_eq!(extract_amount(""), None);
        assert_eq!(extract_amount("0 บาท"), None);
    }

    #[test]
    fn test_rounding() {
        assert_eq!(extract_amount("99.999 บาท"), Some(100.0));
        assert_eq!(extract_amount("12.346 บาท"), Some(12.35));
    }

    #[test]
    fn test_idempotent() {
        let text = "ค่าน้ำ 300 บาท โอนผ่าน scb";
        assert_eq!(extract_amount(text), extract_amount(text));
    }
}
