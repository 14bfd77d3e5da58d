//! Prompt templates
//!
//! Both templates demand a single raw JSON object. Placeholders are filled by
//! plain substitution so the JSON braces need no escaping.

use chrono::NaiveDate;

use cash_track_core::Language;

const CHAT_TEMPLATE: &str = r#"You are a strict JSON parser for a single-user personal finance tracker.
User writes informal Thai or English messages about expenses and incomes.
UI language: {language}. Prefer interpreting category/channel labels in that language when ambiguous.

You MUST respond with ONLY raw JSON. No explanation. No markdown.

Supported intents:
- "add_transaction": user logs a new income/expense/transfer.
- "query_summary": user asks for totals or breakdowns over some time period.
- "unknown": cannot confidently interpret the message.

When intent = "add_transaction", use this JSON format:

{
  "intent": "add_transaction",
  "transaction": {
    "txn_date": "YYYY-MM-DD or null",
    "amount": number or null,
    "currency": "THB",
    "direction": "income" | "expense" | "transfer",
    "channel": "cash" | "scb" | "kbank" | "tmw" | "bbl" | "ktb" | "unknown",
    "account_label": "string or null",
    "category": "food" | "rent" | "shopping" | "transport" | "bill" | "debt" | "other",
    "description": "string or null"
  }
}

When the user message is unclear or missing required information (like amount),
set those fields to null. NEVER guess.

When intent = "query_summary", use this JSON format:

{
  "intent": "query_summary",
  "filters": {
    "direction": "income" | "expense" | "both",
    "period": {
      "type": "month" | "day" | "range" | "year" | "all",
      "from": "YYYY-MM-DD or null",
      "to": "YYYY-MM-DD or null"
    },
    "category": "string or null",
    "channel": "string or null"
  }
}

If you really cannot understand, respond with:

{
  "intent": "unknown"
}

Today's date is: {today}

User message:
{message}"#;

const SLIP_TEMPLATE: &str = r#"You are a strict JSON parser for Thai payment receipts (OCR text).
Dates are in Thai Buddhist calendar. Convert them to Gregorian by subtracting 543.
Timezone is Asia/Bangkok.

You MUST respond with ONLY raw JSON. No explanation. No markdown.

Use this JSON format:

{
  "intent": "bill_payment",
  "transaction": {
    "txn_date": "YYYY-MM-DD or null",
    "amount": number or null,
    "currency": "THB",
    "direction": "expense",
    "channel": "tmw" | "scb" | "kbank" | "bbl" | "ktb" | "cash" | "unknown",
    "account_label": "string or null",
    "category": "food" | "bill" | "shopping" | "transport" | "other",
    "description": "string or null"
  },
  "confidence": 0.0 to 1.0
}

Channel mapping:
- TrueMoney, truemoney, TMW -> "tmw"
- SCB, ธนาคารไทยพาณิชย์ -> "scb"
- KBank, กสิกร, K PLUS -> "kbank"
- Bangkok Bank, กรุงเทพ, BBL -> "bbl"
- Krungthai, กรุงไทย, KTB -> "ktb"
- PromptPay can be any bank, try to identify from context

Category hints:
- Food/restaurant names, ร้านอาหาร -> "food"
- Electricity, water, internet, phone -> "bill"
- Shopee, Lazada, online shopping -> "shopping"
- Grab, Bolt, taxi, BTS, MRT -> "transport"

Only fill fields when the information is clearly present or strongly implied.
If unclear, use null. Set confidence based on how certain you are.

OCR Text:
{slip_text}"#;

/// Prompt for a typed chat message
pub fn chat_prompt(message: &str, language: Language, today: NaiveDate) -> String {
    // user text goes in last so it is never scanned for placeholders
    CHAT_TEMPLATE
        .replace("{language}", language.display_name())
        .replace("{today}", &today.format("%Y-%m-%d").to_string())
        .replace("{message}", message)
}

/// Prompt for recognized slip text
pub fn slip_prompt(slip_text: &str) -> String {
    SLIP_TEMPLATE.replace("{slip_text}", slip_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_prompt_parameters() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        let prompt = chat_prompt("กาแฟ 60 บาท", Language::English, today);
        assert!(prompt.contains("UI language: English."));
        assert!(prompt.contains("Today's date is: 2026-01-15"));
        assert!(prompt.ends_with("User message:\nกาแฟ 60 บาท"));
        assert!(prompt.contains(r#""intent": "query_summary""#));
    }

    #[test]
    fn test_message_placeholders_are_not_expanded() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        let prompt = chat_prompt("{today} {language}", Language::Thai, today);
        assert!(prompt.ends_with("{today} {language}"));
    }

    #[test]
    fn test_slip_prompt() {
        let prompt = slip_prompt("จำนวนเงิน 96.00");
        assert!(prompt.contains(r#""intent": "bill_payment""#));
        assert!(prompt.ends_with("OCR Text:\nจำนวนเงิน 96.00"));
    }
}
