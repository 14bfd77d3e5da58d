//! Localized chat replies

use cash_track_core::{DateRange, Language, QueryFilters, SummaryDirection, SummaryTotals};

use crate::completion::Completion;

/// Fixed replies that carry no extracted data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// Intent not understood
    Unknown,
    SaveFailed,
    FetchFailed,
}

impl Notice {
    pub fn text(&self, language: Language) -> &'static str {
        match (self, language) {
            (Self::Unknown, Language::English) => {
                "I didn't understand. Try something like 'lunch 50' or 'how much did I spend this month?'"
            }
            (Self::Unknown, Language::Thai) => {
                "ไม่เข้าใจคำสั่ง กรุณาลองพิมพ์ใหม่ เช่น 'วันนี้กินข้าวไป 50 บาท' หรือ 'เดือนนี้ใช้ไปเท่าไหร่'"
            }
            (Self::SaveFailed, Language::English) => "Unable to save the transaction.",
            (Self::SaveFailed, Language::Thai) => "ไม่สามารถบันทึกรายการได้",
            (Self::FetchFailed, Language::English) => "Unable to fetch data.",
            (Self::FetchFailed, Language::Thai) => "ไม่สามารถดึงข้อมูลได้",
        }
    }
}

/// Reply for a saved transaction
pub fn transaction_reply(completion: &Completion, language: Language) -> String {
    if !completion.is_confirmed() {
        return pending_reply(completion, language);
    }

    let mut reply = match language {
        Language::English => format!("Saved: {:.2} THB", completion.amount),
        Language::Thai => format!("บันทึกแล้ว: {:.2} บาท", completion.amount),
    };
    if let Some(category) = completion.category {
        match language {
            Language::English => reply.push_str(&format!(" ({})", category.label(language))),
            Language::Thai => reply.push_str(&format!(" หมวด{}", category.label(language))),
        }
    }
    if let Some(channel) = completion.channel {
        reply.push_str(&format!(" ({})", channel.as_str()));
    }
    if let Some(description) = completion.description.as_deref().filter(|d| !d.is_empty()) {
        reply.push_str(&format!(" - {}", description));
    }
    reply
}

fn pending_reply(completion: &Completion, language: Language) -> String {
    let mut reply = match language {
        Language::English => format!("Saved {:.2} THB - pending", completion.amount),
        Language::Thai => format!("บันทึก {:.2} บาท - รอยืนยัน", completion.amount),
    };

    if !completion.missing.is_empty() {
        let missing = completion
            .missing
            .iter()
            .map(|field| field.label(language))
            .collect::<Vec<_>>()
            .join(", ");
        match language {
            Language::English => reply.push_str(&format!(" (please provide: {})", missing)),
            Language::Thai => reply.push_str(&format!(" (กรุณาระบุ: {})", missing)),
        }
    }
    reply
}

/// Reply for a summary query over `range`
pub fn summary_reply(
    totals: SummaryTotals,
    filters: &QueryFilters,
    range: DateRange,
    language: Language,
) -> String {
    let mut reply = match (filters.direction, language) {
        (SummaryDirection::Expense, Language::English) => {
            format!("Spent {:.2} THB", totals.total_expense)
        }
        (SummaryDirection::Expense, Language::Thai) => {
            format!("ใช้ไป {:.2} บาท", totals.total_expense)
        }
        (SummaryDirection::Income, Language::English) => {
            format!("Income {:.2} THB", totals.total_income)
        }
        (SummaryDirection::Income, Language::Thai) => {
            format!("รายรับ {:.2} บาท", totals.total_income)
        }
        (SummaryDirection::Both, Language::English) => format!(
            "Expense {:.2} THB, Income {:.2} THB",
            totals.total_expense, totals.total_income
        ),
        (SummaryDirection::Both, Language::Thai) => format!(
            "รายจ่าย {:.2} บาท, รายรับ {:.2} บาท",
            totals.total_expense, totals.total_income
        ),
    };

    if let Some(category) = filters.category {
        match language {
            Language::English => reply.push_str(&format!(" ({})", category.label(language))),
            Language::Thai => reply.push_str(&format!(" (หมวด{})", category.label(language))),
        }
    }
    if let Some(channel) = filters.channel {
        reply.push_str(&format!(" ({})", channel.as_str()));
    }

    let (from, to) = (range.from.format("%Y-%m-%d"), range.to.format("%Y-%m-%d"));
    match language {
        Language::English => reply.push_str(&format!(" from {} to {}", from, to)),
        Language::Thai => reply.push_str(&format!(" ช่วง {} ถึง {}", from, to)),
    }
    reply
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::complete;
    use cash_track_core::{Category, Channel, ParsedTransaction};
    use chrono::NaiveDate;

    fn january() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
        )
    }

    fn completion(amount: f64, category: Option<Category>, channel: Option<Channel>) -> Completion {
        complete(
            &ParsedTransaction {
                amount: Some(amount),
                category,
                channel,
                description: Some("ข้าวมันไก่".to_string()),
                ..ParsedTransaction::default()
            },
            "",
            None,
        )
    }

    #[test]
    fn test_confirmed_reply() {
        let done = completion(50.0, Some(Category::Food), Some(Channel::Cash));
        assert_eq!(
            transaction_reply(&done, Language::Thai),
            "บันทึกแล้ว: 50.00 บาท หมวดอาหาร (cash) - ข้าวมันไก่"
        );
        assert_eq!(
            transaction_reply(&done, Language::English),
            "Saved: 50.00 THB (food) (cash) - ข้าวมันไก่"
        );
    }

    #[test]
    fn test_pending_reply_lists_only_missing_category() {
        let pending = completion(120.0, None, Some(Channel::Scb));
        assert_eq!(
            transaction_reply(&pending, Language::English),
            "Saved 120.00 THB - pending (please provide: category)"
        );
        assert_eq!(
            transaction_reply(&pending, Language::Thai),
            "บันทึก 120.00 บาท - รอยืนยัน (กรุณาระบุ: หมวดหมู่)"
        );
    }

    #[test]
    fn test_pending_reply_both_missing() {
        let pending = completion(10.0, None, None);
        assert_eq!(
            transaction_reply(&pending, Language::English),
            "Saved 10.00 THB - pending (please provide: category, channel)"
        );
    }

    #[test]
    fn test_summary_reply_expense() {
        let filters = QueryFilters {
            direction: SummaryDirection::Expense,
            category: Some(Category::Food),
            ..QueryFilters::default()
        };
        let totals = SummaryTotals {
            total_expense: 1234.5,
            total_income: 0.0,
        };
        assert_eq!(
            summary_reply(totals, &filters, january(), Language::Thai),
            "ใช้ไป 1234.50 บาท (หมวดอาหาร) ช่วง 2026-01-01 ถึง 2026-01-31"
        );
    }

    #[test]
    fn test_summary_reply_both_and_income() {
        let totals = SummaryTotals {
            total_expense: 500.0,
            total_income: 1000.0,
        };
        let both = QueryFilters::default();
        assert_eq!(
            summary_reply(totals, &both, january(), Language::English),
            "Expense 500.00 THB, Income 1000.00 THB from 2026-01-01 to 2026-01-31"
        );

        let income = QueryFilters {
            direction: SummaryDirection::Income,
            channel: Some(Channel::Kbank),
            ..QueryFilters::default()
        };
        assert_eq!(
            summary_reply(totals, &income, january(), Language::English),
            "Income 1000.00 THB (kbank) from 2026-01-01 to 2026-01-31"
        );
    }

    #[test]
    fn test_notices_are_localized() {
        assert_eq!(Notice::SaveFailed.text(Language::English), "Unable to save the transaction.");
        assert_eq!(Notice::FetchFailed.text(Language::Thai), "ไม่สามารถดึงข้อมูลได้");
        assert!(Notice::Unknown.text(Language::English).starts_with("I didn't understand."));
    }
}
