//! Keyword rules for direction, channel, category and summary detection

use cash_track_core::{Category, Channel, Direction};

/// One lookup entry: a value with its Thai and English aliases
pub(crate) struct KeywordRule<T: 'static> {
    pub value: T,
    pub thai: &'static [&'static str],
    pub english: &'static [&'static str],
}

impl<T: Copy> KeywordRule<T> {
    fn matches(&self, lower: &str) -> bool {
        contains_any(lower, self.thai, self.english)
    }
}

/// Thai keywords match as substrings (no word spacing), English on word boundaries
pub(crate) fn contains_any(lower: &str, thai: &[&str], english: &[&str]) -> bool {
    thai.iter().any(|k| lower.contains(k)) || english.iter().any(|k| contains_word(lower, k))
}

/// Substring match bounded by non-alphanumeric ASCII on both sides
pub(crate) fn contains_word(haystack: &str, word: &str) -> bool {
    haystack.match_indices(word).any(|(start, matched)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + matched.len()..].chars().next();
        !before.is_some_and(|c| c.is_ascii_alphanumeric())
            && !after.is_some_and(|c| c.is_ascii_alphanumeric())
    })
}

fn first_match<T: Copy>(rules: &[KeywordRule<T>], text: &str) -> Option<T> {
    let lower = text.to_lowercase();
    rules.iter().find(|rule| rule.matches(&lower)).map(|rule| rule.value)
}

const INCOME: KeywordRule<Direction> = KeywordRule {
    value: Direction::Income,
    thai: &["รายรับ", "ได้เงิน", "รับเงิน", "เงินเข้า"],
    english: &["income", "salary", "received"],
};

const EXPENSE: KeywordRule<Direction> = KeywordRule {
    value: Direction::Expense,
    thai: &["รายจ่าย", "ใช้ไป", "จ่าย"],
    english: &["expense", "spent", "paid"],
};

/// Income, then transfer ("โอน" together with "ไป"), then expense
pub fn extract_direction(text: &str, fallback: Direction) -> Direction {
    let lower = text.to_lowercase();
    if INCOME.matches(&lower) {
        return Direction::Income;
    }
    if (lower.contains("โอน") && lower.contains("ไป")) || contains_word(&lower, "transfer") {
        return Direction::Transfer;
    }
    if EXPENSE.matches(&lower) {
        return Direction::Expense;
    }
    fallback
}

const CHANNEL_RULES: &[KeywordRule<Channel>] = &[
    KeywordRule {
        value: Channel::Cash,
        thai: &["เงินสด"],
        english: &["cash"],
    },
    KeywordRule {
        value: Channel::Scb,
        thai: &["ไทยพาณิชย์"],
        english: &["scb"],
    },
    KeywordRule {
        value: Channel::Kbank,
        thai: &["กสิกร"],
        english: &["kbank", "k plus", "kplus"],
    },
    KeywordRule {
        value: Channel::Tmw,
        thai: &["ทรูมันนี่"],
        english: &["tmw", "truemoney", "true money"],
    },
    KeywordRule {
        value: Channel::Bbl,
        thai: &["กรุงเทพ"],
        english: &["bbl", "bualuang", "bangkok bank"],
    },
    KeywordRule {
        value: Channel::Ktb,
        thai: &["กรุงไทย"],
        english: &["ktb", "krungthai"],
    },
];

/// First matching payment channel in a fixed order
pub fn extract_channel(text: &str) -> Option<Channel> {
    first_match(CHANNEL_RULES, text)
}

const CATEGORY_RULES: &[KeywordRule<Category>] = &[
    KeywordRule {
        value: Category::Food,
        thai: &["อาหาร", "กิน", "ข้าว", "ร้าน"],
        english: &["food", "lunch", "dinner", "breakfast", "coffee"],
    },
    KeywordRule {
        value: Category::Transport,
        thai: &["เดินทาง", "รถ", "แท็กซี่"],
        english: &["bts", "mrt", "grab", "taxi", "bus"],
    },
    KeywordRule {
        value: Category::Shopping,
        thai: &["ซื้อ", "ช้อปปิ้ง"],
        english: &["shopee", "lazada", "shopping"],
    },
    KeywordRule {
        value: Category::Bill,
        thai: &["บิล", "ค่าไฟ", "ค่าน้ำ", "โทรศัพท์"],
        english: &["internet", "bill", "bills", "electricity"],
    },
    KeywordRule {
        value: Category::Rent,
        thai: &["เช่า"],
        english: &["rent"],
    },
    KeywordRule {
        value: Category::Debt,
        thai: &["หนี้"],
        english: &["debt", "loan"],
    },
];

/// First matching category in a fixed order; `None` means uncategorized
pub fn extract_category(text: &str) -> Option<Category> {
    first_match(CATEGORY_RULES, text)
}

const SUMMARY_MARKERS: &[&str] = &["เท่าไหร่", "สรุป", "เดือนนี้", "เดือนที่แล้ว", "ปีนี้", "ปีที่แล้ว"];
const SUMMARY_MARKERS_EN: &[&str] = &[
    "how much",
    "summary",
    "this month",
    "last month",
    "this year",
    "last year",
];

/// True if the text asks for a total rather than recording one
pub fn is_summary_query(text: &str) -> bool {
    contains_any(&text.to_lowercase(), SUMMARY_MARKERS, SUMMARY_MARKERS_EN)
}
