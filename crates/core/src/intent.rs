//! Interpretation result

use serde::{Deserialize, Serialize};

use crate::query::QueryFilters;
use crate::transaction::ParsedTransaction;

/// Where an add-transaction intent came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntentSource {
    Chat,
    Slip,
}

/// Classified purpose of one chat message or slip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum IntentResult {
    AddTransaction {
        source: IntentSource,
        transaction: ParsedTransaction,
    },
    QuerySummary {
        filters: QueryFilters,
    },
    Unknown,
}

impl IntentResult {
    /// Wire name: slips report `bill_payment`
    pub fn intent_name(&self) -> &'static str {
        match self {
            Self::AddTransaction {
                source: IntentSource::Slip,
                ..
            } => "bill_payment",
            Self::AddTransaction { .. } => "add_transaction",
            Self::QuerySummary { .. } => "query_summary",
            Self::Unknown => "unknown",
        }
    }

    pub fn transaction(&self) -> Option<&ParsedTransaction> {
        match self {
            Self::AddTransaction { transaction, .. } => Some(transaction),
            _ => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_names() {
        let chat = IntentResult::AddTransaction {
            source: IntentSource::Chat,
            transaction: ParsedTransaction::default(),
        };
        let slip = IntentResult::AddTransaction {
            source: IntentSource::Slip,
            transaction: ParsedTransaction::default(),
        };
        assert_eq!(chat.intent_name(), "add_transaction");
        assert_eq!(slip.intent_name(), "bill_payment");
        assert_eq!(IntentResult::Unknown.intent_name(), "unknown");
        assert!(slip.transaction().is_some());
    }

    #[test]
    fn test_serialized_tag() {
        let json = serde_json::to_value(IntentResult::Unknown).unwrap();
        assert_eq!(json["intent"], "unknown");

        let query = IntentResult::QuerySummary {
            filters: QueryFilters::default(),
        };
        let json = serde_json::to_value(query).unwrap();
        assert_eq!(json["intent"], "query_summary");
        assert_eq!(json["filters"]["period"]["type"], "month");
    }
}
