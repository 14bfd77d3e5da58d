//! UI language

use serde::{Deserialize, Serialize};

/// Reply/UI language. Thai unless the client explicitly asks for English.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    #[serde(rename = "th")]
    Thai,
    #[serde(rename = "en")]
    English,
}

impl Language {
    /// Normalize a client locale tag; anything other than "en" is Thai
    pub fn from_tag(tag: &str) -> Self {
        if tag.trim().eq_ignore_ascii_case("en") {
            Language::English
        } else {
            Language::Thai
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Language::Thai => "th",
            Language::English => "en",
        }
    }

    /// Name used inside prompt templates
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::Thai => "Thai",
            Language::English => "English",
        }
    }
}
