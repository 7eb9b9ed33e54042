//! Core data models for the statement bot

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

//
// ================= Identity =================
//

/// Identity of one chat thread. Exact-match equality, never reused.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Personal API token for the bank, scoped to one conversation.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Short, non-reversible tag that is safe to put in logs.
    pub fn fingerprint(&self) -> String {
        let hash = Sha256::digest(self.0.as_bytes());
        hex::encode(&hash[..6])
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential({})", self.fingerprint())
    }
}

//
// ================= Enums =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "uk")]
    Ukrainian,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::English, Language::Ukrainian];

    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Ukrainian => "uk",
        }
    }

    pub fn parse(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "en" | "english" => Some(Language::English),
            "uk" | "ua" | "ukrainian" => Some(Language::Ukrainian),
            _ => None,
        }
    }

    /// Label shown on the language-choice button, in the language itself.
    pub fn native_name(self) -> &'static str {
        match self {
            Language::English => "🇬🇧 English",
            Language::Ukrainian => "🇺🇦 Українська",
        }
    }
}

/// How the user picks an account out of the catalog.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// User replies with the 1-based number of the account.
    #[default]
    Numeric,
    /// User presses an inline button attached to the account list.
    Buttons,
}

impl SelectionMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "numeric" | "number" | "text" => Some(SelectionMode::Numeric),
            "buttons" | "button" | "keyboard" => Some(SelectionMode::Buttons),
            _ => None,
        }
    }
}

//
// ================= Accounts =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub id: String,
    /// Balance in minor units of `currency_code`.
    pub balance: i64,
    #[serde(default)]
    pub credit_limit: i64,
    pub currency_code: u16,
    /// Account type label (`black`, `white`, `fop`, ...).
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub masked_pan: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub accounts: Vec<AccountSummary>,
}

//
// ================= Statement =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(default)]
    pub id: String,
    /// Seconds since the Unix epoch.
    pub time: i64,
    /// Signed amount in minor units; negative is a debit.
    pub amount: i64,
    pub currency_code: u16,
    #[serde(default)]
    pub description: String,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
