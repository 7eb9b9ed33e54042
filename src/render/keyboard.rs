//! Inline keyboards and callback payloads

use crate::models::Language;

/// Structured payload carried by an inline button.
///
/// Encoded as a short string because Telegram limits `callback_data`
/// to 64 bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Callback {
    Language(Language),
    /// 1-based index into the catalog of the given generation.
    Account { generation: u64, index: usize },
    Unknown(String),
}

impl Callback {
    pub fn encode(&self) -> String {
        match self {
            Callback::Language(lang) => format!("lang:{}", lang.code()),
            Callback::Account { generation, index } => format!("acct:{}:{}", generation, index),
            Callback::Unknown(raw) => raw.clone(),
        }
    }

    /// Decode a payload. Never fails; garbage becomes [`Callback::Unknown`].
    pub fn parse(raw: &str) -> Self {
        let mut parts = raw.split(':');
        let parsed = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some("lang"), Some(code), None, None) => Language::parse(code).map(Callback::Language),
            (Some("acct"), Some(generation), Some(index), None) => {
                match (generation.parse(), index.parse()) {
                    (Ok(generation), Ok(index)) => Some(Callback::Account { generation, index }),
                    _ => None,
                }
            }
            _ => None,
        };

        parsed.unwrap_or_else(|| Callback::Unknown(raw.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineButton {
    pub label: String,
    pub payload: Callback,
}

impl InlineButton {
    pub fn new(label: impl Into<String>, payload: Callback) -> Self {
        Self {
            label: label.into(),
            payload,
        }
    }
}

/// Ordered rows of buttons.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InlineKeyboard {
    pub rows: Vec<Vec<InlineButton>>,
}

impl InlineKeyboard {
    pub fn single_column(buttons: impl IntoIterator<Item = InlineButton>) -> Self {
        Self {
            rows: buttons.into_iter().map(|b| vec![b]).collect(),
        }
    }

    pub fn single_row(buttons: impl IntoIterator<Item = InlineButton>) -> Self {
        Self {
            rows: vec![buttons.into_iter().collect()],
        }
    }

    pub fn buttons(&self) -> impl Iterator<Item = &InlineButton> {
        self.rows.iter().flatten()
    }
}
