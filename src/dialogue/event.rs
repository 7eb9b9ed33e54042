//! Events that drive a conversation

use crate::bank::BankFailure;
use crate::models::{AccountSummary, ClientInfo, Transaction};
use crate::render::Callback;

/// Slash commands the bot understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    AccountInfo,
    Cancel,
    Help,
    Unknown(String),
}

impl Command {
    /// Parse the first word of a `/command` message. Accepts the
    /// `/command@BotName` form used in group chats.
    pub fn parse(word: &str) -> Self {
        let name = word
            .strip_prefix('/')
            .unwrap_or(word)
            .split('@')
            .next()
            .unwrap_or_default()
            .to_lowercase();

        match name.as_str() {
            "start" => Command::Start,
            "account_info" => Command::AccountInfo,
            "cancel" => Command::Cancel,
            "help" => Command::Help,
            _ => Command::Unknown(word.to_string()),
        }
    }
}

/// What the user did, already demultiplexed from the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Command(Command),
    /// Free text answering the current phase's question.
    Reply(String),
    Button(Callback),
}

impl Inbound {
    pub fn from_text(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.starts_with('/') {
            let word = trimmed.split_whitespace().next().unwrap_or(trimmed);
            Inbound::Command(Command::parse(word))
        } else {
            Inbound::Reply(trimmed.to_string())
        }
    }

    pub fn from_callback(data: &str) -> Self {
        Inbound::Button(Callback::parse(data))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Inbound::Command(_) => "command",
            Inbound::Reply(_) => "reply",
            Inbound::Button(_) => "button",
        }
    }
}

/// Why an account-info call was made; decides how its outcome is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountsPurpose {
    /// Verifying a freshly entered token.
    Verify,
    /// Listing accounts for `/account_info`.
    Catalog,
}

/// Input of the transition function: user input or a bank call outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Inbound(Inbound),
    AccountsLoaded {
        purpose: AccountsPurpose,
        outcome: Result<ClientInfo, BankFailure>,
    },
    StatementLoaded {
        account: AccountSummary,
        days: u32,
        outcome: Result<Vec<Transaction>, BankFailure>,
    },
}

impl Event {
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Inbound(inbound) => inbound.kind(),
            Event::AccountsLoaded { .. } => "accounts_loaded",
            Event::StatementLoaded { .. } => "statement_loaded",
        }
    }
}

impl From<Inbound> for Event {
    fn from(inbound: Inbound) -> Self {
        Event::Inbound(inbound)
    }
}
