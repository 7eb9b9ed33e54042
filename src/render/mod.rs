//! Message renderer
//!
//! Pure functions from domain values and a language to outgoing chat
//! messages. Every function is total: any value the dialogue can produce,
//! including bank failures, renders to some text.

pub mod keyboard;
pub mod texts;

pub use keyboard::{Callback, InlineButton, InlineKeyboard};

use crate::bank::BankFailure;
use crate::currency::{format_money, symbol};
use crate::models::{AccountSummary, ClientInfo, Language, SelectionMode, Transaction};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use texts::{fill, texts};

/// A rendered chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub text: String,
    pub keyboard: Option<InlineKeyboard>,
}

impl OutgoingMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
        }
    }

    pub fn with_keyboard(mut self, keyboard: InlineKeyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }
}

// =============================
// Onboarding
// =============================

pub fn welcome(lang: Language) -> OutgoingMessage {
    let keyboard = InlineKeyboard::single_row(
        Language::ALL
            .iter()
            .map(|l| InlineButton::new(l.native_name(), Callback::Language(*l))),
    );
    OutgoingMessage::text(texts(lang).welcome).with_keyboard(keyboard)
}

pub fn token_prompt(lang: Language) -> OutgoingMessage {
    OutgoingMessage::text(texts(lang).token_prompt)
}

pub fn token_accepted(lang: Language, client: &ClientInfo) -> OutgoingMessage {
    let name = if client.name.trim().is_empty() {
        "👤"
    } else {
        client.name.as_str()
    };
    OutgoingMessage::text(fill(
        texts(lang).token_accepted,
        &[("name", name), ("count", &client.accounts.len().to_string())],
    ))
}

pub fn token_rejected(lang: Language) -> OutgoingMessage {
    OutgoingMessage::text(texts(lang).token_rejected)
}

/// Reply to a token whose verification call failed. The token is never
/// kept, so every failure class ends with the restart instruction.
pub fn token_check_failed(lang: Language, failure: &BankFailure) -> OutgoingMessage {
    match failure {
        BankFailure::Unauthorized(_) => token_rejected(lang),
        BankFailure::RateLimited(detail) | BankFailure::Upstream(detail) => {
            OutgoingMessage::text(fill(texts(lang).token_unverified, &[("detail", detail)]))
        }
    }
}

pub fn auth_required(lang: Language) -> OutgoingMessage {
    OutgoingMessage::text(texts(lang).auth_required)
}

// =============================
// Accounts
// =============================

/// Short human label: type, last card digits (or id tail), currency.
pub fn account_label(lang: Language, account: &AccountSummary) -> String {
    let kind = if account.kind.is_empty() {
        texts(lang).account
    } else {
        account.kind.as_str()
    };

    let tail_source = account
        .masked_pan
        .first()
        .map(String::as_str)
        .unwrap_or(account.id.as_str());
    let tail: String = {
        let chars: Vec<char> = tail_source.chars().collect();
        chars[chars.len().saturating_sub(4)..].iter().collect()
    };

    format!("{} •{} {}", kind, tail, symbol(account.currency_code))
}

fn account_line(lang: Language, position: usize, account: &AccountSummary) -> String {
    let mut line = format!(
        "{}. {}: {}",
        position,
        account_label(lang, account),
        format_money(account.balance, account.currency_code)
    );
    if account.credit_limit != 0 {
        line.push_str(&format!(
            " ({} {})",
            texts(lang).credit_limit,
            format_money(account.credit_limit, account.currency_code)
        ));
    }
    line
}

/// Numbered account list with the selection affordance of the given mode.
pub fn account_list(
    lang: Language,
    accounts: &[AccountSummary],
    mode: SelectionMode,
    generation: u64,
) -> OutgoingMessage {
    let t = texts(lang);

    if accounts.is_empty() {
        return OutgoingMessage::text(t.no_accounts);
    }

    let mut text = String::from(t.accounts_header);
    for (i, account) in accounts.iter().enumerate() {
        text.push('\n');
        text.push_str(&account_line(lang, i + 1, account));
    }
    text.push_str("\n\n");

    match mode {
        SelectionMode::Numeric => {
            text.push_str(&fill(t.select_numeric, &[("max", &accounts.len().to_string())]));
            OutgoingMessage::text(text)
        }
        SelectionMode::Buttons => {
            text.push_str(t.select_buttons);
            let keyboard = InlineKeyboard::single_column(accounts.iter().enumerate().map(
                |(i, account)| {
                    InlineButton::new(
                        format!("{}. {}", i + 1, account_label(lang, account)),
                        Callback::Account {
                            generation,
                            index: i + 1,
                        },
                    )
                },
            ));
            OutgoingMessage::text(text).with_keyboard(keyboard)
        }
    }
}

pub fn selection_not_number(lang: Language) -> OutgoingMessage {
    OutgoingMessage::text(texts(lang).selection_not_number)
}

pub fn selection_out_of_range(lang: Language, index: &str, max: usize) -> OutgoingMessage {
    OutgoingMessage::text(fill(
        texts(lang).selection_out_of_range,
        &[("index", index), ("max", &max.to_string())],
    ))
}

pub fn use_buttons(lang: Language) -> OutgoingMessage {
    OutgoingMessage::text(texts(lang).use_buttons)
}

pub fn stale_selection(lang: Language) -> OutgoingMessage {
    OutgoingMessage::text(texts(lang).stale_selection)
}

// =============================
// Statement
// =============================

pub fn days_prompt(lang: Language, account: &AccountSummary) -> OutgoingMessage {
    OutgoingMessage::text(fill(
        texts(lang).days_prompt,
        &[("account", &account_label(lang, account))],
    ))
}

pub fn days_invalid(lang: Language) -> OutgoingMessage {
    OutgoingMessage::text(texts(lang).days_invalid)
}

fn format_time(epoch_seconds: i64) -> String {
    DateTime::<Utc>::from_timestamp(epoch_seconds, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| epoch_seconds.to_string())
}

/// Transaction list for one account, or the "no transactions" message when
/// the list is empty.
pub fn statement(
    lang: Language,
    account: &AccountSummary,
    days: u32,
    transactions: &[Transaction],
) -> OutgoingMessage {
    let t = texts(lang);
    let label = account_label(lang, account);
    let days = days.to_string();

    if transactions.is_empty() {
        return OutgoingMessage::text(fill(
            t.no_transactions,
            &[("account", &label), ("days", &days)],
        ));
    }

    let mut text = fill(t.statement_header, &[("account", &label), ("days", &days)]);
    text.push('\n');

    // currency -> (income, expenses)
    let mut totals: BTreeMap<u16, (i64, i64)> = BTreeMap::new();

    for tx in transactions {
        text.push_str(&format!(
            "\n{}  {}  {}",
            format_time(tx.time),
            format_money(tx.amount, tx.currency_code),
            tx.description.trim()
        ));

        let entry = totals.entry(tx.currency_code).or_insert((0, 0));
        if tx.amount >= 0 {
            entry.0 = entry.0.saturating_add(tx.amount);
        } else {
            entry.1 = entry.1.saturating_add(tx.amount);
        }
    }

    text.push('\n');
    for (code, (income, expenses)) in totals {
        text.push_str(&format!(
            "\n{}: {} · {}: {}",
            t.income,
            format_money(income, code),
            t.expenses,
            format_money(expenses, code)
        ));
    }

    OutgoingMessage::text(text)
}

// =============================
// Failures and control
// =============================

pub fn bank_failure(lang: Language, failure: &BankFailure) -> OutgoingMessage {
    let t = texts(lang);
    match failure {
        BankFailure::Unauthorized(_) => token_rejected(lang),
        BankFailure::RateLimited(detail) => {
            OutgoingMessage::text(fill(t.rate_limited, &[("detail", detail)]))
        }
        BankFailure::Upstream(detail) => {
            OutgoingMessage::text(fill(t.upstream_error, &[("detail", detail)]))
        }
    }
}

pub fn cancelled(lang: Language) -> OutgoingMessage {
    OutgoingMessage::text(texts(lang).cancelled)
}

pub fn unknown_command(lang: Language) -> OutgoingMessage {
    OutgoingMessage::text(texts(lang).unknown_command)
}

pub fn help(lang: Language) -> OutgoingMessage {
    OutgoingMessage::text(texts(lang).help)
}

/// Balance overview opening a digest run.
pub fn digest_overview(lang: Language, client: &ClientInfo) -> OutgoingMessage {
    let t = texts(lang);
    let mut text = fill(t.digest_header, &[("name", &client.name)]);

    if client.accounts.is_empty() {
        text.push('\n');
        text.push_str(t.no_accounts);
    }
    for (i, account) in client.accounts.iter().enumerate() {
        text.push('\n');
        text.push_str(&account_line(lang, i + 1, account));
    }
    OutgoingMessage::text(text)
}
