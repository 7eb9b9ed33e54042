//! Pure state transition function
//!
//! Given the current state and one event, compute the next state and the
//! effects to run. No I/O happens here; bank calls are requested as
//! effects and their outcomes come back as events.

use super::effect::Effect;
use super::event::{AccountsPurpose, Command, Event, Inbound};
use crate::bank::BankFailure;
use crate::models::{AccountSummary, ClientInfo, Credential, Language, SelectionMode, Transaction};
use crate::render::{self, Callback, OutgoingMessage};
use crate::state::{ConversationState, Phase};

pub const SECONDS_PER_DAY: i64 = 86_400;
pub const MIN_DAYS: u32 = 1;
pub const MAX_DAYS: u32 = 31;

/// Inputs of a transition besides state and event.
#[derive(Debug, Clone, Copy)]
pub struct DialogueContext {
    /// Epoch seconds at the moment the event is being handled.
    pub now: i64,
    pub selection_mode: SelectionMode,
    pub fallback_language: Language,
}

/// Result of a state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: ConversationState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn new(state: ConversationState) -> Self {
        Self {
            state,
            effects: vec![],
        }
    }

    fn send(mut self, message: OutgoingMessage) -> Self {
        self.effects.push(Effect::Send(message));
        self
    }

    fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Messages this transition will deliver, in order.
    pub fn messages(&self) -> impl Iterator<Item = &OutgoingMessage> {
        self.effects.iter().filter_map(|effect| match effect {
            Effect::Send(message) => Some(message),
            _ => None,
        })
    }
}

/// Parse a day count, accepting only `MIN_DAYS..=MAX_DAYS`.
pub fn parse_days(text: &str) -> Option<u32> {
    text.trim()
        .parse::<u32>()
        .ok()
        .filter(|days| (MIN_DAYS..=MAX_DAYS).contains(days))
}

/// Statement window ending at `now`.
pub fn statement_window(now: i64, days: u32) -> (i64, i64) {
    (now - i64::from(days) * SECONDS_PER_DAY, now)
}

/// Total over every (state, event) pair.
pub fn transition(state: &ConversationState, ctx: &DialogueContext, event: Event) -> Transition {
    let lang = state.language_or(ctx.fallback_language);
    let next = state.clone();

    match event {
        Event::Inbound(Inbound::Command(command)) => on_command(next, lang, command),
        Event::Inbound(Inbound::Reply(text)) => on_reply(next, ctx, lang, &text),
        Event::Inbound(Inbound::Button(callback)) => on_button(next, ctx, lang, callback),
        Event::AccountsLoaded { purpose, outcome } => on_accounts(next, ctx, lang, purpose, outcome),
        Event::StatementLoaded {
            account,
            days,
            outcome,
        } => on_statement(next, lang, &account, days, outcome),
    }
}

// ============================================================
// Commands (valid in any phase)
// ============================================================

fn on_command(mut next: ConversationState, lang: Language, command: Command) -> Transition {
    match command {
        Command::Start => {
            next.reset_transient();
            next.phase = Phase::SelectingLanguage;
            Transition::new(next).send(render::welcome(lang))
        }

        Command::AccountInfo => match next.credential.clone() {
            None => Transition::new(next).send(render::auth_required(lang)),
            Some(credential) => {
                // a catalog is never reused across invocations
                next.catalog = None;
                Transition::new(next).with_effect(Effect::FetchAccounts {
                    credential,
                    purpose: AccountsPurpose::Catalog,
                })
            }
        },

        Command::Cancel => {
            next.reset_transient();
            Transition::new(next).send(render::cancelled(lang))
        }

        Command::Help => Transition::new(next).send(render::help(lang)),

        Command::Unknown(_) => Transition::new(next).send(render::unknown_command(lang)),
    }
}

// ============================================================
// Free-text replies, dispatched on phase
// ============================================================

fn on_reply(
    mut next: ConversationState,
    ctx: &DialogueContext,
    lang: Language,
    text: &str,
) -> Transition {
    match next.phase.clone() {
        Phase::Idle => Transition::new(next).send(render::unknown_command(lang)),

        Phase::SelectingLanguage => match Language::parse(text) {
            Some(chosen) => choose_language(next, chosen),
            None => Transition::new(next).send(render::welcome(lang)),
        },

        Phase::AwaitingToken => {
            if text.trim().is_empty() {
                return Transition::new(next).send(render::token_prompt(lang));
            }
            let credential = Credential::new(text.trim());
            next.credential = Some(credential.clone());
            Transition::new(next).with_effect(Effect::FetchAccounts {
                credential,
                purpose: AccountsPurpose::Verify,
            })
        }

        Phase::AwaitingAccountSelection => match ctx.selection_mode {
            SelectionMode::Buttons => Transition::new(next).send(render::use_buttons(lang)),
            SelectionMode::Numeric => {
                let Ok(index) = text.trim().parse::<usize>() else {
                    return Transition::new(next).send(render::selection_not_number(lang));
                };
                select_account(next, lang, index, text.trim())
            }
        },

        Phase::AwaitingDays { account } => {
            let Some(days) = parse_days(text) else {
                return Transition::new(next).send(render::days_invalid(lang));
            };
            let Some(credential) = next.credential.clone() else {
                next.invalidate_credential();
                return Transition::new(next).send(render::auth_required(lang));
            };

            let (from, to) = statement_window(ctx.now, days);
            Transition::new(next).with_effect(Effect::FetchStatement {
                credential,
                account,
                days,
                from,
                to,
            })
        }
    }
}

fn choose_language(mut next: ConversationState, chosen: Language) -> Transition {
    next.language = Some(chosen);
    next.phase = Phase::AwaitingToken;
    Transition::new(next).send(render::token_prompt(chosen))
}

/// Resolve a 1-based index against the stored catalog.
fn select_account(
    mut next: ConversationState,
    lang: Language,
    index: usize,
    raw: &str,
) -> Transition {
    let Some(catalog) = next.catalog.as_ref() else {
        next.reset_transient();
        return Transition::new(next).send(render::stale_selection(lang));
    };

    let max = catalog.len();
    let resolved = catalog.resolve(index).cloned();

    match resolved {
        Some(account) => {
            let prompt = render::days_prompt(lang, &account);
            next.phase = Phase::AwaitingDays { account };
            Transition::new(next).send(prompt)
        }
        None => Transition::new(next).send(render::selection_out_of_range(lang, raw, max)),
    }
}

// ============================================================
// Button presses
// ============================================================

fn on_button(
    next: ConversationState,
    ctx: &DialogueContext,
    lang: Language,
    callback: Callback,
) -> Transition {
    let selecting_language = next.phase == Phase::SelectingLanguage;

    match (callback, selecting_language, ctx.selection_mode) {
        (Callback::Language(chosen), true, _) => choose_language(next, chosen),

        (Callback::Account { generation, index }, _, SelectionMode::Buttons) => {
            let current = next.catalog.as_ref().map(|c| c.generation);
            if current != Some(generation) {
                return Transition::new(next).send(render::stale_selection(lang));
            }
            select_account(next, lang, index, &index.to_string())
        }

        (Callback::Language(_), _, _)
        | (Callback::Account { .. }, _, SelectionMode::Numeric)
        | (Callback::Unknown(_), _, _) => Transition::new(next).send(render::unknown_command(lang)),
    }
}

// ============================================================
// Bank outcomes
// ============================================================

fn on_accounts(
    mut next: ConversationState,
    ctx: &DialogueContext,
    lang: Language,
    purpose: AccountsPurpose,
    outcome: Result<ClientInfo, BankFailure>,
) -> Transition {
    match (purpose, outcome) {
        (AccountsPurpose::Verify, Ok(client)) => {
            next.phase = Phase::Idle;
            Transition::new(next).send(render::token_accepted(lang, &client))
        }

        // an unverified token is never kept
        (AccountsPurpose::Verify, Err(failure)) => {
            next.invalidate_credential();
            Transition::new(next).send(render::token_check_failed(lang, &failure))
        }

        (AccountsPurpose::Catalog, Ok(client)) => {
            if client.accounts.is_empty() {
                next.reset_transient();
                let generation = next.catalog_generation;
                return Transition::new(next).send(render::account_list(
                    lang,
                    &[],
                    ctx.selection_mode,
                    generation,
                ));
            }

            let message_accounts = client.accounts.clone();
            let generation = next.install_catalog(client.accounts);
            next.phase = Phase::AwaitingAccountSelection;
            Transition::new(next).send(render::account_list(
                lang,
                &message_accounts,
                ctx.selection_mode,
                generation,
            ))
        }

        (AccountsPurpose::Catalog, Err(failure)) => {
            if failure.is_auth() {
                next.invalidate_credential();
            }
            Transition::new(next).send(render::bank_failure(lang, &failure))
        }
    }
}

fn on_statement(
    mut next: ConversationState,
    lang: Language,
    account: &AccountSummary,
    days: u32,
    outcome: Result<Vec<Transaction>, BankFailure>,
) -> Transition {
    match outcome {
        Ok(transactions) => {
            next.phase = Phase::Idle;
            Transition::new(next).send(render::statement(lang, account, days, &transactions))
        }
        Err(failure) => {
            if failure.is_auth() {
                next.invalidate_credential();
            } else {
                next.phase = Phase::Idle;
            }
            Transition::new(next).send(render::bank_failure(lang, &failure))
        }
    }
}
