//! Dialogue engine
//!
//! Runs one inbound event per call: lock the chat, apply transitions,
//! perform the bank calls they request, commit the final state, then send
//! the rendered messages.

use super::effect::Effect;
use super::event::{Event, Inbound};
use super::transition::{transition, DialogueContext, Transition};
use crate::bank::BankApi;
use crate::chat::ChatTransport;
use crate::models::{ChatId, Language, SelectionMode};
use crate::render::OutgoingMessage;
use crate::state::InMemoryStateStore;
use crate::Result;
use chrono::Utc;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, Default)]
pub struct DialogueSettings {
    pub selection_mode: SelectionMode,
    pub fallback_language: Language,
}

pub struct DialogueEngine {
    store: Arc<InMemoryStateStore>,
    bank: Arc<dyn BankApi>,
    chat: Arc<dyn ChatTransport>,
    settings: DialogueSettings,
}

impl DialogueEngine {
    pub fn new(
        store: Arc<InMemoryStateStore>,
        bank: Arc<dyn BankApi>,
        chat: Arc<dyn ChatTransport>,
        settings: DialogueSettings,
    ) -> Self {
        Self {
            store,
            bank,
            chat,
            settings,
        }
    }

    pub fn store(&self) -> &Arc<InMemoryStateStore> {
        &self.store
    }

    pub fn chat(&self) -> &Arc<dyn ChatTransport> {
        &self.chat
    }

    /// Handle one inbound event for one chat.
    ///
    /// Events for the same chat are serialized by the store lock. The state
    /// is committed before any message is sent; a send failure is returned
    /// with the state already advanced.
    #[tracing::instrument(skip(self, inbound), fields(chat_id = %chat_id, event = inbound.kind()))]
    pub async fn handle_event(&self, chat_id: ChatId, inbound: Inbound) -> Result<()> {
        let mut guard = self.store.lock(chat_id).await;

        let mut state = (*guard).clone();
        let initial_phase = state.phase.name();
        let mut pending = VecDeque::from([Event::from(inbound)]);
        let mut outbox = Vec::new();

        while let Some(event) = pending.pop_front() {
            let ctx = DialogueContext {
                now: Utc::now().timestamp(),
                selection_mode: self.settings.selection_mode,
                fallback_language: self.settings.fallback_language,
            };

            let kind = event.kind();
            let Transition {
                state: next,
                effects,
            } = transition(&state, &ctx, event);

            debug!(event = kind, from = state.phase.name(), to = next.phase.name(), "Transition");
            state = next;

            for effect in effects {
                if let Some(follow_up) = self.run_effect(effect, &mut outbox).await {
                    pending.push_back(follow_up);
                }
            }
        }

        debug!(from = initial_phase, to = state.phase.name(), messages = outbox.len(), "Event handled");
        guard.commit(state);

        for message in &outbox {
            self.chat.send(chat_id, message).await?;
        }

        Ok(())
    }

    /// Execute one effect. Bank calls yield the event carrying their outcome.
    async fn run_effect(
        &self,
        effect: Effect,
        outbox: &mut Vec<OutgoingMessage>,
    ) -> Option<Event> {
        match effect {
            Effect::Send(message) => {
                outbox.push(message);
                None
            }

            Effect::FetchAccounts {
                credential,
                purpose,
            } => {
                let outcome = self.bank.fetch_client_info(&credential).await;
                if let Err(failure) = &outcome {
                    warn!(
                        credential = %credential.fingerprint(),
                        ?purpose,
                        "Account info failed: {}",
                        failure
                    );
                }
                Some(Event::AccountsLoaded { purpose, outcome })
            }

            Effect::FetchStatement {
                credential,
                account,
                days,
                from,
                to,
            } => {
                let outcome = self
                    .bank
                    .fetch_statement(&credential, &account.id, from, to)
                    .await;
                if let Err(failure) = &outcome {
                    warn!(account = %account.id, days, "Statement failed: {}", failure);
                }
                Some(Event::StatementLoaded {
                    account,
                    days,
                    outcome,
                })
            }
        }
    }
}
