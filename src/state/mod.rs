//! Conversation state and its keyed store
//!
//! Every chat owns one [`ConversationState`]. The store hands out an
//! exclusive guard per chat so a whole event is processed as a single
//! read-modify-write; different chats never wait on each other beyond the
//! map lookup. State lives in memory for the lifetime of the process.

use crate::models::{AccountSummary, ChatId, Credential, Language};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::info;

/// Dialogue phase. The selected account only exists inside `AwaitingDays`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    SelectingLanguage,
    AwaitingToken,
    AwaitingAccountSelection,
    AwaitingDays { account: AccountSummary },
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::SelectingLanguage => "selecting_language",
            Phase::AwaitingToken => "awaiting_token",
            Phase::AwaitingAccountSelection => "awaiting_account_selection",
            Phase::AwaitingDays { .. } => "awaiting_days",
        }
    }
}

/// Accounts from the latest successful account-info call.
///
/// `generation` increases with every replacement so button payloads
/// rendered from an older list can be told apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountCatalog {
    pub generation: u64,
    pub accounts: Vec<AccountSummary>,
}

impl AccountCatalog {
    /// Look up a 1-based position.
    pub fn resolve(&self, index: usize) -> Option<&AccountSummary> {
        index.checked_sub(1).and_then(|i| self.accounts.get(i))
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConversationState {
    pub phase: Phase,
    /// `None` until the user picks one; the configured fallback applies.
    pub language: Option<Language>,
    pub credential: Option<Credential>,
    pub catalog: Option<AccountCatalog>,
    /// Last generation handed out, kept across cancels so it never repeats.
    pub catalog_generation: u64,
}

impl ConversationState {
    pub fn language_or(&self, fallback: Language) -> Language {
        self.language.unwrap_or(fallback)
    }

    pub fn selected_account(&self) -> Option<&AccountSummary> {
        match &self.phase {
            Phase::AwaitingDays { account } => Some(account),
            _ => None,
        }
    }

    /// Replace the catalog with a fresh list under a new generation.
    pub fn install_catalog(&mut self, accounts: Vec<AccountSummary>) -> u64 {
        self.catalog_generation += 1;
        self.catalog = Some(AccountCatalog {
            generation: self.catalog_generation,
            accounts,
        });
        self.catalog_generation
    }

    /// Drop everything tied to the dialogue in progress. Language and
    /// credential survive.
    pub fn reset_transient(&mut self) {
        self.phase = Phase::Idle;
        self.catalog = None;
    }

    /// Forget a credential the bank rejected, together with anything
    /// derived from it.
    pub fn invalidate_credential(&mut self) {
        self.credential = None;
        self.reset_transient();
    }
}

/// Stored record: state plus bookkeeping for retention.
#[derive(Debug, Default)]
pub struct Slot {
    pub state: ConversationState,
    pub touched_at: Option<DateTime<Utc>>,
}

/// Exclusive access to one chat's state for the duration of an event.
pub struct StateGuard {
    chat_id: ChatId,
    slot: OwnedMutexGuard<Slot>,
}

impl StateGuard {
    pub fn chat_id(&self) -> ChatId {
        self.chat_id
    }

    /// Replace the stored state and refresh its retention timestamp.
    pub fn commit(&mut self, state: ConversationState) {
        self.slot.state = state;
        self.slot.touched_at = Some(Utc::now());
    }
}

impl Deref for StateGuard {
    type Target = ConversationState;

    fn deref(&self) -> &Self::Target {
        &self.slot.state
    }
}

impl DerefMut for StateGuard {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.slot.state
    }
}

/// In-memory state store keyed by chat.
pub struct InMemoryStateStore {
    slots: RwLock<HashMap<ChatId, Arc<Mutex<Slot>>>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
        }
    }

    async fn slot(&self, chat_id: ChatId) -> Arc<Mutex<Slot>> {
        {
            let slots = self.slots.read().await;
            if let Some(slot) = slots.get(&chat_id) {
                return slot.clone();
            }
        }

        let mut slots = self.slots.write().await;
        slots.entry(chat_id).or_default().clone()
    }

    /// Lock the chat's record, creating a default one on first sight.
    /// Waits while another event for the same chat is in flight.
    pub async fn lock(&self, chat_id: ChatId) -> StateGuard {
        loop {
            let slot = self.slot(chat_id).await;
            let locked = slot.clone().lock_owned().await;

            // An eviction may have unlinked the slot while we waited for it.
            let current = {
                let slots = self.slots.read().await;
                slots.get(&chat_id).is_some_and(|s| Arc::ptr_eq(s, &slot))
            };
            if current {
                return StateGuard {
                    chat_id,
                    slot: locked,
                };
            }
        }
    }

    /// Copy of the current state, if the chat has been seen.
    pub async fn snapshot(&self, chat_id: ChatId) -> Option<ConversationState> {
        let slot = {
            let slots = self.slots.read().await;
            slots.get(&chat_id)?.clone()
        };
        let locked = slot.lock().await;
        Some(locked.state.clone())
    }

    pub async fn len(&self) -> usize {
        self.slots.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.slots.read().await.is_empty()
    }

    /// Remove records not touched within `ttl`, credentials included.
    /// Records currently locked by an event are skipped.
    pub async fn evict_idle(&self, ttl: Duration) -> usize {
        let Ok(ttl) = chrono::Duration::from_std(ttl) else {
            return 0;
        };
        let cutoff = Utc::now() - ttl;

        let mut slots = self.slots.write().await;
        let before = slots.len();

        slots.retain(|_, slot| match slot.try_lock() {
            Ok(locked) => locked.touched_at.is_some_and(|t| t >= cutoff),
            Err(_) => true,
        });

        let evicted = before - slots.len();
        if evicted > 0 {
            info!(evicted, remaining = slots.len(), "Evicted idle conversations");
        }
        evicted
    }
}

impl Default for InMemoryStateStore {
    fn default() -> Self {
        Self::new()
    }
}
