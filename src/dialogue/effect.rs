//! Effects produced by state transitions

use super::event::AccountsPurpose;
use crate::models::{AccountSummary, Credential};
use crate::render::OutgoingMessage;

/// Side effects requested by a transition, executed by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Deliver a message to the chat.
    Send(OutgoingMessage),

    /// Call account-info; the outcome comes back as `AccountsLoaded`.
    FetchAccounts {
        credential: Credential,
        purpose: AccountsPurpose,
    },

    /// Call the statement endpoint for `[from, to]`; the outcome comes back
    /// as `StatementLoaded`.
    FetchStatement {
        credential: Credential,
        account: AccountSummary,
        days: u32,
        from: i64,
        to: i64,
    },
}
