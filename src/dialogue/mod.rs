//! Conversation state machine
//!
//! `transition` is pure; `DialogueEngine` runs it against the state store,
//! the bank and the chat transport.

mod effect;
mod engine;
mod event;
mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use engine::{DialogueEngine, DialogueSettings};
pub use event::{AccountsPurpose, Command, Event, Inbound};
pub use transition::{
    parse_days, statement_window, transition, DialogueContext, Transition, MAX_DAYS, MIN_DAYS,
    SECONDS_PER_DAY,
};
