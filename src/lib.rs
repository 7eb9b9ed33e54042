//! Monobank Statement Bot
//!
//! A Telegram bot that links a Monobank personal token to a chat and
//! answers with balances and statements:
//! - Per-chat conversation state with TTL retention
//! - Pure transition function driven by user input and bank outcomes
//! - English and Ukrainian message rendering
//! - Optional daily digest for one configured chat
//!
//! FLOW:
//! /start → LANGUAGE → TOKEN → /account_info → ACCOUNT → DAYS → STATEMENT

pub mod api;
pub mod bank;
pub mod chat;
pub mod config;
pub mod currency;
pub mod dialogue;
pub mod digest;
pub mod error;
pub mod models;
pub mod render;
pub mod state;

#[cfg(test)]
mod testing;

pub use error::Result;

// Re-export common types
pub use models::*;
pub use dialogue::{DialogueEngine, DialogueSettings};
