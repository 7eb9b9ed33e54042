//! Chat transport
//!
//! Outbound side of the chat channel. Retries and rate limiting belong to
//! the implementation; failures surface as [`crate::error::BotError`].

pub mod telegram;

pub use telegram::{TelegramClient, Update};

use crate::models::ChatId;
use crate::render::OutgoingMessage;
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(&self, chat_id: ChatId, message: &OutgoingMessage) -> Result<()>;

    /// Acknowledge a button press so the client stops its progress spinner.
    async fn answer_callback(&self, callback_id: &str) -> Result<()>;
}
