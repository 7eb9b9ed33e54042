//! Telegram Bot API transport and webhook payloads

use super::ChatTransport;
use crate::dialogue::Inbound;
use crate::error::BotError;
use crate::models::ChatId;
use crate::render::{InlineKeyboard, OutgoingMessage};
use crate::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, error, info};

pub const DEFAULT_BASE_URL: &str = "https://api.telegram.org";

/// Telegram rejects texts above 4096 UTF-16 units; stay below that.
const MAX_MESSAGE_UNITS: usize = 4000;

// =============================
// Webhook payloads
// =============================

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<TelegramMessage>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramMessage {
    pub chat: TelegramChat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramChat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub message: Option<TelegramMessage>,
}

/// An update demultiplexed into something the dialogue understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingEvent {
    pub chat_id: ChatId,
    pub inbound: Inbound,
    pub callback_id: Option<String>,
}

impl Update {
    /// `None` for updates the bot does not act on (stickers, edits, ...).
    pub fn into_incoming(self) -> Option<IncomingEvent> {
        if let Some(query) = self.callback_query {
            let chat_id = query.message.as_ref()?.chat.id;
            let data = query.data?;
            return Some(IncomingEvent {
                chat_id: ChatId(chat_id),
                inbound: Inbound::from_callback(&data),
                callback_id: Some(query.id),
            });
        }

        let message = self.message?;
        let text = message.text?;
        Some(IncomingEvent {
            chat_id: ChatId(message.chat.id),
            inbound: Inbound::from_text(&text),
            callback_id: None,
        })
    }
}

// =============================
// Outbound
// =============================

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct TelegramResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

fn keyboard_markup(keyboard: &InlineKeyboard) -> Value {
    let rows: Vec<Vec<Value>> = keyboard
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|button| {
                    json!({
                        "text": button.label,
                        "callback_data": button.payload.encode(),
                    })
                })
                .collect()
        })
        .collect();

    json!({ "inline_keyboard": rows })
}

/// Split on line boundaries into chunks of at most `limit` UTF-16 units,
/// the unit Telegram counts in. A single line longer than `limit` is cut
/// hard, never inside a surrogate pair.
pub fn split_text(text: &str, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split('\n') {
        let mut line_part = String::new();
        let mut line_len = 0;

        for c in line.chars() {
            let width = c.len_utf16();
            if line_len > 0 && line_len + width > limit {
                if current_len > 0 {
                    chunks.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                chunks.push(std::mem::take(&mut line_part));
                line_len = 0;
            }
            line_part.push(c);
            line_len += width;
        }

        let separator = usize::from(current_len > 0);
        if current_len + separator + line_len > limit {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if current_len > 0 {
            current.push('\n');
            current_len += 1;
        }
        current_len += line_len;
        current.push_str(&line_part);
    }

    if current_len > 0 || chunks.is_empty() {
        chunks.push(current);
    }

    chunks
}

pub struct TelegramClient {
    client: Client,
    api_url: String,
}

impl TelegramClient {
    pub fn new(base_url: &str, bot_token: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            api_url: format!("{}/bot{}", base_url.trim_end_matches('/'), bot_token),
        })
    }

    async fn call(&self, method: &str, body: &Value) -> Result<()> {
        let response = self
            .client
            .post(format!("{}/{}", self.api_url, method))
            .json(body)
            .send()
            .await
            .map_err(|e| {
                // reqwest errors include the URL, which carries the bot token
                error!(method, "Telegram request failed");
                BotError::Transport(format!("{} request failed: {}", method, e.without_url()))
            })?;

        let status = response.status();
        let reply: TelegramResponse = response.json().await.map_err(|e| {
            BotError::Transport(format!("{} returned {}: {}", method, status, e.without_url()))
        })?;

        if !reply.ok {
            let description = reply.description.unwrap_or_default();
            error!(method, status = status.as_u16(), "Telegram rejected call: {}", description);
            return Err(BotError::Transport(format!(
                "{} rejected: {}",
                method, description
            )));
        }

        Ok(())
    }

    /// Register the webhook URL, optionally with a secret header token.
    pub async fn set_webhook(&self, url: &str, secret: Option<&str>) -> Result<()> {
        let mut body = json!({
            "url": url,
            "allowed_updates": ["message", "callback_query"],
        });
        if let Some(secret) = secret {
            body["secret_token"] = json!(secret);
        }

        self.call("setWebhook", &body).await?;
        info!(url, "Telegram webhook registered");
        Ok(())
    }
}

#[async_trait::async_trait]
impl ChatTransport for TelegramClient {
    async fn send(&self, chat_id: ChatId, message: &OutgoingMessage) -> Result<()> {
        let chunks = split_text(&message.text, MAX_MESSAGE_UNITS);
        let last = chunks.len() - 1;

        for (i, chunk) in chunks.iter().enumerate() {
            let reply_markup = if i == last {
                message.keyboard.as_ref().map(keyboard_markup)
            } else {
                None
            };

            let request = SendMessageRequest {
                chat_id: chat_id.0,
                text: chunk,
                reply_markup,
            };
            self.call("sendMessage", &serde_json::to_value(&request)?).await?;
        }

        debug!(chat_id = %chat_id, chunks = chunks.len(), "Message delivered");
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str) -> Result<()> {
        self.call("answerCallbackQuery", &json!({ "callback_query_id": callback_id }))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialogue::Command;
    use crate::render::{Callback, InlineButton};
    use axum::extract::State;
    use axum::routing::post;
    use axum::{Json, Router};
    use std::sync::{Arc, Mutex};

    type Calls = Arc<Mutex<Vec<(String, Value)>>>;

    async fn record(
        State(calls): State<Calls>,
        axum::extract::Path((_token, method)): axum::extract::Path<(String, String)>,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        let reject = body["chat_id"] == json!(-1);
        calls.lock().unwrap().push((method, body));
        if reject {
            Json(json!({ "ok": false, "error_code": 400, "description": "Bad Request: chat not found" }))
        } else {
            Json(json!({ "ok": true, "result": true }))
        }
    }

    async fn spawn_telegram() -> (TelegramClient, Calls) {
        let calls: Calls = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route("/:token/:method", post(record))
            .with_state(calls.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client =
            TelegramClient::new(&format!("http://{}", addr), "123:abc", Duration::from_secs(5))
                .unwrap();
        (client, calls)
    }

    #[test]
    fn test_text_message_update() {
        let update: Update = serde_json::from_value(json!({
            "update_id": 1,
            "message": { "message_id": 5, "chat": { "id": 42, "type": "private" }, "text": "/start" }
        }))
        .unwrap();

        let event = update.into_incoming().unwrap();
        assert_eq!(event.chat_id, ChatId(42));
        assert_eq!(event.inbound, Inbound::Command(Command::Start));
        assert_eq!(event.callback_id, None);
    }

    #[test]
    fn test_callback_update() {
        let update: Update = serde_json::from_value(json!({
            "update_id": 2,
            "callback_query": {
                "id": "cb-1",
                "data": "acct:3:1",
                "message": { "message_id": 9, "chat": { "id": 42 } }
            }
        }))
        .unwrap();

        let event = update.into_incoming().unwrap();
        assert_eq!(
            event.inbound,
            Inbound::Button(Callback::Account { generation: 3, index: 1 })
        );
        assert_eq!(event.callback_id.as_deref(), Some("cb-1"));
    }

    #[test]
    fn test_non_text_updates_are_ignored() {
        let sticker: Update = serde_json::from_value(json!({
            "update_id": 3,
            "message": { "chat": { "id": 42 }, "sticker": { "file_id": "x" } }
        }))
        .unwrap();
        assert!(sticker.into_incoming().is_none());

        let empty: Update = serde_json::from_value(json!({ "update_id": 4 })).unwrap();
        assert!(empty.into_incoming().is_none());
    }

    #[test]
    fn test_split_text_respects_limit_and_lines() {
        let text = "aaaa\nbbbb\ncccc";
        assert_eq!(split_text(text, 9), vec!["aaaa\nbbbb", "cccc"]);
        assert_eq!(split_text(text, 100), vec![text]);
        assert_eq!(split_text("abcdefgh", 3), vec!["abc", "def", "gh"]);
        assert_eq!(split_text("", 10), vec![""]);
    }

    #[test]
    fn test_split_text_counts_utf16_units() {
        // each emoji is two UTF-16 units
        let text = "😀".repeat(5);
        let chunks = split_text(&text, 4);
        assert_eq!(chunks, vec!["😀😀", "😀😀", "😀"]);
        assert!(chunks
            .iter()
            .all(|c| c.chars().map(char::len_utf16).sum::<usize>() <= 4));

        let mixed = format!("ab\n{}", "😀".repeat(2));
        assert_eq!(split_text(&mixed, 5), vec!["ab", "😀😀"]);
    }

    #[tokio::test]
    async fn test_send_attaches_keyboard_to_last_chunk() {
        let (client, calls) = spawn_telegram().await;
        let long_text = vec!["x".repeat(3000), "y".repeat(3000)].join("\n");
        let message = OutgoingMessage::text(long_text).with_keyboard(InlineKeyboard::single_row([
            InlineButton::new("English", Callback::Language(crate::models::Language::English)),
        ]));

        client.send(ChatId(7), &message).await.unwrap();

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, "sendMessage");
        assert!(calls[0].1.get("reply_markup").is_none());
        assert_eq!(
            calls[1].1["reply_markup"]["inline_keyboard"][0][0]["callback_data"],
            json!("lang:en")
        );
    }

    #[tokio::test]
    async fn test_rejected_send_is_transport_error() {
        let (client, _calls) = spawn_telegram().await;
        let err = client
            .send(ChatId(-1), &OutgoingMessage::text("hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, BotError::Transport(ref d) if d.contains("chat not found")));
    }

    #[tokio::test]
    async fn test_answer_callback_and_webhook() {
        let (client, calls) = spawn_telegram().await;
        client.answer_callback("cb-9").await.unwrap();
        client
            .set_webhook("https://bot.example/telegram/webhook", Some("s3cret"))
            .await
            .unwrap();

        let calls = calls.lock().unwrap();
        assert_eq!(calls[0].0, "answerCallbackQuery");
        assert_eq!(calls[0].1["callback_query_id"], json!("cb-9"));
        assert_eq!(calls[1].0, "setWebhook");
        assert_eq!(calls[1].1["secret_token"], json!("s3cret"));
    }
}
