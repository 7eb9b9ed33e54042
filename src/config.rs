//! Runtime configuration
//!
//! Read from environment variables; a `.env` file is loaded first when
//! present.

use crate::error::BotError;
use crate::models::{ChatId, Credential, Language, SelectionMode};
use crate::Result;
use std::env;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_STATE_TTL_SECS: u64 = 7 * 24 * 60 * 60;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Daily digest target. Present only when both token and chat are set.
#[derive(Debug, Clone)]
pub struct DigestConfig {
    pub credential: Credential,
    pub chat_id: ChatId,
    /// In-process schedule for the API server; `None` leaves scheduling to
    /// an external runner of the `digest` binary.
    pub interval: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub telegram_token: Credential,
    pub telegram_api_base: String,
    pub monobank_api_base: String,
    pub port: u16,
    pub webhook_url: Option<String>,
    pub webhook_secret: Option<String>,
    pub selection_mode: SelectionMode,
    pub language: Language,
    /// `None` keeps conversation records forever.
    pub state_ttl: Option<Duration>,
    pub http_timeout: Duration,
    pub digest: Option<DigestConfig>,
}

impl BotConfig {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let telegram_token = get("TELEGRAM_BOT_TOKEN")
            .map(Credential::new)
            .ok_or_else(|| BotError::Config("TELEGRAM_BOT_TOKEN is not set".to_string()))?;

        let port = match get("PORT").or_else(|| get("API_PORT")) {
            Some(raw) => parse_number::<u16>("PORT", &raw)?,
            None => DEFAULT_PORT,
        };

        let selection_mode = match get("SELECTION_MODE") {
            Some(raw) => SelectionMode::parse(&raw).ok_or_else(|| {
                BotError::Config(format!(
                    "SELECTION_MODE must be 'numeric' or 'buttons', got '{}'",
                    raw
                ))
            })?,
            None => SelectionMode::default(),
        };

        let language = match get("BOT_LANGUAGE") {
            Some(raw) => Language::parse(&raw).ok_or_else(|| {
                BotError::Config(format!("BOT_LANGUAGE must be 'en' or 'uk', got '{}'", raw))
            })?,
            None => Language::default(),
        };

        let ttl_secs = match get("STATE_TTL_SECS") {
            Some(raw) => parse_number::<u64>("STATE_TTL_SECS", &raw)?,
            None => DEFAULT_STATE_TTL_SECS,
        };

        let timeout_secs = match get("HTTP_TIMEOUT_SECS") {
            Some(raw) => parse_number::<u64>("HTTP_TIMEOUT_SECS", &raw)?,
            None => DEFAULT_HTTP_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            return Err(BotError::Config(
                "HTTP_TIMEOUT_SECS must be positive".to_string(),
            ));
        }

        Ok(Self {
            telegram_token,
            telegram_api_base: get("TELEGRAM_API_BASE")
                .unwrap_or_else(|| crate::chat::telegram::DEFAULT_BASE_URL.to_string()),
            monobank_api_base: get("MONOBANK_API_BASE")
                .unwrap_or_else(|| crate::bank::monobank::DEFAULT_BASE_URL.to_string()),
            port,
            webhook_url: get("WEBHOOK_URL"),
            webhook_secret: get("WEBHOOK_SECRET"),
            selection_mode,
            language,
            state_ttl: (ttl_secs > 0).then(|| Duration::from_secs(ttl_secs)),
            http_timeout: Duration::from_secs(timeout_secs),
            digest: digest_from(&get)?,
        })
    }
}

fn digest_from<G>(get: &G) -> Result<Option<DigestConfig>>
where
    G: Fn(&str) -> Option<String>,
{
    let token = get("DIGEST_MONOBANK_TOKEN");
    let chat = get("DIGEST_CHAT_ID");

    let (token, chat) = match (token, chat) {
        (Some(token), Some(chat)) => (token, chat),
        (None, None) => return Ok(None),
        _ => {
            return Err(BotError::Config(
                "DIGEST_MONOBANK_TOKEN and DIGEST_CHAT_ID must be set together".to_string(),
            ))
        }
    };

    let interval = match get("DIGEST_INTERVAL_SECS") {
        Some(raw) => {
            let secs = parse_number::<u64>("DIGEST_INTERVAL_SECS", &raw)?;
            (secs > 0).then(|| Duration::from_secs(secs))
        }
        None => None,
    };

    Ok(Some(DigestConfig {
        credential: Credential::new(token),
        chat_id: ChatId(parse_number::<i64>("DIGEST_CHAT_ID", &chat)?),
        interval,
    }))
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.parse::<T>()
        .map_err(|_| BotError::Config(format!("{} must be a number, got '{}'", key, raw)))
}
