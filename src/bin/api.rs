use monobank_statement_bot::{
    api::{create_router, start_server},
    bank::{BankApi, MonobankClient},
    chat::{ChatTransport, TelegramClient},
    config::BotConfig,
    dialogue::{DialogueEngine, DialogueSettings},
    digest::run_digest,
    state::InMemoryStateStore,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = BotConfig::from_env()?;

    info!("🚀 Monobank Statement Bot - Webhook Server");
    info!("📍 Port: {}", config.port);
    info!(
        mode = ?config.selection_mode,
        language = %config.language,
        bot = %config.telegram_token.fingerprint(),
        "Configuration loaded"
    );

    // Create components
    let telegram = Arc::new(TelegramClient::new(
        &config.telegram_api_base,
        config.telegram_token.expose(),
        config.http_timeout,
    )?);
    let bank: Arc<dyn BankApi> = Arc::new(MonobankClient::new(
        &config.monobank_api_base,
        config.http_timeout,
    )?);
    let chat: Arc<dyn ChatTransport> = telegram.clone();
    let store = Arc::new(InMemoryStateStore::new());

    let engine = Arc::new(DialogueEngine::new(
        store.clone(),
        bank.clone(),
        chat.clone(),
        DialogueSettings {
            selection_mode: config.selection_mode,
            fallback_language: config.language,
        },
    ));

    info!("✅ Dialogue engine initialized");

    if let Some(url) = config.webhook_url.as_deref() {
        telegram
            .set_webhook(url, config.webhook_secret.as_deref())
            .await?;
    }

    // Drop conversations nobody touched within the TTL
    if let Some(ttl) = config.state_ttl {
        let store = store.clone();
        let every = ttl.min(Duration::from_secs(60 * 60));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                store.evict_idle(ttl).await;
            }
        });
    }

    if let Some(digest) = config.digest.clone() {
        if let Some(every) = digest.interval {
            let bank = bank.clone();
            let chat = chat.clone();
            let language = config.language;
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(every);
                // the first tick fires immediately
                ticker.tick().await;
                loop {
                    ticker.tick().await;
                    let now = chrono::Utc::now().timestamp();
                    if let Err(e) = run_digest(
                        bank.as_ref(),
                        chat.as_ref(),
                        &digest.credential,
                        digest.chat_id,
                        language,
                        now,
                    )
                    .await
                    {
                        error!("Scheduled digest failed: {}", e);
                    }
                }
            });
            info!(every_secs = every.as_secs(), "⏰ Digest scheduled");
        }
    }

    info!("📡 Starting webhook server...");

    // Start API server
    let router = create_router(engine, config.webhook_secret.clone());
    start_server(router, config.port).await?;

    Ok(())
}
