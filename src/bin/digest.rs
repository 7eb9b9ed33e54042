use monobank_statement_bot::{
    bank::MonobankClient, chat::TelegramClient, config::BotConfig, digest::run_digest,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = BotConfig::from_env()?;
    let Some(digest) = config.digest else {
        eprintln!("⚠️  DIGEST_MONOBANK_TOKEN and DIGEST_CHAT_ID are not set");
        eprintln!("📌 See .env.example for setup instructions");
        std::process::exit(2);
    };

    let bank = MonobankClient::new(&config.monobank_api_base, config.http_timeout)?;
    let chat = TelegramClient::new(
        &config.telegram_api_base,
        config.telegram_token.expose(),
        config.http_timeout,
    )?;

    info!(chat_id = %digest.chat_id, "Running digest");

    let report = run_digest(
        &bank,
        &chat,
        &digest.credential,
        digest.chat_id,
        config.language,
        chrono::Utc::now().timestamp(),
    )
    .await?;

    println!(
        "Digest sent: {} accounts, {} statements, {} failures",
        report.accounts, report.statements_sent, report.statements_failed
    );

    Ok(())
}
