//! Scheduled digest
//!
//! Stateless job for one configured chat: a balance overview followed by
//! the last day's statement of every account that had activity.

use crate::bank::BankApi;
use crate::chat::ChatTransport;
use crate::dialogue::statement_window;
use crate::models::{ChatId, Credential, Language};
use crate::render;
use crate::Result;
use tracing::{info, warn};

/// Window of a digest run, in days.
pub const DIGEST_DAYS: u32 = 1;

/// What a digest run delivered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DigestReport {
    pub accounts: usize,
    pub statements_sent: usize,
    pub statements_failed: usize,
}

/// Run one digest. A client-info failure aborts the run; a failed
/// statement is reported to the chat and the run continues.
#[tracing::instrument(skip(bank, chat, credential), fields(chat_id = %chat_id, credential = %credential.fingerprint()))]
pub async fn run_digest(
    bank: &dyn BankApi,
    chat: &dyn ChatTransport,
    credential: &Credential,
    chat_id: ChatId,
    lang: Language,
    now: i64,
) -> Result<DigestReport> {
    let client = bank.fetch_client_info(credential).await?;

    chat.send(chat_id, &render::digest_overview(lang, &client))
        .await?;

    let mut report = DigestReport {
        accounts: client.accounts.len(),
        ..Default::default()
    };
    let (from, to) = statement_window(now, DIGEST_DAYS);

    for account in &client.accounts {
        match bank.fetch_statement(credential, &account.id, from, to).await {
            Ok(transactions) if transactions.is_empty() => {}
            Ok(transactions) => {
                chat.send(
                    chat_id,
                    &render::statement(lang, account, DIGEST_DAYS, &transactions),
                )
                .await?;
                report.statements_sent += 1;
            }
            Err(failure) => {
                warn!(account = %account.id, "Digest statement failed: {}", failure);
                chat.send(chat_id, &render::bank_failure(lang, &failure))
                    .await?;
                report.statements_failed += 1;
                if failure.is_auth() {
                    break;
                }
            }
        }
    }

    info!(
        accounts = report.accounts,
        sent = report.statements_sent,
        failed = report.statements_failed,
        "Digest delivered"
    );
    Ok(report)
}
