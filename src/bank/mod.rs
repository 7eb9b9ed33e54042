//! Account and statement client
//!
//! Two read operations against the bank, authenticated per conversation.
//! Failures are returned as [`BankFailure`] values, never raised: the
//! dialogue renders them instead of aborting.

pub mod monobank;

pub use monobank::MonobankClient;

use crate::models::{ClientInfo, Credential, Transaction};
use async_trait::async_trait;
use thiserror::Error;

/// Why a bank call produced no data.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BankFailure {
    /// Credential rejected by the bank.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Transport error, unexpected status or malformed payload.
    #[error("{0}")]
    Upstream(String),
}

impl BankFailure {
    pub fn is_auth(&self) -> bool {
        matches!(self, BankFailure::Unauthorized(_))
    }
}

/// Read access to a personal bank account. One attempt per call.
#[async_trait]
pub trait BankApi: Send + Sync {
    async fn fetch_client_info(&self, credential: &Credential) -> Result<ClientInfo, BankFailure>;

    /// Transactions with `from <= time <= to` (epoch seconds). An empty list
    /// is a valid result.
    async fn fetch_statement(
        &self,
        credential: &Credential,
        account_id: &str,
        from: i64,
        to: i64,
    ) -> Result<Vec<Transaction>, BankFailure>;
}
