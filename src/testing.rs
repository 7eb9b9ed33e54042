//! Mock implementations for testing
//!
//! These mocks enable dialogue tests without real I/O.

use crate::bank::{BankApi, BankFailure};
use crate::chat::ChatTransport;
use crate::error::BotError;
use crate::models::{AccountSummary, ChatId, ClientInfo, Credential, Transaction};
use crate::render::OutgoingMessage;
use crate::Result;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

pub fn account(id: &str, balance: i64, kind: &str) -> AccountSummary {
    AccountSummary {
        id: id.to_string(),
        balance,
        credit_limit: 0,
        currency_code: 980,
        kind: kind.to_string(),
        masked_pan: vec![],
    }
}

pub fn client(accounts: Vec<AccountSummary>) -> ClientInfo {
    ClientInfo {
        name: "Ivan".to_string(),
        accounts,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementRequest {
    pub credential: Credential,
    pub account_id: String,
    pub from: i64,
    pub to: i64,
}

// ============================================================================
// Mock bank
// ============================================================================

/// Bank that accepts one token and returns queued statements.
pub struct MockBank {
    valid_token: String,
    client: Mutex<ClientInfo>,
    client_infos: Mutex<VecDeque<std::result::Result<ClientInfo, BankFailure>>>,
    statements: Mutex<VecDeque<std::result::Result<Vec<Transaction>, BankFailure>>>,
    pub client_info_calls: Mutex<Vec<Credential>>,
    pub statement_calls: Mutex<Vec<StatementRequest>>,
}

impl MockBank {
    pub fn new(valid_token: &str, client: ClientInfo) -> Self {
        Self {
            valid_token: valid_token.to_string(),
            client: Mutex::new(client),
            client_infos: Mutex::new(VecDeque::new()),
            statements: Mutex::new(VecDeque::new()),
            client_info_calls: Mutex::new(Vec::new()),
            statement_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn set_client(&self, client: ClientInfo) {
        *self.client.lock().unwrap() = client;
    }

    /// Next account-info call returns `outcome` regardless of the token.
    pub fn queue_client_info(&self, outcome: std::result::Result<ClientInfo, BankFailure>) {
        self.client_infos.lock().unwrap().push_back(outcome);
    }

    pub fn queue_statement(&self, outcome: std::result::Result<Vec<Transaction>, BankFailure>) {
        self.statements.lock().unwrap().push_back(outcome);
    }

    pub fn statement_requests(&self) -> Vec<StatementRequest> {
        self.statement_calls.lock().unwrap().clone()
    }

    pub fn client_info_count(&self) -> usize {
        self.client_info_calls.lock().unwrap().len()
    }

    fn check(&self, credential: &Credential) -> std::result::Result<(), BankFailure> {
        if credential.expose() == self.valid_token {
            Ok(())
        } else {
            Err(BankFailure::Unauthorized("Unknown 'X-Token'".to_string()))
        }
    }
}

#[async_trait]
impl BankApi for MockBank {
    async fn fetch_client_info(
        &self,
        credential: &Credential,
    ) -> std::result::Result<ClientInfo, BankFailure> {
        self.client_info_calls.lock().unwrap().push(credential.clone());
        if let Some(outcome) = self.client_infos.lock().unwrap().pop_front() {
            return outcome;
        }
        self.check(credential)?;
        Ok(self.client.lock().unwrap().clone())
    }

    async fn fetch_statement(
        &self,
        credential: &Credential,
        account_id: &str,
        from: i64,
        to: i64,
    ) -> std::result::Result<Vec<Transaction>, BankFailure> {
        self.statement_calls.lock().unwrap().push(StatementRequest {
            credential: credential.clone(),
            account_id: account_id.to_string(),
            from,
            to,
        });
        self.check(credential)?;
        self.statements
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

// ============================================================================
// Recording chat transport
// ============================================================================

#[derive(Default)]
pub struct RecordingChat {
    pub sent: Mutex<Vec<(ChatId, OutgoingMessage)>>,
    pub answered: Mutex<Vec<String>>,
    fail_sends: Mutex<bool>,
}

impl RecordingChat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_sends(&self, fail: bool) {
        *self.fail_sends.lock().unwrap() = fail;
    }

    pub fn messages_for(&self, chat_id: ChatId) -> Vec<OutgoingMessage> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| *id == chat_id)
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn last_for(&self, chat_id: ChatId) -> Option<OutgoingMessage> {
        self.messages_for(chat_id).pop()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatTransport for RecordingChat {
    async fn send(&self, chat_id: ChatId, message: &OutgoingMessage) -> Result<()> {
        if *self.fail_sends.lock().unwrap() {
            return Err(BotError::Transport("sendMessage rejected: Forbidden".to_string()));
        }
        self.sent.lock().unwrap().push((chat_id, message.clone()));
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str) -> Result<()> {
        self.answered.lock().unwrap().push(callback_id.to_string());
        Ok(())
    }
}
