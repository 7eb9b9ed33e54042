//! Monobank personal API client
//!
//! Uses a long-lived reqwest::Client for connection pooling.

use super::{BankApi, BankFailure};
use crate::models::{ClientInfo, Credential, Transaction};
use crate::Result;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.monobank.ua";

/// Error body returned by Monobank on failures.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    error_description: Option<String>,
}

#[derive(Clone)]
pub struct MonobankClient {
    client: Client,
    base_url: String,
}

impl MonobankClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .pool_max_idle_per_host(8)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        credential: &Credential,
    ) -> std::result::Result<T, BankFailure> {
        let url = format!("{}{}", self.base_url, path);

        debug!(path, credential = %credential.fingerprint(), "Calling Monobank API");

        let response = self
            .client
            .get(url)
            .header("X-Token", credential.expose())
            .send()
            .await
            .map_err(|e| {
                warn!(path, "Monobank request failed: {}", e);
                BankFailure::Upstream(format!("request failed: {}", e))
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BankFailure::Upstream(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.error_description)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));

            warn!(path, status = status.as_u16(), detail = %detail, "Monobank returned an error");

            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => BankFailure::Unauthorized(detail),
                StatusCode::TOO_MANY_REQUESTS => BankFailure::RateLimited(detail),
                _ => BankFailure::Upstream(detail),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            warn!(path, "Malformed Monobank payload: {}", e);
            BankFailure::Upstream(format!("malformed response: {}", e))
        })
    }
}

#[async_trait::async_trait]
impl BankApi for MonobankClient {
    async fn fetch_client_info(
        &self,
        credential: &Credential,
    ) -> std::result::Result<ClientInfo, BankFailure> {
        self.get_json("/personal/client-info", credential).await
    }

    async fn fetch_statement(
        &self,
        credential: &Credential,
        account_id: &str,
        from: i64,
        to: i64,
    ) -> std::result::Result<Vec<Transaction>, BankFailure> {
        let path = format!("/personal/statement/{}/{}/{}", account_id, from, to);
        self.get_json(&path, credential).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Path;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;

    async fn client_info(headers: HeaderMap) -> (StatusCode, String) {
        match headers.get("X-Token").and_then(|v| v.to_str().ok()) {
            Some("good") => (
                StatusCode::OK,
                json!({
                    "clientId": "3MSaMMtczs",
                    "name": "Мазепа Іван",
                    "accounts": [{
                        "id": "kKGVoZuHWzqVoZuH",
                        "balance": 10000000,
                        "creditLimit": 10000000,
                        "type": "black",
                        "currencyCode": 980,
                        "maskedPan": ["537541******1234"]
                    }]
                })
                .to_string(),
            ),
            Some("broken") => (StatusCode::OK, "{\"accounts\": 42}".to_string()),
            Some("busy") => (
                StatusCode::TOO_MANY_REQUESTS,
                json!({ "errorDescription": "Too many requests" }).to_string(),
            ),
            _ => (
                StatusCode::FORBIDDEN,
                json!({ "errorDescription": "Unknown 'X-Token'" }).to_string(),
            ),
        }
    }

    async fn statement(Path((account, from, to)): Path<(String, i64, i64)>) -> Json<serde_json::Value> {
        if account == "empty" {
            return Json(json!([]));
        }
        Json(json!([{
            "id": "ZuHWzqkKGVo=",
            "time": to - 60,
            "description": format!("between {} and {}", from, to),
            "mcc": 7997,
            "amount": -95000,
            "operationAmount": -95000,
            "currencyCode": 980,
            "balance": 10050000
        }]))
    }

    async fn spawn_bank() -> MonobankClient {
        let app = Router::new()
            .route("/personal/client-info", get(client_info))
            .route("/personal/statement/:account/:from/:to", get(statement));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        MonobankClient::new(format!("http://{}/", addr), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_client_info_success() {
        let bank = spawn_bank().await;
        let info = bank.fetch_client_info(&Credential::new("good")).await.unwrap();
        assert_eq!(info.name, "Мазепа Іван");
        assert_eq!(info.accounts.len(), 1);
        assert_eq!(info.accounts[0].balance, 10000000);
    }

    #[tokio::test]
    async fn test_rejected_token_is_unauthorized_with_detail() {
        let bank = spawn_bank().await;
        let failure = bank.fetch_client_info(&Credential::new("bad")).await.unwrap_err();
        assert_eq!(failure, BankFailure::Unauthorized("Unknown 'X-Token'".to_string()));
        assert!(failure.is_auth());
    }

    #[tokio::test]
    async fn test_rate_limit_and_malformed_payload() {
        let bank = spawn_bank().await;
        let busy = bank.fetch_client_info(&Credential::new("busy")).await.unwrap_err();
        assert!(matches!(busy, BankFailure::RateLimited(_)));

        let broken = bank.fetch_client_info(&Credential::new("broken")).await.unwrap_err();
        assert!(matches!(broken, BankFailure::Upstream(ref d) if d.starts_with("malformed")));
    }

    #[tokio::test]
    async fn test_statement_window_in_path() {
        let bank = spawn_bank().await;
        let txs = bank
            .fetch_statement(&Credential::new("good"), "acc", 1000, 87400)
            .await
            .unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].description, "between 1000 and 87400");
        assert_eq!(txs[0].time, 87340);

        let empty = bank
            .fetch_statement(&Credential::new("good"), "empty", 0, 1)
            .await
            .unwrap();
        assert!(empty.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_upstream_failure() {
        let bank = MonobankClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        let failure = bank.fetch_client_info(&Credential::new("good")).await.unwrap_err();
        assert!(matches!(failure, BankFailure::Upstream(_)));
    }
}
