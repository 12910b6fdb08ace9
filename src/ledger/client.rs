//! HTTP ledger gateway.
//!
//! # Responsibilities
//! - Talk to the node's JSON API (`/balance`, `/send-tx`, `/tx`, `/address`)
//! - Bound every call by the configured timeout
//! - Map error statuses to `LedgerError::Rejected` with the raw body

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::Value;

use crate::config::NodeConfig;
use crate::ledger::gateway::LedgerGateway;
use crate::ledger::types::{
    BalanceInfo, LedgerError, LedgerResult, SubmitReceipt, TxRecord, TxReference,
};
use crate::observability::metrics;
use crate::wallet::transaction::BroadcastForm;

/// Ledger node client. Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpGateway {
    /// Build a gateway for the node described by `config`.
    pub fn new(config: &NodeConfig) -> LedgerResult<Self> {
        let timeout = config.connect_timeout();
        let client = Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| LedgerError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        let base_url = config.rpc_url.trim_end_matches('/').to_string();
        tracing::info!(rpc_url = %base_url, timeout_secs = timeout.as_secs(), "Ledger gateway initialized");

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn request(&self, method: Method, path: &str, body: Option<&BroadcastForm>) -> LedgerResult<Value> {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.client.request(method.clone(), &url);
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await.map_err(|e| {
            if e.is_timeout() {
                LedgerError::Transport(format!("{} {} timed out after {:?}", method, path, self.timeout))
            } else {
                LedgerError::Transport(format!("{} {} failed: {}", method, path, e))
            }
        })?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| LedgerError::Transport(format!("Failed to read response body: {}", e)))?;

        if status.is_client_error() || status.is_server_error() {
            tracing::warn!(%method, path, status = status.as_u16(), "Node returned error status");
            return Err(LedgerError::Rejected {
                status: status.as_u16(),
                reason: text,
            });
        }

        serde_json::from_str(&text)
            .map_err(|e| LedgerError::Decode(format!("{} {} returned invalid JSON: {}", method, path, e)))
    }
}

#[async_trait]
impl LedgerGateway for HttpGateway {
    async fn get_balance(&self, address: &str) -> LedgerResult<BalanceInfo> {
        let doc = self
            .request(Method::GET, &format!("/balance/{}", address), None)
            .await?;
        BalanceInfo::from_value(address, &doc)
    }

    async fn submit(&self, form: &BroadcastForm) -> LedgerResult<SubmitReceipt> {
        let result = self.request(Method::POST, "/send-tx", Some(form)).await;
        record_submission_outcome(&result);

        let receipt = SubmitReceipt::from_value(result?)?;
        tracing::info!(tx_hash = %receipt.tx_hash, from = %form.from, nonce = form.nonce, "Transaction submitted");
        Ok(receipt)
    }

    async fn get_transaction(&self, hash: &str) -> LedgerResult<TxRecord> {
        let doc = self.request(Method::GET, &format!("/tx/{}", hash), None).await?;
        Ok(TxRecord::from_value(doc))
    }

    async fn recent_transactions(
        &self,
        address: &str,
        limit: usize,
    ) -> LedgerResult<Vec<TxReference>> {
        let doc = self
            .request(Method::GET, &format!("/address/{}?limit={}", address, limit), None)
            .await?;
        TxReference::list_from_value(&doc)
    }
}

/// Count accepted and node-rejected submissions. Transport and decode
/// failures say nothing about the node's verdict and are not counted.
fn record_submission_outcome<T>(result: &LedgerResult<T>) {
    match result {
        Ok(_) => metrics::record_submission(true),
        Err(LedgerError::Rejected { .. }) => metrics::record_submission(false),
        Err(_) => {}
    }
}

impl std::fmt::Debug for HttpGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGateway")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}
