//! Ledger transport contract.
//!
//! # Contract
//! - `get_balance` reports the *last used* nonce; submissions carry `nonce + 1`
//! - `submit` is sent once; callers decide whether to retry
//! - every call returns or fails within the transport's own timeout

use async_trait::async_trait;

use crate::ledger::types::{BalanceInfo, LedgerResult, SubmitReceipt, TxRecord, TxReference};
use crate::wallet::transaction::BroadcastForm;

/// Request/response exchange with a ledger node.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Balance and last used nonce of `address`.
    async fn get_balance(&self, address: &str) -> LedgerResult<BalanceInfo>;

    /// Broadcast a signed transfer.
    async fn submit(&self, form: &BroadcastForm) -> LedgerResult<SubmitReceipt>;

    /// Look up a transaction by hash.
    async fn get_transaction(&self, hash: &str) -> LedgerResult<TxRecord>;

    /// Most recent transaction references of `address`, newest first.
    async fn recent_transactions(&self, address: &str, limit: usize)
        -> LedgerResult<Vec<TxReference>>;

    /// Nonce the next submission from `address` must carry.
    async fn next_nonce(&self, address: &str) -> LedgerResult<u64> {
        self.get_balance(address).await?.next_nonce()
    }
}

#[async_trait]
impl<G: LedgerGateway + ?Sized> LedgerGateway for std::sync::Arc<G> {
    async fn get_balance(&self, address: &str) -> LedgerResult<BalanceInfo> {
        (**self).get_balance(address).await
    }

    async fn submit(&self, form: &BroadcastForm) -> LedgerResult<SubmitReceipt> {
        (**self).submit(form).await
    }

    async fn get_transaction(&self, hash: &str) -> LedgerResult<TxRecord> {
        (**self).get_transaction(hash).await
    }

    async fn recent_transactions(
        &self,
        address: &str,
        limit: usize,
    ) -> LedgerResult<Vec<TxReference>> {
        (**self).recent_transactions(address, limit).await
    }
}
