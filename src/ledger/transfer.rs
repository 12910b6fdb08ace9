//! Transfer orchestration: balance check, nonce, sign, submit, confirm.

use std::time::Duration;

use crate::ledger::confirm::ConfirmationWaiter;
use crate::ledger::gateway::LedgerGateway;
use crate::ledger::types::{LedgerError, LedgerResult, SubmitReceipt, TxRecord};
use crate::lifecycle::CancelToken;
use crate::wallet::address::Address;
use crate::wallet::keys::KeyMaterial;
use crate::wallet::transaction::{sign_transaction, SignedTransaction, TransferInstruction};

/// Build and sign a transfer from the key's address.
///
/// Fetches the sender's balance once: the amount must not exceed
/// `balance_raw`, and the nonce is the last used nonce + 1.
pub async fn prepare_transfer<G: LedgerGateway + ?Sized>(
    gateway: &G,
    keys: &KeyMaterial,
    to: Address,
    amount_atoms: u64,
    message: Option<String>,
) -> LedgerResult<SignedTransaction> {
    let sender = keys.address();
    let balance = gateway.get_balance(sender.as_str()).await?;
    let available = balance.balance_atoms()?;

    if amount_atoms > available {
        return Err(LedgerError::InsufficientFunds {
            available,
            requested: amount_atoms,
        });
    }

    let mut instruction =
        TransferInstruction::new(sender.clone(), to, amount_atoms, balance.next_nonce()?);
    if let Some(message) = message {
        instruction = instruction.with_message(message);
    }

    let signed = sign_transaction(instruction, keys)?;
    tracing::info!(
        from = %sender,
        to = %signed.instruction().to,
        amount_atoms,
        nonce = signed.instruction().nonce,
        "Transfer prepared"
    );
    Ok(signed)
}

/// Outcome of a confirmed submission.
#[derive(Debug, Clone)]
pub struct TransferOutcome {
    pub receipt: SubmitReceipt,
    pub record: TxRecord,
}

/// Submit once, then wait for confirmation.
///
/// A submission error is returned as-is; nothing is retried.
pub async fn submit_and_confirm<G: LedgerGateway>(
    gateway: &G,
    signed: &SignedTransaction,
    waiter: &ConfirmationWaiter<G>,
    timeout: Duration,
    cancel: &CancelToken,
) -> LedgerResult<TransferOutcome> {
    let receipt = gateway.submit(&signed.broadcast_form()).await?;
    let record = waiter.wait(&receipt.tx_hash, timeout, cancel).await?;
    Ok(TransferOutcome { receipt, record })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use serde_json::json;

    use crate::ledger::confirm::DEFAULT_POLL_INTERVAL;
    use crate::ledger::types::{BalanceInfo, TxReference};
    use crate::lifecycle::Cancellation;
    use crate::wallet::transaction::BroadcastForm;

    struct MockLedger {
        balance: serde_json::Value,
        submitted: Mutex<Vec<BroadcastForm>>,
        reject_with: Option<(u16, String)>,
        lookups: AtomicU32,
    }

    impl MockLedger {
        fn new(balance_raw: &str, nonce: u64) -> Arc<Self> {
            Arc::new(Self::unshared(balance_raw, nonce))
        }

        fn unshared(balance_raw: &str, nonce: u64) -> Self {
            Self {
                balance: json!({"balance_raw": balance_raw, "nonce": nonce}),
                submitted: Mutex::new(Vec::new()),
                reject_with: None,
                lookups: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl LedgerGateway for MockLedger {
        async fn get_balance(&self, address: &str) -> LedgerResult<BalanceInfo> {
            BalanceInfo::from_value(address, &self.balance)
        }

        async fn submit(&self, form: &BroadcastForm) -> LedgerResult<SubmitReceipt> {
            self.submitted.lock().unwrap().push(form.clone());
            if let Some((status, reason)) = &self.reject_with {
                return Err(LedgerError::Rejected {
                    status: *status,
                    reason: reason.clone(),
                });
            }
            SubmitReceipt::from_value(json!({"tx_hash": "feedbeef"}))
        }

        async fn get_transaction(&self, hash: &str) -> LedgerResult<TxRecord> {
            let n = self.lookups.fetch_add(1, Ordering::SeqCst);
            let status = if n == 0 { "pending" } else { "confirmed" };
            Ok(TxRecord::from_value(json!({"tx_hash": hash, "status": status})))
        }

        async fn recent_transactions(&self, _a: &str, _l: usize) -> LedgerResult<Vec<TxReference>> {
            Ok(Vec::new())
        }
    }

    fn recipient() -> Address {
        KeyMaterial::from_seed(&[9u8; 32]).unwrap().address().clone()
    }

    #[tokio::test]
    async fn test_prepare_uses_next_nonce() {
        let ledger = MockLedger::new("5000000", 41);
        let keys = KeyMaterial::from_seed(&[1u8; 32]).unwrap();

        let signed = prepare_transfer(&*ledger, &keys, recipient(), 1_250_000, Some("rent".into()))
            .await
            .unwrap();

        assert_eq!(signed.instruction().nonce, 42);
        assert_eq!(signed.instruction().amount, "1250000");
        assert_eq!(signed.instruction().message.as_deref(), Some("rent"));
        assert!(signed.verify().is_ok());
    }

    #[tokio::test]
    async fn test_prepare_refuses_overdraft() {
        let ledger = MockLedger::new("1000", 0);
        let keys = KeyMaterial::from_seed(&[1u8; 32]).unwrap();

        let err = prepare_transfer(&*ledger, &keys, recipient(), 1001, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InsufficientFunds { available: 1000, requested: 1001 }
        ));
    }

    #[tokio::test]
    async fn test_prepare_refuses_exhausted_nonce() {
        let ledger = MockLedger::new("5000000", u64::MAX);
        let keys = KeyMaterial::from_seed(&[1u8; 32]).unwrap();

        let err = prepare_transfer(&*ledger, &keys, recipient(), 10, None)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Decode(_)));
        assert!(ledger.submitted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_prepare_allows_exact_balance() {
        let ledger = MockLedger::new("1000", 0);
        let keys = KeyMaterial::from_seed(&[1u8; 32]).unwrap();
        assert!(prepare_transfer(&*ledger, &keys, recipient(), 1000, None).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_and_confirm() {
        let ledger = MockLedger::new("5000000", 0);
        let keys = KeyMaterial::from_seed(&[1u8; 32]).unwrap();
        let signed = prepare_transfer(&*ledger, &keys, recipient(), 10, None)
            .await
            .unwrap();

        let waiter = ConfirmationWaiter::new(ledger.clone(), DEFAULT_POLL_INTERVAL);
        let outcome = submit_and_confirm(
            &ledger,
            &signed,
            &waiter,
            Duration::from_secs(30),
            &CancelToken::never(),
        )
        .await
        .unwrap();

        assert_eq!(outcome.receipt.tx_hash, "feedbeef");
        assert!(outcome.record.is_confirmed());
        assert_eq!(ledger.lookups.load(Ordering::SeqCst), 2);

        let submitted = ledger.submitted.lock().unwrap();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].signature, signed.signature());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_submission_is_not_retried() {
        let ledger = Arc::new(MockLedger {
            reject_with: Some((400, "{\"error\":\"bad nonce\"}".to_string())),
            ..MockLedger::unshared("5000000", 0)
        });
        let keys = KeyMaterial::from_seed(&[1u8; 32]).unwrap();
        let signed = prepare_transfer(&*ledger, &keys, recipient(), 10, None)
            .await
            .unwrap();
        let waiter = ConfirmationWaiter::new(ledger.clone(), DEFAULT_POLL_INTERVAL);
        let cancellation = Cancellation::new();

        let err = submit_and_confirm(&ledger, &signed, &waiter, Duration::from_secs(30), &cancellation.token())
            .await
            .unwrap_err();

        match err {
            LedgerError::Rejected { status, reason } => {
                assert_eq!(status, 400);
                assert_eq!(reason, "{\"error\":\"bad nonce\"}");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(ledger.submitted.lock().unwrap().len(), 1);
        assert_eq!(ledger.lookups.load(Ordering::SeqCst), 0);
    }
}
