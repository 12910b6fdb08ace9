//! Metrics collection.
//!
//! # Metrics
//! - `wallet_tx_submitted_total` (counter): submissions accepted by the node
//! - `wallet_tx_rejected_total` (counter): submissions refused with an error status
//! - `wallet_confirmation_total` (counter): finished waits by `outcome`
//!   (confirmed, timeout, cancelled)
//!
//! No recorder is installed here; without one these calls are no-ops.

pub fn record_submission(accepted: bool) {
    if accepted {
        metrics::counter!("wallet_tx_submitted_total").increment(1);
    } else {
        metrics::counter!("wallet_tx_rejected_total").increment(1);
    }
}

pub fn record_confirmation(outcome: &'static str) {
    metrics::counter!("wallet_confirmation_total", "outcome" => outcome).increment(1);
}
