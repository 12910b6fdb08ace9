//! Confirmation polling.
//!
//! # States
//! - Pending: submitted, not yet seen in the ledger's history
//! - Confirmed: `status == "confirmed"` or a non-null `epoch`
//! - TimedOut: deadline passed before confirmation
//! - Cancelled: caller fired its cancel token
//!
//! # State Transitions
//! ```text
//! Pending → Pending:   lookup error, or record without a confirmation signal
//! Pending → Confirmed: either confirmation signal present
//! Pending → TimedOut:  now >= deadline
//! Pending → Cancelled: cancel token fired (also interrupts an in-flight lookup)
//! ```

use std::time::Duration;

use tokio::time::{interval_at, sleep_until, Instant, MissedTickBehavior};

use crate::config::ConfirmationConfig;
use crate::ledger::gateway::LedgerGateway;
use crate::ledger::types::{LedgerError, LedgerResult, TxRecord};
use crate::lifecycle::CancelToken;
use crate::observability::metrics;

/// Default delay between lookups.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Shortest accepted delay between lookups; smaller values are raised to it.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Stand-in deadline for timeouts too large to add to `Instant::now()`.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Terminal or intermediate state of a wait.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmationState {
    Pending,
    Confirmed(TxRecord),
    TimedOut,
    Cancelled,
}

impl ConfirmationState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ConfirmationState::Pending)
    }
}

/// Polls a gateway until a transaction confirms, times out, or is cancelled.
#[derive(Debug, Clone)]
pub struct ConfirmationWaiter<G> {
    gateway: G,
    poll_interval: Duration,
}

impl<G: LedgerGateway> ConfirmationWaiter<G> {
    /// `poll_interval` is raised to `MIN_POLL_INTERVAL` if smaller.
    pub fn new(gateway: G, poll_interval: Duration) -> Self {
        Self {
            gateway,
            poll_interval: poll_interval.max(MIN_POLL_INTERVAL),
        }
    }

    pub fn from_config(gateway: G, config: &ConfirmationConfig) -> Self {
        Self::new(gateway, config.poll_interval())
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Wait for `tx_hash` to confirm, returning the confirming record.
    ///
    /// Lookup errors count as "not yet confirmed"; only the deadline or
    /// the cancel token end the wait early.
    pub async fn wait(
        &self,
        tx_hash: &str,
        timeout: Duration,
        cancel: &CancelToken,
    ) -> LedgerResult<TxRecord> {
        match self.run(tx_hash, timeout, cancel).await {
            ConfirmationState::Confirmed(record) => Ok(record),
            ConfirmationState::TimedOut => Err(LedgerError::Timeout(timeout)),
            ConfirmationState::Cancelled => Err(LedgerError::Cancelled),
            // run() only returns terminal states
            ConfirmationState::Pending => Err(LedgerError::Timeout(timeout)),
        }
    }

    /// Drive the state machine to a terminal state.
    pub async fn run(&self, tx_hash: &str, timeout: Duration, cancel: &CancelToken) -> ConfirmationState {
        let started = Instant::now();
        let deadline = far_future_saturating(started, timeout);
        let first_tick = far_future_saturating(started, self.poll_interval);
        let mut ticker = interval_at(first_tick, self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(tx_hash, timeout_secs = timeout.as_secs(), "Waiting for confirmation");

        let mut polls = 0u32;
        let state = loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break ConfirmationState::Cancelled,
                _ = sleep_until(deadline) => break ConfirmationState::TimedOut,
                _ = ticker.tick() => {}
            }

            polls += 1;
            let lookup = tokio::select! {
                biased;
                _ = cancel.cancelled() => break ConfirmationState::Cancelled,
                _ = sleep_until(deadline) => break ConfirmationState::TimedOut,
                lookup = self.gateway.get_transaction(tx_hash) => lookup,
            };

            match lookup {
                Ok(record) if record.is_confirmed() => break ConfirmationState::Confirmed(record),
                Ok(record) => {
                    tracing::debug!(tx_hash, polls, status = ?record.status, "Transaction pending");
                }
                Err(e) => {
                    tracing::debug!(tx_hash, polls, error = %e, "Lookup failed, still pending");
                }
            }
        };

        let outcome = match &state {
            ConfirmationState::Confirmed(_) => "confirmed",
            ConfirmationState::TimedOut => "timeout",
            ConfirmationState::Cancelled => "cancelled",
            ConfirmationState::Pending => "pending",
        };
        metrics::record_confirmation(outcome);
        tracing::info!(tx_hash, polls, outcome, elapsed_ms = started.elapsed().as_millis() as u64, "Confirmation wait finished");

        state
    }
}

/// `start + offset`, or a far-future instant when that would overflow.
fn far_future_saturating(start: Instant, offset: Duration) -> Instant {
    start
        .checked_add(offset)
        .unwrap_or_else(|| start + FAR_FUTURE)
}
