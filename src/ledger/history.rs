//! Transaction history and client-side statistics.
//!
//! Both operations are best-effort: a reference that fails to resolve is
//! skipped, never reported.

use futures_util::stream::{self, StreamExt};

use crate::ledger::gateway::LedgerGateway;
use crate::ledger::types::{HistoryEntry, LedgerResult, TxReference, WalletStats};
use crate::wallet::amount::parse_display_amount;

/// History depth used by `get_stats`.
pub const STATS_HISTORY_LIMIT: usize = 50;

/// Lookups in flight at once while resolving references.
const RESOLVE_CONCURRENCY: usize = 4;

/// Recent transactions of `address`, newest first.
///
/// Only the listing call itself can fail. Entries whose lookup fails or
/// whose record lacks `parsed_tx` are dropped.
pub async fn get_history<G: LedgerGateway + ?Sized>(
    gateway: &G,
    address: &str,
    limit: usize,
) -> LedgerResult<Vec<HistoryEntry>> {
    let references = gateway.recent_transactions(address, limit).await?;
    let listed = references.len();

    let entries: Vec<HistoryEntry> = stream::iter(references)
        .map(|reference| resolve(gateway, reference))
        .buffered(RESOLVE_CONCURRENCY)
        .filter_map(|entry| async move { entry })
        .collect()
        .await;

    tracing::debug!(address, listed, resolved = entries.len(), "History resolved");
    Ok(entries)
}

async fn resolve<G: LedgerGateway + ?Sized>(gateway: &G, reference: TxReference) -> Option<HistoryEntry> {
    let record = match gateway.get_transaction(&reference.hash).await {
        Ok(record) => record,
        Err(e) => {
            tracing::debug!(hash = %reference.hash, error = %e, "Skipping unresolved history entry");
            return None;
        }
    };

    let parsed = record.parsed?;
    Some(HistoryEntry {
        hash: reference.hash,
        epoch: reference.epoch,
        from: parsed.from,
        to: parsed.to,
        amount: parsed.amount,
        timestamp: parsed.timestamp,
        status: record.status.unwrap_or_else(|| "confirmed".to_string()),
    })
}

/// Totals over the last `STATS_HISTORY_LIMIT` transactions of `address`.
///
/// Sender and recipient are matched ignoring ASCII case. Amounts that do
/// not parse are left out of both totals but still counted.
pub async fn get_stats<G: LedgerGateway + ?Sized>(gateway: &G, address: &str) -> LedgerResult<WalletStats> {
    let history = get_history(gateway, address, STATS_HISTORY_LIMIT).await?;
    Ok(aggregate(address, &history))
}

fn aggregate(address: &str, history: &[HistoryEntry]) -> WalletStats {
    let mut stats = WalletStats {
        tx_count: history.len(),
        ..WalletStats::default()
    };

    for entry in history {
        let atoms = match parse_display_amount(&entry.amount) {
            Ok(atoms) => atoms as u128,
            Err(_) => continue,
        };

        if entry.from.eq_ignore_ascii_case(address) {
            stats.total_out += atoms;
        } else if entry.to.eq_ignore_ascii_case(address) {
            stats.total_in += atoms;
        }
    }

    stats
}
