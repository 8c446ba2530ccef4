// Gastos Bot - Cached Ledger Reads
// Freshness-window memoization between the dashboard and the store

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::record::FinancialRecord;
use crate::store::LedgerStore;

/// Default freshness window for dashboard reads
pub const DEFAULT_FRESHNESS: Duration = Duration::from_secs(60);

struct Snapshot {
    fetched_at: Instant,
    records: Vec<FinancialRecord>,
}

/// CachedLedger - serves a recent snapshot instead of hitting the store on
/// every dashboard render.
///
/// Remembers the last fetch (instant + result) and returns it while younger
/// than the window. No write path invalidates the cache early; staleness up
/// to the window is the accepted tradeoff for skipping a backend round-trip.
pub struct CachedLedger {
    store: Arc<dyn LedgerStore>,
    window: Duration,
    slot: Mutex<Option<Snapshot>>,
}

impl CachedLedger {
    pub fn new(store: Arc<dyn LedgerStore>, window: Duration) -> Self {
        CachedLedger {
            store,
            window,
            slot: Mutex::new(None),
        }
    }

    /// Read the ledger, served from cache while fresh.
    ///
    /// Never fails: a store error is logged and read as an empty ledger.
    /// The previous snapshot is kept in that case, so the next read retries
    /// instead of pinning the failure for a whole window.
    pub fn records(&self) -> Vec<FinancialRecord> {
        let mut slot = self.slot.lock().unwrap();

        if let Some(snapshot) = slot.as_ref() {
            if snapshot.fetched_at.elapsed() < self.window {
                return snapshot.records.clone();
            }
        }

        match self.store.read_all() {
            Ok(records) => {
                *slot = Some(Snapshot {
                    fetched_at: Instant::now(),
                    records: records.clone(),
                });
                records
            }
            Err(e) => {
                eprintln!("Error reading ledger for dashboard: {}", e);
                Vec::new()
            }
        }
    }
}
