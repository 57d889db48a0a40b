//! Per-bill re-entrancy guard for settlements.

use std::collections::HashSet;
use std::sync::Mutex;

/// Bill ids with a settlement currently running.
#[derive(Debug, Default)]
pub struct InFlightSettlements {
    bill_ids: Mutex<HashSet<String>>,
}

impl InFlightSettlements {
    /// Returns `None` when a settlement for `bill_id` is already running.
    pub fn try_acquire(&self, bill_id: &str) -> Option<InFlightGuard<'_>> {
        let mut ids = self.bill_ids.lock().unwrap();
        if !ids.insert(bill_id.to_string()) {
            return None;
        }
        Some(InFlightGuard {
            owner: self,
            bill_id: bill_id.to_string(),
        })
    }

    pub fn is_in_flight(&self, bill_id: &str) -> bool {
        self.bill_ids.lock().unwrap().contains(bill_id)
    }
}

/// RAII guard that releases the bill when dropped.
pub struct InFlightGuard<'a> {
    owner: &'a InFlightSettlements,
    bill_id: String,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let mut ids = self.owner.bill_ids.lock().unwrap();
        ids.remove(&self.bill_id);
    }
}
