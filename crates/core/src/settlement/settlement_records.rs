//! Records linking a settled bill to the loan payment its settlement made.
//!
//! With the payment id on file, unmark-paid deletes exactly that payment
//! instead of searching the loan ledger by date and amount.

use std::collections::HashMap;
use std::sync::Mutex;

/// Store of bill id -> auto-payment id for the latest mark-paid.
pub trait SettlementRecordStore: Send + Sync {
    fn record_payment(&self, bill_id: &str, payment_id: &str);

    /// Removes and returns the payment id recorded for `bill_id`.
    fn take_payment(&self, bill_id: &str) -> Option<String>;

    fn forget(&self, bill_id: &str) {
        let _ = self.take_payment(bill_id);
    }
}

/// Process-local record store.
#[derive(Debug, Default)]
pub struct InMemorySettlementRecords {
    payments: Mutex<HashMap<String, String>>,
}

impl InMemorySettlementRecords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn payment_for(&self, bill_id: &str) -> Option<String> {
        self.payments.lock().unwrap().get(bill_id).cloned()
    }
}

impl SettlementRecordStore for InMemorySettlementRecords {
    fn record_payment(&self, bill_id: &str, payment_id: &str) {
        self.payments
            .lock()
            .unwrap()
            .insert(bill_id.to_string(), payment_id.to_string());
    }

    fn take_payment(&self, bill_id: &str) -> Option<String> {
        self.payments.lock().unwrap().remove(bill_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_record_wins_and_take_removes_it() {
        let store = InMemorySettlementRecords::new();
        store.record_payment("bill-1", "pay-1");
        store.record_payment("bill-1", "pay-2");
        assert_eq!(store.payment_for("bill-1").as_deref(), Some("pay-2"));
        assert_eq!(store.take_payment("bill-1").as_deref(), Some("pay-2"));
        assert_eq!(store.take_payment("bill-1"), None);
    }
}
