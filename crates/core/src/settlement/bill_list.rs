//! Shared in-memory bill list.
//!
//! Every mutation builds a new `Vec` and swaps the `Arc`, so readers holding
//! a snapshot never observe a half-applied change.

use log::debug;
use std::sync::{Arc, RwLock};

use crate::bills::RecurringBill;

pub type BillSnapshot = Arc<Vec<RecurringBill>>;

#[derive(Debug, Default)]
pub struct BillList {
    current: RwLock<BillSnapshot>,
}

impl BillList {
    pub fn new(bills: Vec<RecurringBill>) -> Self {
        Self {
            current: RwLock::new(Arc::new(bills)),
        }
    }

    pub fn snapshot(&self) -> BillSnapshot {
        self.current.read().unwrap().clone()
    }

    /// Swaps in `bills`, returning the previous snapshot.
    pub fn replace(&self, bills: BillSnapshot) -> BillSnapshot {
        std::mem::replace(&mut *self.current.write().unwrap(), bills)
    }

    pub fn find(&self, bill_id: &str) -> Option<RecurringBill> {
        self.snapshot().iter().find(|b| b.id == bill_id).cloned()
    }

    /// Applies `change` to a copy of the list and swaps it in.
    /// Returns the snapshot that was replaced.
    pub fn update_with(&self, change: impl FnOnce(&mut Vec<RecurringBill>)) -> BillSnapshot {
        let mut current = self.current.write().unwrap();
        let mut next = current.as_ref().clone();
        change(&mut next);
        std::mem::replace(&mut *current, Arc::new(next))
    }

    pub fn set_paid(&self, bill_id: &str, is_paid: bool) -> BillSnapshot {
        self.update_with(|bills| {
            if let Some(bill) = bills.iter_mut().find(|b| b.id == bill_id) {
                bill.is_paid = is_paid;
            }
        })
    }

    /// Replaces the bill with the same id, or appends it.
    pub fn upsert(&self, bill: RecurringBill) -> BillSnapshot {
        self.update_with(|bills| match bills.iter_mut().find(|b| b.id == bill.id) {
            Some(existing) => *existing = bill,
            None => bills.push(bill),
        })
    }

    pub fn remove(&self, bill_id: &str) -> BillSnapshot {
        self.update_with(|bills| bills.retain(|b| b.id != bill_id))
    }

    /// Sets the paid flag now. Unless the returned guard is committed, the
    /// bill's previous record is put back on drop.
    pub fn optimistic_paid(&self, bill_id: &str, is_paid: bool) -> OptimisticUpdate<'_> {
        let mut current = self.current.write().unwrap();
        let previous = current.clone();
        let mut next = previous.as_ref().clone();
        if let Some(bill) = next.iter_mut().find(|b| b.id == bill_id) {
            bill.is_paid = is_paid;
        }
        let produced = Arc::new(next);
        *current = produced.clone();
        OptimisticUpdate {
            list: self,
            bill_id: bill_id.to_string(),
            previous: Some(previous),
            produced,
        }
    }

    /// Undoes an optimistic update. The whole snapshot is restored only
    /// when nothing else changed the list in between; otherwise only the
    /// bill's own record is put back and later changes to other bills stay.
    fn roll_back(&self, bill_id: &str, previous: BillSnapshot, produced: &BillSnapshot) {
        let mut current = self.current.write().unwrap();
        if Arc::ptr_eq(&*current, produced) {
            *current = previous;
            return;
        }
        let Some(prior) = previous.iter().find(|b| b.id == bill_id).cloned() else {
            return;
        };
        let mut next = current.as_ref().clone();
        if let Some(slot) = next.iter_mut().find(|b| b.id == bill_id) {
            *slot = prior;
            *current = Arc::new(next);
        }
    }
}

/// Pending optimistic change. Dropping it without [`commit`](Self::commit)
/// (error path, timeout, or the owning future being cancelled) rolls the
/// bill back.
#[must_use = "dropping the guard rolls the optimistic update back"]
pub struct OptimisticUpdate<'a> {
    list: &'a BillList,
    bill_id: String,
    previous: Option<BillSnapshot>,
    produced: BillSnapshot,
}

impl OptimisticUpdate<'_> {
    pub fn commit(mut self) {
        self.previous = None;
    }
}

impl Drop for OptimisticUpdate<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            debug!("Rolling back optimistic update for bill {}", self.bill_id);
            self.list.roll_back(&self.bill_id, previous, &self.produced);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bills::BillFrequency;
    use rust_decimal_macros::dec;

    fn bill(id: &str) -> RecurringBill {
        RecurringBill {
            id: id.to_string(),
            name: id.to_string(),
            amount: dec!(10),
            category: String::new(),
            frequency: BillFrequency::Monthly,
            next_due_date: None,
            is_paid: false,
            is_active: true,
            notes: None,
            linked_loan_id: None,
            linked_savings_goal_id: None,
        }
    }

    #[test]
    fn snapshots_are_not_affected_by_later_updates() {
        let list = BillList::new(vec![bill("a"), bill("b")]);
        let before = list.snapshot();
        list.set_paid("a", true);
        assert!(!before[0].is_paid);
        assert!(list.find("a").unwrap().is_paid);
    }

    #[test]
    fn dropped_optimistic_update_restores_snapshot() {
        let list = BillList::new(vec![bill("a")]);
        let before = list.snapshot();
        {
            let _pending = list.optimistic_paid("a", true);
            assert!(list.find("a").unwrap().is_paid);
        }
        assert!(Arc::ptr_eq(&list.snapshot(), &before));
    }

    #[test]
    fn rollback_keeps_changes_made_to_other_bills_meanwhile() {
        let list = BillList::new(vec![bill("a"), bill("b")]);
        {
            let _pending = list.optimistic_paid("a", true);
            list.optimistic_paid("b", true).commit();
        }
        assert!(!list.find("a").unwrap().is_paid);
        assert!(list.find("b").unwrap().is_paid);
    }

    #[test]
    fn committed_optimistic_update_sticks() {
        let list = BillList::new(vec![bill("a")]);
        list.optimistic_paid("a", true).commit();
        assert!(list.find("a").unwrap().is_paid);
    }

    #[test]
    fn upsert_and_remove() {
        let list = BillList::new(vec![bill("a")]);
        let mut renamed = bill("a");
        renamed.name = "renamed".to_string();
        list.upsert(renamed);
        list.upsert(bill("b"));
        assert_eq!(list.snapshot().len(), 2);
        assert_eq!(list.find("a").unwrap().name, "renamed");
        list.remove("a");
        assert!(list.find("a").is_none());
    }
}
