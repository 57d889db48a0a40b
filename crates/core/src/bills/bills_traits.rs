use crate::bills::bills_model::{BillSummary, NewRecurringBill, RecurringBill};
use crate::errors::Result;
use async_trait::async_trait;

/// Remote bill service. It owns bill state and is the only party that
/// moves `next_due_date`.
#[async_trait]
pub trait BillServiceTrait: Send + Sync {
    async fn get_all(&self) -> Result<Vec<RecurringBill>>;
    async fn get_summary(&self) -> Result<BillSummary>;
    async fn create(&self, new_bill: NewRecurringBill) -> Result<RecurringBill>;
    async fn update(&self, bill: RecurringBill) -> Result<RecurringBill>;
    async fn delete(&self, bill_id: &str) -> Result<()>;
    /// Marks the current occurrence paid and advances the due date.
    async fn mark_paid(&self, bill_id: &str) -> Result<RecurringBill>;
    /// Reverts the last payment and rewinds the due date one cycle.
    async fn unmark_paid(&self, bill_id: &str) -> Result<RecurringBill>;
}
