use async_trait::async_trait;

use crate::bills::{BillSummary, BillsOverview, NewRecurringBill, RecurringBill};
use crate::errors::Result;
use crate::settlement::bill_list::BillSnapshot;
use crate::settlement::settlement_model::SettlementReport;

/// Entry points the bill screen talks to.
#[async_trait]
pub trait SettlementCoordinatorTrait: Send + Sync {
    /// Current local bill list.
    fn bills(&self) -> BillSnapshot;

    /// Sections and totals for the current local list.
    fn overview(&self) -> BillsOverview;

    /// Re-fetches the list from the bill service and re-classifies it.
    async fn refresh(&self) -> Result<BillsOverview>;

    async fn summary(&self) -> Result<BillSummary>;

    async fn create_bill(&self, new_bill: NewRecurringBill) -> Result<RecurringBill>;

    async fn update_bill(&self, bill: RecurringBill) -> Result<RecurringBill>;

    async fn delete_bill(&self, bill_id: &str) -> Result<()>;

    /// Marks the bill paid and applies its loan/savings side effects.
    async fn mark_paid(&self, bill: &RecurringBill) -> Result<SettlementReport>;

    /// Reverts a payment. Callers must have confirmed with the user.
    async fn unmark_paid(&self, bill: &RecurringBill) -> Result<SettlementReport>;
}
