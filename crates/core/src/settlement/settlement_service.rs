use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, error, info, warn};
use std::future::Future;
use std::sync::Arc;

use super::bill_list::{BillList, BillSnapshot};
use super::in_flight::InFlightSettlements;
use super::settlement_model::{
    CompensationAction, CompensationStep, SettlementKind, SettlementReport,
};
use super::settlement_records::SettlementRecordStore;
use super::settlement_traits::SettlementCoordinatorTrait;
use crate::bills::{BillServiceTrait, BillSummary, BillsOverview, NewRecurringBill, RecurringBill};
use crate::config::SettlementConfig;
use crate::errors::{Error, Result};
use crate::loans::{LoanPaymentServiceTrait, NewLoanPayment};
use crate::savings::SavingsGoalServiceTrait;
use crate::utils::Clock;

/// Runs the settlement protocol for recurring bills and keeps the local
/// bill list the screen renders from.
///
/// The bill service is authoritative for a bill's paid state and due date.
/// Loan payments and savings movements are best-effort follow-ups recorded
/// in the returned [`SettlementReport`]; a failed follow-up never reverts
/// the bill.
pub struct SettlementCoordinator {
    bill_service: Arc<dyn BillServiceTrait>,
    loan_payment_service: Arc<dyn LoanPaymentServiceTrait>,
    savings_goal_service: Arc<dyn SavingsGoalServiceTrait>,
    records: Arc<dyn SettlementRecordStore>,
    clock: Arc<dyn Clock>,
    config: SettlementConfig,
    bills: BillList,
    in_flight: InFlightSettlements,
}

impl SettlementCoordinator {
    pub fn new(
        bill_service: Arc<dyn BillServiceTrait>,
        loan_payment_service: Arc<dyn LoanPaymentServiceTrait>,
        savings_goal_service: Arc<dyn SavingsGoalServiceTrait>,
        records: Arc<dyn SettlementRecordStore>,
        clock: Arc<dyn Clock>,
        config: SettlementConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            bill_service,
            loan_payment_service,
            savings_goal_service,
            records,
            clock,
            config,
            bills: BillList::default(),
            in_flight: InFlightSettlements::default(),
        })
    }

    /// Seeds the local list without calling the bill service.
    pub fn with_bills(self, bills: Vec<RecurringBill>) -> Self {
        self.bills.replace(Arc::new(bills));
        self
    }

    pub fn is_settling(&self, bill_id: &str) -> bool {
        self.in_flight.is_in_flight(bill_id)
    }

    async fn bounded<T: Send>(
        &self,
        operation: &str,
        request: impl Future<Output = Result<T>> + Send,
    ) -> Result<T> {
        match tokio::time::timeout(self.config.request_timeout, request).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout {
                operation: operation.to_string(),
                after: self.config.request_timeout,
            }),
        }
    }

    /// Paid state as the screen currently shows it.
    fn displayed_paid_state(&self, bill: &RecurringBill) -> bool {
        self.bills
            .find(&bill.id)
            .map(|local| local.is_paid)
            .unwrap_or(bill.is_paid)
    }

    /// Stores the bill as the service returned it, so the next settlement
    /// call sees the new paid state even if the list never held the bill.
    fn record_local_state(&self, updated: &RecurringBill, is_paid: bool) {
        let mut bill = updated.clone();
        bill.is_paid = is_paid;
        self.bills.upsert(bill);
    }

    async fn create_auto_payment(
        &self,
        bill: &RecurringBill,
        loan_id: &str,
        today: NaiveDate,
    ) -> CompensationStep {
        let action = CompensationAction::CreateLoanPayment {
            loan_id: loan_id.to_string(),
        };
        let payment = NewLoanPayment::auto_payment(
            loan_id,
            bill.amount,
            today,
            &bill.name,
            &self.config.auto_payment_marker,
        );
        match self
            .bounded(
                "create loan payment",
                self.loan_payment_service.create(payment),
            )
            .await
        {
            Ok(created) => {
                debug!(
                    "Recorded auto-payment {} on loan {} for bill {}",
                    created.id, loan_id, bill.id
                );
                self.records.record_payment(&bill.id, &created.id);
                CompensationStep::success(action, Some(created.id))
            }
            Err(e) => {
                warn!(
                    "Bill {} marked paid but loan payment on {} failed: {}",
                    bill.id, loan_id, e
                );
                CompensationStep::failed(action, &e)
            }
        }
    }

    async fn deposit_savings(&self, bill: &RecurringBill, goal_id: &str) -> CompensationStep {
        let action = CompensationAction::SavingsDeposit {
            goal_id: goal_id.to_string(),
        };
        match self
            .bounded(
                "deposit into savings goal",
                self.savings_goal_service.add_deposit(goal_id, bill.amount),
            )
            .await
        {
            Ok(()) => CompensationStep::success(action, None),
            Err(e) => {
                warn!(
                    "Bill {} marked paid but deposit into goal {} failed: {}",
                    bill.id, goal_id, e
                );
                CompensationStep::failed(action, &e)
            }
        }
    }

    /// Payment id of the auto-payment made for `bill` today, found by date,
    /// amount and marker. Only used when no settlement record exists.
    async fn find_auto_payment(
        &self,
        bill: &RecurringBill,
        loan_id: &str,
        today: NaiveDate,
    ) -> Result<Option<String>> {
        let payments = self
            .bounded(
                "list loan payments",
                self.loan_payment_service.get_by_loan(loan_id),
            )
            .await?;
        Ok(payments
            .into_iter()
            .find(|p| {
                p.matches_auto_payment(
                    today,
                    bill.amount,
                    self.config.amount_tolerance,
                    &self.config.auto_payment_marker,
                )
            })
            .map(|p| p.id))
    }

    async fn remove_auto_payment(
        &self,
        bill: &RecurringBill,
        loan_id: &str,
        today: NaiveDate,
    ) -> CompensationStep {
        let action = CompensationAction::DeleteLoanPayment {
            loan_id: loan_id.to_string(),
        };

        let payment_id = match self.records.take_payment(&bill.id) {
            Some(payment_id) => payment_id,
            None => match self.find_auto_payment(bill, loan_id, today).await {
                Ok(Some(payment_id)) => payment_id,
                Ok(None) => {
                    info!(
                        "No auto-payment on loan {} to remove for bill {}",
                        loan_id, bill.id
                    );
                    return CompensationStep::skipped(action, "no matching auto-payment");
                }
                Err(e) => {
                    warn!(
                        "Could not look up auto-payment on loan {} for bill {}: {}",
                        loan_id, bill.id, e
                    );
                    return CompensationStep::failed(action, &e);
                }
            },
        };

        match self
            .bounded(
                "delete loan payment",
                self.loan_payment_service.delete(&payment_id),
            )
            .await
        {
            Ok(()) => CompensationStep::success(action, Some(payment_id)),
            Err(e) => {
                // Keep the id so a retry deletes the same payment.
                self.records.record_payment(&bill.id, &payment_id);
                warn!(
                    "Bill {} unmarked but deleting payment {} failed: {}",
                    bill.id, payment_id, e
                );
                CompensationStep::failed(action, &e)
            }
        }
    }

    async fn withdraw_savings(&self, bill: &RecurringBill, goal_id: &str) -> CompensationStep {
        let action = CompensationAction::SavingsWithdrawal {
            goal_id: goal_id.to_string(),
        };
        match self
            .bounded(
                "withdraw from savings goal",
                self.savings_goal_service.withdraw(goal_id, bill.amount),
            )
            .await
        {
            Ok(()) => CompensationStep::success(action, None),
            Err(e) => {
                warn!(
                    "Bill {} unmarked but withdrawal from goal {} failed: {}",
                    bill.id, goal_id, e
                );
                CompensationStep::failed(action, &e)
            }
        }
    }
}

#[async_trait]
impl SettlementCoordinatorTrait for SettlementCoordinator {
    fn bills(&self) -> BillSnapshot {
        self.bills.snapshot()
    }

    fn overview(&self) -> BillsOverview {
        BillsOverview::build(&self.bills.snapshot(), self.clock.today())
    }

    async fn refresh(&self) -> Result<BillsOverview> {
        let bills = self
            .bounded("fetch bills", self.bill_service.get_all())
            .await?;
        debug!("Fetched {} recurring bills", bills.len());
        self.bills.replace(Arc::new(bills));
        Ok(self.overview())
    }

    async fn summary(&self) -> Result<BillSummary> {
        self.bounded("fetch bill summary", self.bill_service.get_summary())
            .await
    }

    async fn create_bill(&self, new_bill: NewRecurringBill) -> Result<RecurringBill> {
        new_bill.validate()?;
        let created = self
            .bounded(
                "create bill",
                self.bill_service.create(new_bill.with_resolved_links()),
            )
            .await?;
        self.bills.upsert(created.clone());
        Ok(created)
    }

    async fn update_bill(&self, mut bill: RecurringBill) -> Result<RecurringBill> {
        bill.validate()?;
        if bill.migrate_legacy_links() {
            debug!("Moved reference tags of bill {} into link fields", bill.id);
        }
        let updated = self
            .bounded("update bill", self.bill_service.update(bill))
            .await?;
        self.bills.upsert(updated.clone());
        Ok(updated)
    }

    async fn delete_bill(&self, bill_id: &str) -> Result<()> {
        self.bounded("delete bill", self.bill_service.delete(bill_id))
            .await?;
        self.bills.remove(bill_id);
        self.records.forget(bill_id);
        Ok(())
    }

    async fn mark_paid(&self, bill: &RecurringBill) -> Result<SettlementReport> {
        let _in_flight = self
            .in_flight
            .try_acquire(&bill.id)
            .ok_or_else(|| Error::SettlementInProgress(bill.id.clone()))?;

        if self.displayed_paid_state(bill) {
            debug!("Bill {} is already paid, ignoring mark-paid", bill.id);
            return Ok(SettlementReport::already_settled(
                &bill.id,
                SettlementKind::MarkPaid,
            ));
        }

        let mut report = SettlementReport::new(&bill.id, SettlementKind::MarkPaid);
        let pending = self.bills.optimistic_paid(&bill.id, true);

        let updated = match self
            .bounded("mark bill paid", self.bill_service.mark_paid(&bill.id))
            .await
        {
            Ok(updated) => updated,
            Err(e) => {
                error!("Failed to mark bill {} as paid: {}", bill.id, e);
                drop(pending);
                return Err(e);
            }
        };
        pending.commit();
        self.record_local_state(&updated, true);
        report.bill = Some(updated);

        let today = self.clock.today();
        let links = bill.links();
        if let Some(loan_id) = links.loan_id.as_deref() {
            report.push(self.create_auto_payment(bill, loan_id, today).await);
        }
        if let Some(goal_id) = links.savings_goal_id.as_deref() {
            report.push(self.deposit_savings(bill, goal_id).await);
        }

        info!(
            "Bill {} marked paid ({} linked action(s), settlement {})",
            bill.id,
            report.steps.len(),
            report.settlement_id
        );
        Ok(report)
    }

    async fn unmark_paid(&self, bill: &RecurringBill) -> Result<SettlementReport> {
        let _in_flight = self
            .in_flight
            .try_acquire(&bill.id)
            .ok_or_else(|| Error::SettlementInProgress(bill.id.clone()))?;

        if !self.displayed_paid_state(bill) {
            debug!("Bill {} is not paid, ignoring unmark-paid", bill.id);
            return Ok(SettlementReport::already_settled(
                &bill.id,
                SettlementKind::UnmarkPaid,
            ));
        }

        let mut report = SettlementReport::new(&bill.id, SettlementKind::UnmarkPaid);
        let updated = self
            .bounded("unmark bill paid", self.bill_service.unmark_paid(&bill.id))
            .await
            .inspect_err(|e| error!("Failed to unmark bill {} as paid: {}", bill.id, e))?;
        self.record_local_state(&updated, false);
        report.bill = Some(updated);

        let today = self.clock.today();
        let links = bill.links();
        if let Some(loan_id) = links.loan_id.as_deref() {
            report.push(self.remove_auto_payment(bill, loan_id, today).await);
        }
        if let Some(goal_id) = links.savings_goal_id.as_deref() {
            report.push(self.withdraw_savings(bill, goal_id).await);
        }

        if report.has_failures() {
            warn!(
                "Bill {} unmarked with failed linked actions (settlement {})",
                bill.id, report.settlement_id
            );
        } else {
            info!(
                "Bill {} unmarked ({} linked action(s), settlement {})",
                bill.id,
                report.steps.len(),
                report.settlement_id
            );
        }
        Ok(report)
    }
}
