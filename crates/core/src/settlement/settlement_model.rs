//! Settlement outcomes and the compensation log.

use serde::Serialize;
use uuid::Uuid;

use crate::bills::RecurringBill;
use crate::errors::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SettlementKind {
    MarkPaid,
    UnmarkPaid,
}

impl SettlementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SettlementKind::MarkPaid => "mark paid",
            SettlementKind::UnmarkPaid => "unmark paid",
        }
    }
}

/// What happened to the bill itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SettlementOutcome {
    /// The bill service accepted the state change.
    Applied,
    /// The bill was already in the requested state; nothing was sent.
    AlreadySettled,
}

/// A dependent action run after the bill state changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CompensationAction {
    CreateLoanPayment { loan_id: String },
    DeleteLoanPayment { loan_id: String },
    SavingsDeposit { goal_id: String },
    SavingsWithdrawal { goal_id: String },
}

impl CompensationAction {
    pub fn describe(&self) -> String {
        match self {
            CompensationAction::CreateLoanPayment { loan_id } => {
                format!("create auto-payment on loan {}", loan_id)
            }
            CompensationAction::DeleteLoanPayment { loan_id } => {
                format!("delete auto-payment on loan {}", loan_id)
            }
            CompensationAction::SavingsDeposit { goal_id } => {
                format!("deposit into savings goal {}", goal_id)
            }
            CompensationAction::SavingsWithdrawal { goal_id } => {
                format!("withdraw from savings goal {}", goal_id)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StepStatus {
    Success,
    /// Nothing to do (e.g. no matching auto-payment to remove).
    Skipped,
    Failed,
}

/// One entry of the compensation log.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompensationStep {
    pub action: CompensationAction,
    pub status: StepStatus,
    /// Created/deleted record id on success, reason otherwise.
    pub detail: Option<String>,
}

impl CompensationStep {
    pub fn success(action: CompensationAction, detail: Option<String>) -> Self {
        Self {
            action,
            status: StepStatus::Success,
            detail,
        }
    }

    pub fn skipped(action: CompensationAction, reason: impl Into<String>) -> Self {
        Self {
            action,
            status: StepStatus::Skipped,
            detail: Some(reason.into()),
        }
    }

    pub fn failed(action: CompensationAction, error: &Error) -> Self {
        Self {
            action,
            status: StepStatus::Failed,
            detail: Some(error.to_string()),
        }
    }
}

/// Result of a mark-paid / unmark-paid call whose primary step succeeded
/// (or was a no-op).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementReport {
    pub settlement_id: String,
    pub bill_id: String,
    pub kind: SettlementKind,
    pub outcome: SettlementOutcome,
    /// Bill as returned by the bill service, when it was called.
    pub bill: Option<RecurringBill>,
    pub steps: Vec<CompensationStep>,
}

impl SettlementReport {
    pub fn new(bill_id: &str, kind: SettlementKind) -> Self {
        Self {
            settlement_id: Uuid::new_v4().to_string(),
            bill_id: bill_id.to_string(),
            kind,
            outcome: SettlementOutcome::Applied,
            bill: None,
            steps: Vec::new(),
        }
    }

    pub fn already_settled(bill_id: &str, kind: SettlementKind) -> Self {
        Self {
            outcome: SettlementOutcome::AlreadySettled,
            ..Self::new(bill_id, kind)
        }
    }

    pub fn push(&mut self, step: CompensationStep) {
        self.steps.push(step);
    }

    pub fn failed_steps(&self) -> impl Iterator<Item = &CompensationStep> {
        self.steps.iter().filter(|s| s.status == StepStatus::Failed)
    }

    pub fn has_failures(&self) -> bool {
        self.failed_steps().next().is_some()
    }

    /// Softer error to surface when the bill changed but a linked loan or
    /// savings action did not go through.
    pub fn compensation_error(&self) -> Option<Error> {
        let failures: Vec<String> = self
            .failed_steps()
            .map(|step| match &step.detail {
                Some(detail) => format!("{} ({})", step.action.describe(), detail),
                None => step.action.describe(),
            })
            .collect();
        if failures.is_empty() {
            None
        } else {
            Some(Error::CompensationFailed(failures.join("; ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compensation_error_lists_failed_steps_only() {
        let mut report = SettlementReport::new("bill-1", SettlementKind::MarkPaid);
        report.push(CompensationStep::success(
            CompensationAction::CreateLoanPayment {
                loan_id: "loan-1".into(),
            },
            Some("pay-1".into()),
        ));
        assert!(!report.has_failures());
        assert!(report.compensation_error().is_none());

        report.push(CompensationStep::failed(
            CompensationAction::SavingsDeposit {
                goal_id: "goal-1".into(),
            },
            &Error::NetworkFailure("reset".into()),
        ));
        let err = report.compensation_error().unwrap();
        let message = err.to_string();
        assert!(message.contains("deposit into savings goal goal-1"));
        assert!(!message.contains("loan-1"));
    }

    #[test]
    fn already_settled_report_has_no_steps() {
        let report = SettlementReport::already_settled("bill-1", SettlementKind::UnmarkPaid);
        assert_eq!(report.outcome, SettlementOutcome::AlreadySettled);
        assert!(report.steps.is_empty());
        assert!(report.bill.is_none());
    }
}
