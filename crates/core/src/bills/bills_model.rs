//! Recurring bill domain models.

use chrono::{Days, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::reference_tags::BillLinks;
use crate::errors::{Error, Result};

/// How often a bill comes due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillFrequency {
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl BillFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillFrequency::Weekly => "weekly",
            BillFrequency::Monthly => "monthly",
            BillFrequency::Quarterly => "quarterly",
            BillFrequency::Yearly => "yearly",
        }
    }

    /// The `step`-th occurrence counted from `anchor` (step 0 is the anchor).
    ///
    /// Month-based periods are measured from the anchor rather than chained,
    /// so a bill anchored on the 31st comes back to the 31st whenever the
    /// month has one.
    pub fn occurrence(&self, anchor: NaiveDate, step: u32) -> Option<NaiveDate> {
        match self {
            BillFrequency::Weekly => anchor.checked_add_days(Days::new(7 * u64::from(step))),
            BillFrequency::Monthly => anchor.checked_add_months(Months::new(step)),
            BillFrequency::Quarterly => anchor.checked_add_months(Months::new(step.checked_mul(3)?)),
            BillFrequency::Yearly => anchor.checked_add_months(Months::new(step.checked_mul(12)?)),
        }
    }

    /// Weekly and monthly bills roll over within roughly a month of being
    /// paid, which is what the "paid this month" section keys off.
    pub fn rolls_within_a_month(&self) -> bool {
        matches!(self, BillFrequency::Weekly | BillFrequency::Monthly)
    }
}

impl fmt::Display for BillFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BillFrequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekly" => Ok(BillFrequency::Weekly),
            "monthly" => Ok(BillFrequency::Monthly),
            "quarterly" => Ok(BillFrequency::Quarterly),
            "yearly" | "annual" | "annually" => Ok(BillFrequency::Yearly),
            other => Err(Error::Validation(format!("Unknown bill frequency '{}'", other))),
        }
    }
}

/// Domain model representing a recurring bill
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecurringBill {
    pub id: String,
    pub name: String,
    pub amount: Decimal,
    #[serde(default)]
    pub category: String,
    pub frequency: BillFrequency,
    /// Next unpaid occurrence. Owned by the bill service: advanced on
    /// mark-paid and rewound on unmark-paid, never computed locally.
    pub next_due_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_paid: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_loan_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_savings_goal_id: Option<String>,
}

fn default_true() -> bool {
    true
}

impl RecurringBill {
    /// Effective loan / savings links of this bill.
    pub fn links(&self) -> BillLinks {
        BillLinks::resolve(self)
    }

    /// Copies reference tags found in the notes into the explicit link
    /// fields. Returns true when a field was filled in.
    pub fn migrate_legacy_links(&mut self) -> bool {
        let links = self.links();
        let mut changed = false;
        if self.linked_loan_id.is_none() && links.loan_id.is_some() {
            self.linked_loan_id = links.loan_id;
            changed = true;
        }
        if self.linked_savings_goal_id.is_none() && links.savings_goal_id.is_some() {
            self.linked_savings_goal_id = links.savings_goal_id;
            changed = true;
        }
        changed
    }

    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::Validation("Bill id is required".to_string()));
        }
        validate_fields(
            &self.name,
            self.amount,
            self.linked_loan_id.as_deref(),
            self.linked_savings_goal_id.as_deref(),
        )
    }
}

/// Input model for creating a new recurring bill
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewRecurringBill {
    pub id: Option<String>,
    pub name: String,
    pub amount: Decimal,
    #[serde(default)]
    pub category: String,
    pub frequency: BillFrequency,
    pub next_due_date: NaiveDate,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_loan_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_savings_goal_id: Option<String>,
}

impl NewRecurringBill {
    /// Fills the explicit link fields from notes tags where they are unset.
    pub fn with_resolved_links(mut self) -> Self {
        let links = BillLinks::from_fields(
            self.linked_loan_id.as_deref(),
            self.linked_savings_goal_id.as_deref(),
            self.notes.as_deref(),
        );
        self.linked_loan_id = links.loan_id;
        self.linked_savings_goal_id = links.savings_goal_id;
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_fields(
            &self.name,
            self.amount,
            self.linked_loan_id.as_deref(),
            self.linked_savings_goal_id.as_deref(),
        )
    }
}

fn validate_fields(
    name: &str,
    amount: Decimal,
    loan_id: Option<&str>,
    savings_goal_id: Option<&str>,
) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::Validation("Bill name is required".to_string()));
    }
    if amount <= Decimal::ZERO {
        return Err(Error::Validation(format!(
            "Bill amount must be positive, got {}",
            amount
        )));
    }
    if loan_id.is_some_and(|id| id.trim().is_empty()) {
        return Err(Error::Validation("Linked loan id must not be blank".to_string()));
    }
    if savings_goal_id.is_some_and(|id| id.trim().is_empty()) {
        return Err(Error::Validation(
            "Linked savings goal id must not be blank".to_string(),
        ));
    }
    Ok(())
}

/// Aggregate counts reported by the bill service.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BillSummary {
    pub active_bills: u32,
    pub inactive_bills: u32,
    pub total_monthly_amount: Decimal,
    pub upcoming_bills: u32,
    pub overdue_bills: u32,
}
