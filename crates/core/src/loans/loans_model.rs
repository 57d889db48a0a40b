//! Loan payment models consumed by bill settlement.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Domain model representing a payment recorded against a loan
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoanPayment {
    pub id: String,
    pub loan_id: String,
    pub amount: Decimal,
    pub principal_amount: Decimal,
    pub interest_amount: Decimal,
    pub payment_date: NaiveDate,
    pub notes: Option<String>,
}

impl LoanPayment {
    pub fn has_marker(&self, marker: &str) -> bool {
        self.notes
            .as_deref()
            .is_some_and(|notes| notes.contains(marker))
    }

    /// Whether this payment looks like the auto-payment a settlement made
    /// for a bill of `amount` on `date`.
    pub fn matches_auto_payment(
        &self,
        date: NaiveDate,
        amount: Decimal,
        tolerance: Decimal,
        marker: &str,
    ) -> bool {
        self.payment_date == date
            && (self.amount - amount).abs() <= tolerance
            && self.has_marker(marker)
    }
}

/// Input model for recording a new loan payment
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewLoanPayment {
    pub loan_id: String,
    pub amount: Decimal,
    pub principal_amount: Decimal,
    pub interest_amount: Decimal,
    pub payment_date: NaiveDate,
    pub notes: Option<String>,
}

impl NewLoanPayment {
    /// Payment of `amount` applied fully to principal, tagged with `marker`.
    pub fn auto_payment(
        loan_id: &str,
        amount: Decimal,
        payment_date: NaiveDate,
        bill_name: &str,
        marker: &str,
    ) -> Self {
        Self {
            loan_id: loan_id.to_string(),
            amount,
            principal_amount: amount,
            interest_amount: Decimal::ZERO,
            payment_date,
            notes: Some(format!("{} for bill: {}", marker, bill_name)),
        }
    }
}
