//! Savings goal ledger models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Body of a deposit or withdrawal against a savings goal
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SavingsMovement {
    pub amount: Decimal,
}
