//! Settlement configuration.

use rust_decimal::Decimal;
use std::time::Duration;

use crate::constants::{AMOUNT_MATCH_TOLERANCE, AUTO_PAYMENT_MARKER, DEFAULT_SETTLEMENT_TIMEOUT_SECS};
use crate::errors::{Error, Result};

/// Tunables for the settlement protocol.
#[derive(Debug, Clone, PartialEq)]
pub struct SettlementConfig {
    /// Bound applied to every network call made during a settlement.
    pub request_timeout: Duration,
    /// Maximum difference between a bill amount and a loan payment amount
    /// for the payment to be considered the bill's auto-payment.
    pub amount_tolerance: Decimal,
    /// Marker written into (and searched for in) auto-payment notes.
    pub auto_payment_marker: String,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(DEFAULT_SETTLEMENT_TIMEOUT_SECS),
            amount_tolerance: AMOUNT_MATCH_TOLERANCE,
            auto_payment_marker: AUTO_PAYMENT_MARKER.to_string(),
        }
    }
}

impl SettlementConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.request_timeout.is_zero() {
            return Err(Error::Config(
                "settlement timeout must be greater than zero".to_string(),
            ));
        }
        if self.amount_tolerance.is_sign_negative() {
            return Err(Error::Config(format!(
                "amount tolerance must not be negative, got {}",
                self.amount_tolerance
            )));
        }
        if self.auto_payment_marker.trim().is_empty() {
            return Err(Error::Config(
                "auto-payment marker must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
