use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Substring written into the notes of every loan payment created by a
/// settlement, used to tell them apart from manually entered payments.
pub const AUTO_PAYMENT_MARKER: &str = "Auto-payment";

/// Amount tolerance when matching an auto-payment for reversal
pub const AMOUNT_MATCH_TOLERANCE: Decimal = dec!(0.01);

/// Default bound for a single settlement network call
pub const DEFAULT_SETTLEMENT_TIMEOUT_SECS: u64 = 15;

/// Upper bound of occurrences walked per bill when projecting
pub const MAX_PROJECTION_STEPS: u32 = 52;

/// Due labels are only surfaced up to this many days ahead
pub const DUE_LABEL_HORIZON_DAYS: i64 = 7;
