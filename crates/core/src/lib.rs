//! Recurra Core - recurring bill lifecycle.
//!
//! Classifies bills by due date, projects next month's obligations and
//! settles bills against the bill, loan and savings services. The crate is
//! transport-agnostic: services are traits implemented by `recurra-connect`.

pub mod bills;
pub mod config;
pub mod constants;
pub mod errors;
pub mod loans;
pub mod savings;
pub mod settlement;
pub mod utils;

pub use bills::{BillFrequency, BillsOverview, RecurringBill};
pub use settlement::{SettlementCoordinator, SettlementCoordinatorTrait, SettlementReport};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
