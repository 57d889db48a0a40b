//! Settlement module - mark/unmark paid protocol and its supporting state.

mod bill_list;
mod in_flight;
mod settlement_model;
mod settlement_records;
mod settlement_service;
mod settlement_traits;


pub use bill_list::{BillList, BillSnapshot, OptimisticUpdate};
pub use in_flight::{InFlightGuard, InFlightSettlements};
pub use settlement_model::{
    CompensationAction, CompensationStep, SettlementKind, SettlementOutcome, SettlementReport,
    StepStatus,
};
pub use settlement_records::{InMemorySettlementRecords, SettlementRecordStore};
pub use settlement_service::SettlementCoordinator;
pub use settlement_traits::SettlementCoordinatorTrait;
