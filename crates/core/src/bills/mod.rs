//! Bills module - domain models, scheduling, projection and service traits.

mod bills_model;
mod bills_traits;
pub mod projection;
pub mod reference_tags;
pub mod scheduler;

pub use bills_model::{BillFrequency, BillSummary, NewRecurringBill, RecurringBill};
pub use bills_traits::BillServiceTrait;
pub use projection::{
    current_month_unpaid_amount, project_next_month_total, BillsOverview, ProjectionEngine,
};
pub use reference_tags::{extract_loan_ref, extract_savings_ref, strip_reference_tags, BillLinks};
pub use scheduler::{
    classify_bills, days_until, due_label, is_overdue, BillSection, BillSections, DueDateScheduler,
    DueLabel,
};
