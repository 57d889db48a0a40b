//! Savings module - goal ledger models and traits.

mod savings_model;
mod savings_traits;

pub use savings_model::SavingsMovement;
pub use savings_traits::SavingsGoalServiceTrait;
