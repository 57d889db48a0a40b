//! Loans module - payment ledger models and traits.

mod loans_model;
mod loans_traits;

pub use loans_model::{LoanPayment, NewLoanPayment};
pub use loans_traits::LoanPaymentServiceTrait;
