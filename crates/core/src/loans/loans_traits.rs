use crate::errors::Result;
use crate::loans::loans_model::{LoanPayment, NewLoanPayment};
use async_trait::async_trait;

/// Trait for the remote loan payment ledger
#[async_trait]
pub trait LoanPaymentServiceTrait: Send + Sync {
    async fn get_by_loan(&self, loan_id: &str) -> Result<Vec<LoanPayment>>;
    async fn create(&self, payment: NewLoanPayment) -> Result<LoanPayment>;
    async fn delete(&self, payment_id: &str) -> Result<()>;
}
