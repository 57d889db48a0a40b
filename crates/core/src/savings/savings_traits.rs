use crate::errors::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Trait for the remote savings goal ledger
#[async_trait]
pub trait SavingsGoalServiceTrait: Send + Sync {
    async fn add_deposit(&self, goal_id: &str, amount: Decimal) -> Result<()>;
    async fn withdraw(&self, goal_id: &str, amount: Decimal) -> Result<()>;
}
