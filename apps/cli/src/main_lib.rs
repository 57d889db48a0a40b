use std::sync::Arc;

use anyhow::bail;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use recurra_connect::RecurraApiClient;
use recurra_core::config::SettlementConfig;
use recurra_core::errors::Error;
use recurra_core::settlement::{InMemorySettlementRecords, SettlementCoordinator};
use recurra_core::utils::SystemClock;
use recurra_core::{RecurringBill, SettlementCoordinatorTrait};

use crate::commands::{Command, USAGE};
use crate::config::Config;
use crate::render;

pub fn init_tracing() {
    let log_format = std::env::var("RECURRA_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

pub fn build_coordinator(config: &Config) -> anyhow::Result<SettlementCoordinator> {
    let client = Arc::new(RecurraApiClient::with_timeout(
        &config.api_url,
        &config.api_token,
        config.request_timeout,
    )?);
    let coordinator = SettlementCoordinator::new(
        client.clone(),
        client.clone(),
        client,
        // Lives for one run only; unmark-paid falls back to matching.
        Arc::new(InMemorySettlementRecords::new()),
        Arc::new(SystemClock),
        SettlementConfig::default().with_timeout(config.request_timeout),
    )?;
    Ok(coordinator)
}

async fn load_bill(
    coordinator: &SettlementCoordinator,
    bill_id: &str,
) -> anyhow::Result<RecurringBill> {
    coordinator.refresh().await?;
    let bill = coordinator
        .bills()
        .iter()
        .find(|b| b.id == bill_id)
        .cloned()
        .ok_or_else(|| Error::NotFound(format!("Bill {}", bill_id)))?;
    Ok(bill)
}

/// Runs one command and returns the text to print.
pub async fn run(command: Command, coordinator: &SettlementCoordinator) -> anyhow::Result<String> {
    match command {
        Command::Help => Ok(format!("{}\n", USAGE)),
        Command::Overview => {
            let overview = coordinator.refresh().await?;
            tracing::debug!("Rendering {} bills", overview.sections.len());
            Ok(render::overview(&overview))
        }
        Command::MarkPaid { bill_id } => {
            let bill = load_bill(coordinator, &bill_id).await?;
            let report = coordinator.mark_paid(&bill).await?;
            Ok(render::report(&report))
        }
        Command::UnmarkPaid { bill_id, confirmed } => {
            if !confirmed {
                bail!(
                    "Unmarking bill {} deletes its linked auto-payment. Re-run with --yes to confirm.",
                    bill_id
                );
            }
            let bill = load_bill(coordinator, &bill_id).await?;
            let report = coordinator.unmark_paid(&bill).await?;
            Ok(render::report(&report))
        }
    }
}

/// Exit status for retryable failures (EX_TEMPFAIL).
pub const EXIT_RETRYABLE: i32 = 75;

/// Process exit status for a failed command.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<Error>() {
        Some(core_err) if core_err.is_recoverable() => EXIT_RETRYABLE,
        _ => 1,
    }
}

/// Message to show for a failed command.
pub fn failure_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<Error>() {
        Some(Error::NotFound(what)) => format!("{} not found.", what),
        Some(core_err) => core_err.user_message(),
        None => err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn settlement_failures_exit_as_retryable() {
        let timeout = anyhow::Error::new(Error::Timeout {
            operation: "mark bill paid".to_string(),
            after: Duration::from_secs(15),
        });
        assert_eq!(exit_code(&timeout), EXIT_RETRYABLE);

        let busy = anyhow::Error::new(Error::SettlementInProgress("netflix".to_string()));
        assert_eq!(exit_code(&busy), EXIT_RETRYABLE);
        assert_eq!(failure_message(&busy), busy_message());
    }

    #[test]
    fn other_failures_exit_with_one() {
        let missing = anyhow::Error::new(Error::NotFound("Bill gym".to_string()));
        assert_eq!(exit_code(&missing), 1);
        assert_eq!(failure_message(&missing), "Bill gym not found.");

        let usage = anyhow::anyhow!("Unknown command 'pay'");
        assert_eq!(exit_code(&usage), 1);
    }

    fn busy_message() -> String {
        Error::SettlementInProgress(String::new()).user_message()
    }
}
