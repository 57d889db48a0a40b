//! Plain-text rendering of the bill screen.

use chrono::NaiveDate;
use std::fmt::Write;

use recurra_core::bills::{due_label, strip_reference_tags, BillSection, DueLabel};
use recurra_core::settlement::{SettlementKind, SettlementOutcome, SettlementReport, StepStatus};
use recurra_core::{BillsOverview, RecurringBill};

pub fn label_text(label: DueLabel) -> String {
    match label {
        DueLabel::Today => "due today".to_string(),
        DueLabel::Tomorrow => "due tomorrow".to_string(),
        DueLabel::InDays(days) => format!("due in {} days", days),
        DueLabel::Overdue(1) => "1 day overdue".to_string(),
        DueLabel::Overdue(days) => format!("{} days overdue", days),
    }
}

fn bill_line(bill: &RecurringBill, today: NaiveDate) -> String {
    let due = match bill.next_due_date {
        Some(due) => {
            let mut text = due.format("%Y-%m-%d").to_string();
            if let Some(label) = due_label(due, today) {
                text.push_str(&format!(" ({})", label_text(label)));
            }
            text
        }
        None => "no due date".to_string(),
    };
    let mut line = format!(
        "  {:<12} {:<24} {:>10}  {:<9} {}",
        bill.id,
        bill.name,
        bill.amount,
        bill.frequency.as_str(),
        due
    );
    if let Some(notes) = bill.notes.as_deref() {
        let notes = strip_reference_tags(notes);
        if !notes.is_empty() {
            line.push_str(&format!("  - {}", notes));
        }
    }
    line
}

pub fn overview(overview: &BillsOverview) -> String {
    let mut out = String::new();
    for section in BillSection::ALL {
        let bills = overview.sections.get(section);
        if bills.is_empty() {
            continue;
        }
        let _ = writeln!(out, "{} ({})", section.title(), bills.len());
        for bill in bills {
            let _ = writeln!(out, "{}", bill_line(bill, overview.today));
        }
        out.push('\n');
    }
    if overview.sections.is_empty() {
        out.push_str("No active bills.\n\n");
    }
    let _ = writeln!(out, "Unpaid this month: {}", overview.current_month_unpaid);
    let _ = writeln!(out, "Projected next month: {}", overview.next_month_total);
    out
}

pub fn report(report: &SettlementReport) -> String {
    let verb = match report.kind {
        SettlementKind::MarkPaid => "marked paid",
        SettlementKind::UnmarkPaid => "marked unpaid",
    };
    let mut out = match report.outcome {
        SettlementOutcome::Applied => format!("Bill {} {}.\n", report.bill_id, verb),
        SettlementOutcome::AlreadySettled => {
            format!("Bill {} was already {}; nothing to do.\n", report.bill_id, verb)
        }
    };
    for step in &report.steps {
        let status = match step.status {
            StepStatus::Success => "ok",
            StepStatus::Skipped => "skipped",
            StepStatus::Failed => "FAILED",
        };
        let _ = write!(out, "  [{}] {}", status, step.action.describe());
        if let Some(detail) = step.detail.as_deref() {
            let _ = write!(out, ": {}", detail);
        }
        out.push('\n');
    }
    if let Some(err) = report.compensation_error() {
        let _ = writeln!(out, "Warning: {}", err.user_message());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use recurra_core::bills::BillFrequency;
    use recurra_core::settlement::{CompensationAction, CompensationStep};
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn bill(id: &str, due: NaiveDate) -> RecurringBill {
        RecurringBill {
            id: id.to_string(),
            name: "Netflix".to_string(),
            amount: dec!(15.99),
            category: String::new(),
            frequency: BillFrequency::Monthly,
            next_due_date: Some(due),
            is_paid: false,
            is_active: true,
            notes: Some("Family [LOAN_REF:loan-123]".to_string()),
            linked_loan_id: None,
            linked_savings_goal_id: None,
        }
    }

    #[test]
    fn overview_lists_sections_with_labels_and_totals() {
        let today = date(2024, 1, 10);
        let bills = vec![bill("late", date(2024, 1, 8)), bill("soon", date(2024, 1, 11))];
        let text = overview(&BillsOverview::build(&bills, today));

        assert!(text.contains("Overdue (1)"));
        assert!(text.contains("2 days overdue"));
        assert!(text.contains("Due this month (1)"));
        assert!(text.contains("due tomorrow"));
        assert!(text.contains("- Family"));
        assert!(!text.contains("LOAN_REF"));
        assert!(text.contains("Unpaid this month: 31.98"));
    }

    #[test]
    fn report_shows_failed_steps_and_warning() {
        let mut settled = SettlementReport::new("netflix", SettlementKind::MarkPaid);
        settled.push(CompensationStep::failed(
            CompensationAction::CreateLoanPayment {
                loan_id: "loan-123".to_string(),
            },
            &recurra_core::Error::NetworkFailure("reset".to_string()),
        ));
        let text = report(&settled);

        assert!(text.starts_with("Bill netflix marked paid."));
        assert!(text.contains("[FAILED] create auto-payment on loan loan-123"));
        assert!(text.contains("Warning: The bill was updated"));
    }
}
