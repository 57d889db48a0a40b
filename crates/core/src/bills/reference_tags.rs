//! Reference tags linking a bill to a loan or a savings goal.
//!
//! Legacy bills carry their links as `[LOAN_REF:<id>]` / `[SAVINGS_REF:<id>]`
//! tags inside the free-text notes. Decoding is total: anything that does
//! not match yields `None`.

use regex::Regex;
use std::sync::LazyLock;

use super::bills_model::RecurringBill;

static LOAN_REF_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[LOAN_REF:([^\]\s]+)\]").expect("Invalid regex pattern"));

static SAVINGS_REF_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[SAVINGS_REF:([^\]\s]+)\]").expect("Invalid regex pattern"));

static ANY_REF_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(?:LOAN_REF|SAVINGS_REF):[^\]]*\]").expect("Invalid regex pattern")
});

/// First loan id tagged in `notes`.
pub fn extract_loan_ref(notes: &str) -> Option<String> {
    first_capture(&LOAN_REF_REGEX, notes)
}

/// First savings goal id tagged in `notes`.
pub fn extract_savings_ref(notes: &str) -> Option<String> {
    first_capture(&SAVINGS_REF_REGEX, notes)
}

/// Notes with every reference tag removed, for display.
pub fn strip_reference_tags(notes: &str) -> String {
    ANY_REF_REGEX
        .replace_all(notes, " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn first_capture(regex: &Regex, notes: &str) -> Option<String> {
    regex
        .captures(notes)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Effective relations of a bill.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BillLinks {
    pub loan_id: Option<String>,
    pub savings_goal_id: Option<String>,
}

impl BillLinks {
    /// Explicit link fields win; notes tags are the fallback for bills
    /// created before the fields existed.
    pub fn resolve(bill: &RecurringBill) -> Self {
        Self::from_fields(
            bill.linked_loan_id.as_deref(),
            bill.linked_savings_goal_id.as_deref(),
            bill.notes.as_deref(),
        )
    }

    pub fn from_fields(
        linked_loan_id: Option<&str>,
        linked_savings_goal_id: Option<&str>,
        notes: Option<&str>,
    ) -> Self {
        let notes = notes.unwrap_or_default();
        Self {
            loan_id: non_blank(linked_loan_id).or_else(|| extract_loan_ref(notes)),
            savings_goal_id: non_blank(linked_savings_goal_id)
                .or_else(|| extract_savings_ref(notes)),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
