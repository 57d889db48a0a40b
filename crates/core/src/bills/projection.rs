//! Forward projection of bill occurrences.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::bills_model::RecurringBill;
use super::scheduler::{BillSection, BillSections, DueDateScheduler};
use crate::constants::MAX_PROJECTION_STEPS;
use crate::utils::time_utils::{end_of_month, start_of_next_month};

/// Estimates next calendar month's obligations.
#[derive(Debug, Clone, Copy)]
pub struct ProjectionEngine {
    scheduler: DueDateScheduler,
    next_month_start: NaiveDate,
    next_month_end: NaiveDate,
}

impl ProjectionEngine {
    pub fn new(today: NaiveDate) -> Self {
        let next_month_start = start_of_next_month(today);
        Self {
            scheduler: DueDateScheduler::new(today),
            next_month_start,
            next_month_end: end_of_month(next_month_start),
        }
    }

    /// Amount a single bill adds to next month's total.
    ///
    /// Occurrences are walked from the bill's next due date; the walk stops
    /// after [`MAX_PROJECTION_STEPS`] steps, so a weekly bill left unpaid for
    /// more than a year contributes nothing.
    pub fn bill_contribution(&self, bill: &RecurringBill) -> Decimal {
        if !bill.is_active {
            return Decimal::ZERO;
        }
        let Some(anchor) = bill.next_due_date else {
            return Decimal::ZERO;
        };
        if anchor > self.next_month_end {
            return Decimal::ZERO;
        }

        let mut total = Decimal::ZERO;
        for step in 0..MAX_PROJECTION_STEPS {
            let Some(cursor) = bill.frequency.occurrence(anchor, step) else {
                break;
            };
            if cursor > self.next_month_end {
                break;
            }
            if cursor >= self.next_month_start {
                total += bill.amount;
            }
        }
        total
    }

    pub fn next_month_total(&self, bills: &[RecurringBill]) -> Decimal {
        bills.iter().map(|bill| self.bill_contribution(bill)).sum()
    }

    /// Overdue plus due-this-month amounts, using the same classification
    /// as the displayed sections.
    pub fn current_month_unpaid_amount(&self, bills: &[RecurringBill]) -> Decimal {
        bills
            .iter()
            .filter(|bill| bill.is_active)
            .filter(|bill| {
                matches!(
                    self.scheduler.classify(bill),
                    BillSection::Overdue | BillSection::DueThisMonth
                )
            })
            .map(|bill| bill.amount)
            .sum()
    }
}

pub fn project_next_month_total(bills: &[RecurringBill], today: NaiveDate) -> Decimal {
    ProjectionEngine::new(today).next_month_total(bills)
}

pub fn current_month_unpaid_amount(bills: &[RecurringBill], today: NaiveDate) -> Decimal {
    ProjectionEngine::new(today).current_month_unpaid_amount(bills)
}

/// Everything the bill screen needs to render a list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillsOverview {
    pub today: NaiveDate,
    pub sections: BillSections,
    pub next_month_total: Decimal,
    pub current_month_unpaid: Decimal,
}

impl BillsOverview {
    pub fn build(bills: &[RecurringBill], today: NaiveDate) -> Self {
        let engine = ProjectionEngine::new(today);
        Self {
            today,
            sections: engine.scheduler.classify_all(bills),
            next_month_total: engine.next_month_total(bills),
            current_month_unpaid: engine.current_month_unpaid_amount(bills),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bills::BillFrequency;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn bill(
        id: &str,
        amount: Decimal,
        frequency: BillFrequency,
        due: Option<NaiveDate>,
    ) -> RecurringBill {
        RecurringBill {
            id: id.to_string(),
            name: id.to_string(),
            amount,
            category: String::new(),
            frequency,
            next_due_date: due,
            is_paid: false,
            is_active: true,
            notes: None,
            linked_loan_id: None,
            linked_savings_goal_id: None,
        }
    }

    #[test]
    fn weekly_bill_due_on_month_end_counts_next_month_weeks() {
        // Today in January; due Jan 31, next month is February 2024.
        // Feb occurrences: 7, 14, 21, 28.
        let engine = ProjectionEngine::new(date(2024, 1, 10));
        let weekly = bill("w", dec!(20), BillFrequency::Weekly, Some(date(2024, 1, 31)));
        assert_eq!(engine.bill_contribution(&weekly), dec!(80));

        // Anchored Feb 29: March occurrences are 7, 14, 21 and 28.
        let feb = ProjectionEngine::new(date(2024, 2, 3));
        let weekly = bill("w", dec!(20), BillFrequency::Weekly, Some(date(2024, 2, 29)));
        assert_eq!(feb.bill_contribution(&weekly), dec!(80));
    }

    #[test]
    fn monthly_quarterly_and_yearly_contributions() {
        let engine = ProjectionEngine::new(date(2024, 1, 10));
        let monthly = bill("m", dec!(50), BillFrequency::Monthly, Some(date(2024, 1, 20)));
        let quarterly = bill("q", dec!(300), BillFrequency::Quarterly, Some(date(2023, 11, 5)));
        let yearly = bill("y", dec!(99), BillFrequency::Yearly, Some(date(2024, 1, 2)));
        let late = bill("l", dec!(10), BillFrequency::Monthly, Some(date(2024, 3, 1)));

        assert_eq!(engine.bill_contribution(&monthly), dec!(50));
        assert_eq!(engine.bill_contribution(&quarterly), dec!(300));
        assert_eq!(engine.bill_contribution(&yearly), Decimal::ZERO);
        assert_eq!(engine.bill_contribution(&late), Decimal::ZERO);
        assert_eq!(
            engine.next_month_total(&[monthly, quarterly, yearly, late]),
            dec!(350)
        );
    }

    #[test]
    fn month_end_anchor_does_not_drift() {
        // Anchored Jan 31: Feb 29, Mar 31. Projecting from February hits Mar 31.
        let engine = ProjectionEngine::new(date(2024, 2, 10));
        let monthly = bill("m", dec!(12), BillFrequency::Monthly, Some(date(2024, 1, 31)));
        assert_eq!(engine.bill_contribution(&monthly), dec!(12));
    }

    #[test]
    fn walk_is_bounded_for_long_overdue_weekly_bills() {
        let engine = ProjectionEngine::new(date(2024, 1, 10));
        let stale = bill("s", dec!(5), BillFrequency::Weekly, Some(date(2021, 1, 1)));
        assert_eq!(engine.bill_contribution(&stale), Decimal::ZERO);
    }

    #[test]
    fn inactive_and_undated_bills_contribute_nothing() {
        let engine = ProjectionEngine::new(date(2024, 1, 10));
        let mut inactive = bill("i", dec!(50), BillFrequency::Monthly, Some(date(2024, 2, 1)));
        inactive.is_active = false;
        let undated = bill("u", dec!(50), BillFrequency::Monthly, None);
        assert_eq!(engine.next_month_total(&[inactive, undated]), Decimal::ZERO);
    }

    #[test]
    fn current_month_unpaid_sums_overdue_and_due_this_month() {
        let today = date(2024, 1, 10);
        let bills = vec![
            bill("overdue", dec!(10), BillFrequency::Monthly, Some(date(2023, 12, 28))),
            bill("due", dec!(25.50), BillFrequency::Monthly, Some(date(2024, 1, 25))),
            bill("paid", dec!(40), BillFrequency::Monthly, Some(date(2024, 2, 10))),
            bill("future", dec!(100), BillFrequency::Yearly, Some(date(2024, 8, 1))),
        ];
        assert_eq!(current_month_unpaid_amount(&bills, today), dec!(35.50));

        let overview = BillsOverview::build(&bills, today);
        assert_eq!(overview.current_month_unpaid, dec!(35.50));
        assert_eq!(overview.sections.len(), 4);
        // February hits: overdue on the 28th, due on the 25th, paid on the 10th.
        assert_eq!(overview.next_month_total, dec!(75.50));
    }
}
