//! Due-date classification of recurring bills.

use chrono::NaiveDate;
use serde::Serialize;

use super::bills_model::RecurringBill;
use crate::constants::DUE_LABEL_HORIZON_DAYS;
use crate::utils::time_utils::{add_months, end_of_month, is_same_month};

/// Display section of an active bill. Declaration order is the order in
/// which membership is tested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BillSection {
    Overdue,
    DueThisMonth,
    PaidThisMonth,
    Future,
}

impl BillSection {
    pub const ALL: [BillSection; 4] = [
        BillSection::Overdue,
        BillSection::DueThisMonth,
        BillSection::PaidThisMonth,
        BillSection::Future,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            BillSection::Overdue => "Overdue",
            BillSection::DueThisMonth => "Due this month",
            BillSection::PaidThisMonth => "Paid this month",
            BillSection::Future => "Future",
        }
    }
}

/// Short relative label for a due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "days", rename_all = "camelCase")]
pub enum DueLabel {
    Today,
    Tomorrow,
    InDays(i64),
    /// Overdue by this many days.
    Overdue(i64),
}

/// Active bills split into their sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillSections {
    pub overdue: Vec<RecurringBill>,
    pub due_this_month: Vec<RecurringBill>,
    pub paid_this_month: Vec<RecurringBill>,
    pub future: Vec<RecurringBill>,
}

impl BillSections {
    pub fn get(&self, section: BillSection) -> &[RecurringBill] {
        match section {
            BillSection::Overdue => &self.overdue,
            BillSection::DueThisMonth => &self.due_this_month,
            BillSection::PaidThisMonth => &self.paid_this_month,
            BillSection::Future => &self.future,
        }
    }

    fn get_mut(&mut self, section: BillSection) -> &mut Vec<RecurringBill> {
        match section {
            BillSection::Overdue => &mut self.overdue,
            BillSection::DueThisMonth => &mut self.due_this_month,
            BillSection::PaidThisMonth => &mut self.paid_this_month,
            BillSection::Future => &mut self.future,
        }
    }

    pub fn len(&self) -> usize {
        BillSection::ALL.iter().map(|s| self.get(*s).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every classified bill with its section, in section order.
    pub fn iter(&self) -> impl Iterator<Item = (BillSection, &RecurringBill)> + '_ {
        BillSection::ALL
            .into_iter()
            .flat_map(move |section| self.get(section).iter().map(move |bill| (section, bill)))
    }
}

pub fn is_overdue(due: NaiveDate, today: NaiveDate) -> bool {
    due < today
}

/// Whole days from `today` to `due`; negative when overdue.
pub fn days_until(due: NaiveDate, today: NaiveDate) -> i64 {
    (due - today).num_days()
}

/// Label for `due`, or `None` when it is more than a week away.
pub fn due_label(due: NaiveDate, today: NaiveDate) -> Option<DueLabel> {
    match days_until(due, today) {
        days if days < 0 => Some(DueLabel::Overdue(-days)),
        0 => Some(DueLabel::Today),
        1 => Some(DueLabel::Tomorrow),
        days if days <= DUE_LABEL_HORIZON_DAYS => Some(DueLabel::InDays(days)),
        _ => None,
    }
}

/// Classifies bills relative to a fixed "today".
#[derive(Debug, Clone, Copy)]
pub struct DueDateScheduler {
    today: NaiveDate,
    month_end: NaiveDate,
    rollover_end: NaiveDate,
}

impl DueDateScheduler {
    pub fn new(today: NaiveDate) -> Self {
        let month_end = end_of_month(today);
        Self {
            today,
            month_end,
            rollover_end: add_months(month_end, 1),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Section of a single bill. Activity is not checked here.
    pub fn classify(&self, bill: &RecurringBill) -> BillSection {
        let Some(due) = bill.next_due_date else {
            return BillSection::Future;
        };
        if is_overdue(due, self.today) {
            BillSection::Overdue
        } else if is_same_month(due, self.today) {
            BillSection::DueThisMonth
        } else if self.looks_paid_this_month(bill, due) {
            BillSection::PaidThisMonth
        } else {
            BillSection::Future
        }
    }

    // Inferred from the due date having rolled just past this month. Not a
    // payment record: quarterly/yearly bills never land here and a weekly
    // bill due early next month does even when unpaid.
    fn looks_paid_this_month(&self, bill: &RecurringBill, due: NaiveDate) -> bool {
        bill.frequency.rolls_within_a_month() && due > self.month_end && due <= self.rollover_end
    }

    /// Splits the active bills into sections; inactive bills are dropped.
    pub fn classify_all(&self, bills: &[RecurringBill]) -> BillSections {
        let mut sections = BillSections::default();
        for bill in bills.iter().filter(|b| b.is_active) {
            sections.get_mut(self.classify(bill)).push(bill.clone());
        }
        sections
    }
}

pub fn classify_bills(bills: &[RecurringBill], today: NaiveDate) -> BillSections {
    DueDateScheduler::new(today).classify_all(bills)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bills::BillFrequency;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn bill(id: &str, frequency: BillFrequency, due: Option<NaiveDate>) -> RecurringBill {
        RecurringBill {
            id: id.to_string(),
            name: id.to_string(),
            amount: dec!(50),
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
    fn monthly_bill_later_this_month_is_due_this_month() {
        let today = date(2024, 1, 10);
        let due = date(2024, 1, 20);
        let scheduler = DueDateScheduler::new(today);
        assert_eq!(
            scheduler.classify(&bill("a", BillFrequency::Monthly, Some(due))),
            BillSection::DueThisMonth
        );
        assert_eq!(days_until(due, today), 10);
        assert_eq!(due_label(due, today), None);
    }

    #[test]
    fn past_due_date_is_overdue_even_in_current_month() {
        let today = date(2024, 1, 10);
        let due = date(2024, 1, 5);
        let scheduler = DueDateScheduler::new(today);
        assert_eq!(
            scheduler.classify(&bill("a", BillFrequency::Monthly, Some(due))),
            BillSection::Overdue
        );
        assert_eq!(days_until(due, today), -5);
        assert_eq!(due_label(due, today), Some(DueLabel::Overdue(5)));
    }

    #[test]
    fn labels_within_a_week() {
        let today = date(2024, 3, 1);
        assert_eq!(due_label(today, today), Some(DueLabel::Today));
        assert_eq!(due_label(date(2024, 3, 2), today), Some(DueLabel::Tomorrow));
        assert_eq!(due_label(date(2024, 3, 8), today), Some(DueLabel::InDays(7)));
        assert_eq!(due_label(date(2024, 3, 9), today), None);
    }

    #[test]
    fn rolled_weekly_and_monthly_bills_look_paid_this_month() {
        let today = date(2024, 1, 10);
        let scheduler = DueDateScheduler::new(today);
        let next_month = Some(date(2024, 2, 3));

        assert_eq!(
            scheduler.classify(&bill("w", BillFrequency::Weekly, next_month)),
            BillSection::PaidThisMonth
        );
        assert_eq!(
            scheduler.classify(&bill("m", BillFrequency::Monthly, next_month)),
            BillSection::PaidThisMonth
        );
        assert_eq!(
            scheduler.classify(&bill("q", BillFrequency::Quarterly, next_month)),
            BillSection::Future
        );
        assert_eq!(
            scheduler.classify(&bill("y", BillFrequency::Yearly, next_month)),
            BillSection::Future
        );
    }

    #[test]
    fn rollover_window_ends_one_month_after_month_end() {
        // Jan 31 + 1 month clamps to Feb 29 in a leap year.
        let scheduler = DueDateScheduler::new(date(2024, 1, 15));
        assert_eq!(
            scheduler.classify(&bill("a", BillFrequency::Monthly, Some(date(2024, 2, 29)))),
            BillSection::PaidThisMonth
        );
        assert_eq!(
            scheduler.classify(&bill("b", BillFrequency::Monthly, Some(date(2024, 3, 1)))),
            BillSection::Future
        );

        // Apr 30 + 1 month is May 30, so May 31 already falls outside.
        let april = DueDateScheduler::new(date(2024, 4, 2));
        assert_eq!(
            april.classify(&bill("c", BillFrequency::Weekly, Some(date(2024, 5, 30)))),
            BillSection::PaidThisMonth
        );
        assert_eq!(
            april.classify(&bill("d", BillFrequency::Weekly, Some(date(2024, 5, 31)))),
            BillSection::Future
        );
    }

    #[test]
    fn classify_all_skips_inactive_and_keeps_every_active_bill_once() {
        let today = date(2024, 6, 15);
        let mut inactive = bill("inactive", BillFrequency::Monthly, Some(date(2024, 6, 1)));
        inactive.is_active = false;
        let bills = vec![
            bill("overdue", BillFrequency::Monthly, Some(date(2024, 6, 1))),
            bill("due", BillFrequency::Yearly, Some(date(2024, 6, 30))),
            bill("paid", BillFrequency::Weekly, Some(date(2024, 7, 4))),
            bill("future", BillFrequency::Quarterly, Some(date(2024, 9, 1))),
            bill("undated", BillFrequency::Monthly, None),
            inactive,
        ];

        let sections = classify_bills(&bills, today);
        let ids = |s: BillSection| -> Vec<&str> {
            sections.get(s).iter().map(|b| b.id.as_str()).collect()
        };
        assert_eq!(ids(BillSection::Overdue), vec!["overdue"]);
        assert_eq!(ids(BillSection::DueThisMonth), vec!["due"]);
        assert_eq!(ids(BillSection::PaidThisMonth), vec!["paid"]);
        assert_eq!(ids(BillSection::Future), vec!["future", "undated"]);
        assert_eq!(sections.len(), 5);
        assert_eq!(sections.iter().count(), 5);
    }
}
