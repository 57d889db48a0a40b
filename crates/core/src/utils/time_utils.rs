use chrono::{Datelike, Local, Months, NaiveDate};

/// Source of "today" for scheduling decisions.
///
/// Every date comparison in the engine is made against a start-of-day
/// local date, so the clock only ever hands out a `NaiveDate`.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Clock backed by the caller's local wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to a single date. Useful for tests and replaying a day.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

pub fn start_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Last calendar day of the month containing `date`.
pub fn end_of_month(date: NaiveDate) -> NaiveDate {
    start_of_next_month(date).pred_opt().unwrap_or(date)
}

pub fn start_of_next_month(date: NaiveDate) -> NaiveDate {
    add_months(start_of_month(date), 1)
}

/// Calendar month addition. Days past the end of the target month are
/// clamped to its last day (Jan 31 + 1 month = Feb 28/29).
pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}

pub fn is_same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}
