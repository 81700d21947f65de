//! Calendar arithmetic shared by the range resolver, the filter compiler and
//! period detection.

use chrono::{Datelike, Days, Months, NaiveDate};

/// Monday of the week containing `date`.
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.weekday().num_days_from_monday()))
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn last_of_month(date: NaiveDate) -> NaiveDate {
    let first = first_of_month(date);
    first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}

/// Adds (or subtracts) whole months, clamping the day to the length of the
/// target month: Jan 31 + 1 month is Feb 28/29.
pub fn shift_months(date: NaiveDate, months: i32) -> Option<NaiveDate> {
    if months >= 0 {
        date.checked_add_months(Months::new(months.unsigned_abs()))
    } else {
        date.checked_sub_months(Months::new(months.unsigned_abs()))
    }
}

pub fn shift_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    if days >= 0 {
        date.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
    }
}

/// Calendar year the financial year containing `today` started in.
pub fn financial_year_start_year(today: NaiveDate, start_month: u32) -> i32 {
    if today.month() >= start_month {
        today.year()
    } else {
        today.year() - 1
    }
}

/// Inclusive bounds of the financial year starting in `year`.
pub fn financial_year_bounds(year: i32, start_month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, start_month, 1)?;
    let end = start.checked_add_months(Months::new(12))?.pred_opt()?;
    Some((start, end))
}

/// Inclusive bounds of quarter `quarter` (1..=4) of the financial year
/// starting in `year`. Calendar quarters are financial quarters with the
/// year starting in January.
pub fn financial_quarter_bounds(
    year: i32,
    start_month: u32,
    quarter: u32,
) -> Option<(NaiveDate, NaiveDate)> {
    if !(1..=4).contains(&quarter) {
        return None;
    }
    let (fy_start, _) = financial_year_bounds(year, start_month)?;
    let start = fy_start.checked_add_months(Months::new(3 * (quarter - 1)))?;
    let end = start.checked_add_months(Months::new(3))?.pred_opt()?;
    Some((start, end))
}

/// Zero-based index of the financial quarter that `date` falls in.
pub fn financial_quarter_index(date: NaiveDate, start_month: u32) -> u32 {
    let offset = (date.month() as i32 - start_month as i32).rem_euclid(12) as u32;
    offset / 3
}

/// The three calendar months (1..=12) that make up financial quarter
/// `quarter` (1..=4).
pub fn financial_quarter_months(start_month: u32, quarter: u32) -> [u32; 3] {
    let first = (start_month - 1) + 3 * (quarter - 1);
    [0, 1, 2].map(|i| (first + i) % 12 + 1)
}

/// Number of calendar months from the month of `start` to the month of `end`,
/// both inclusive.
pub fn months_spanned(start: NaiveDate, end: NaiveDate) -> i32 {
    (end.year() - start.year()) * 12 + (end.month() as i32 - start.month() as i32) + 1
}
