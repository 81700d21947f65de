//! Resolution of named relative date ranges ("last 28 days", "this financial
//! quarter") into concrete, inclusive date-time bounds.

use crate::{
    dates::{
        calendar::{
            financial_quarter_bounds, financial_quarter_index, financial_year_bounds,
            financial_year_start_year, first_of_month, last_of_month, shift_days, shift_months,
            start_of_week,
        },
        range_type::RangeType,
    },
    error::{FilterError, Result},
};
use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use tracing::debug;

pub mod calendar;
pub mod catalog;
pub mod range_type;

/// A resolved range. Both bounds are inclusive: `start` is midnight of the
/// first day and `end` the last microsecond of the last day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RangeSpec {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub day_count: i64,
}

impl RangeSpec {
    fn from_dates(start: NaiveDate, end: NaiveDate, day_count: Option<i64>) -> Self {
        RangeSpec {
            start: start.and_time(NaiveTime::MIN),
            end: end_of_day(end),
            day_count: day_count.unwrap_or_else(|| (end - start).num_days() + 1),
        }
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start.date()
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end.date()
    }
}

fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    // 23:59:59.999999 is always a valid time
    NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999)
        .map(|t| date.and_time(t))
        .unwrap_or_else(|| date.and_time(NaiveTime::MIN))
}

pub fn validate_financial_month(month: u32) -> Result<u32> {
    if (1..=12).contains(&month) {
        Ok(month)
    } else {
        Err(FilterError::InvalidFinancialYearStartMonth(month))
    }
}

/// Resolves a persisted range id. `today` defaults to the local date.
pub fn resolve(
    range_type_id: i64,
    today: Option<NaiveDate>,
    financial_year_start_month: u32,
) -> Result<RangeSpec> {
    let range = RangeType::from_id(range_type_id)?;
    let today = today.unwrap_or_else(|| Local::now().date_naive());
    resolve_range(range, today, financial_year_start_month)
}

pub fn resolve_range(
    range: RangeType,
    today: NaiveDate,
    financial_year_start_month: u32,
) -> Result<RangeSpec> {
    let fy_month = validate_financial_month(financial_year_start_month)?;
    let (start, end, day_count) = bounds(range, today, fy_month).ok_or_else(|| {
        FilterError::DateOutOfRange(format!("{range} relative to {today}"))
    })?;

    let spec = RangeSpec::from_dates(start, end, day_count);
    debug!(
        "Resolved '{}' for {} (financial month {}): {} .. {} ({} days)",
        range, today, fy_month, spec.start, spec.end, spec.day_count
    );
    Ok(spec)
}

type Bounds = (NaiveDate, NaiveDate, Option<i64>);

fn bounds(range: RangeType, today: NaiveDate, fy_month: u32) -> Option<Bounds> {
    use RangeType::*;

    match range {
        Today => day(today, 0),
        Yesterday => day(today, -1),
        Tomorrow => day(today, 1),

        ThisWeek => week(today, 0),
        NextWeek => week(today, 1),
        LastWeek => week(today, -1),
        TwoWeeksTime => week(today, 2),
        ThreeWeeksTime => week(today, 3),
        FourWeeksTime => week(today, 4),
        FiveWeeksTime => week(today, 5),
        SixWeeksTime => week(today, 6),
        TwoWeeksAgo => week(today, -2),
        ThreeWeeksAgo => week(today, -3),
        FourWeeksAgo => week(today, -4),
        FiveWeeksAgo => week(today, -5),
        SixWeeksAgo => week(today, -6),

        ThisMonth => month(today, 0),
        NextMonth => month(today, 1),
        LastMonth => month(today, -1),
        MonthAfterNext => month(today, 2),
        MonthBeforeLast => month(today, -2),
        SameMonthLastYear => month(today, -12),

        Next7Days => next_days(today, 7),
        Next14Days => next_days(today, 14),
        Next28Days => next_days(today, 28),
        Next60Days => next_days(today, 60),
        Next90Days => next_days(today, 90),
        Last7Days => last_days(today, 7),
        Last14Days => last_days(today, 14),
        Last28Days => last_days(today, 28),
        Last60Days => last_days(today, 60),
        Last90Days => last_days(today, 90),

        Next2Months => rolling_months(today, 2),
        Next3Months => rolling_months(today, 3),
        Next6Months => rolling_months(today, 6),
        Next12Months => rolling_months(today, 12),
        Last2Months => rolling_months(today, -2),
        Last3Months => rolling_months(today, -3),
        Last6Months => rolling_months(today, -6),
        Last12Months => rolling_months(today, -12),
        Last18Months => rolling_months(today, -18),

        ThisYear => whole_year(today.year(), 1),
        LastYear => whole_year(today.year() - 1, 1),
        NextYear => whole_year(today.year() + 1, 1),
        YearToDate => Some((NaiveDate::from_ymd_opt(today.year(), 1, 1)?, today, None)),

        LastFinancialYear => whole_year(financial_year_start_year(today, fy_month) - 1, fy_month),
        ThisFinancialYear => whole_year(financial_year_start_year(today, fy_month), fy_month),
        NextFinancialYear => whole_year(financial_year_start_year(today, fy_month) + 1, fy_month),
        FinancialYearToDate => {
            let (start, _) =
                financial_year_bounds(financial_year_start_year(today, fy_month), fy_month)?;
            Some((start, today, None))
        }

        LastFinancialYearQ1 => financial_quarter(today, fy_month, -1, 1),
        LastFinancialYearQ2 => financial_quarter(today, fy_month, -1, 2),
        LastFinancialYearQ3 => financial_quarter(today, fy_month, -1, 3),
        LastFinancialYearQ4 => financial_quarter(today, fy_month, -1, 4),
        ThisFinancialYearQ1 => financial_quarter(today, fy_month, 0, 1),
        ThisFinancialYearQ2 => financial_quarter(today, fy_month, 0, 2),
        ThisFinancialYearQ3 => financial_quarter(today, fy_month, 0, 3),
        ThisFinancialYearQ4 => financial_quarter(today, fy_month, 0, 4),
        NextFinancialYearQ1 => financial_quarter(today, fy_month, 1, 1),
        NextFinancialYearQ2 => financial_quarter(today, fy_month, 1, 2),
        NextFinancialYearQ3 => financial_quarter(today, fy_month, 1, 3),
        NextFinancialYearQ4 => financial_quarter(today, fy_month, 1, 4),

        LastYearQ1 => financial_quarter(today, 1, -1, 1),
        LastYearQ2 => financial_quarter(today, 1, -1, 2),
        LastYearQ3 => financial_quarter(today, 1, -1, 3),
        LastYearQ4 => financial_quarter(today, 1, -1, 4),
        ThisYearQ1 => financial_quarter(today, 1, 0, 1),
        ThisYearQ2 => financial_quarter(today, 1, 0, 2),
        ThisYearQ3 => financial_quarter(today, 1, 0, 3),
        ThisYearQ4 => financial_quarter(today, 1, 0, 4),
        NextYearQ1 => financial_quarter(today, 1, 1, 1),
        NextYearQ2 => financial_quarter(today, 1, 1, 2),
        NextYearQ3 => financial_quarter(today, 1, 1, 3),
        NextYearQ4 => financial_quarter(today, 1, 1, 4),

        LastQuarter => relative_quarter(today, 1, -1),
        ThisQuarter => relative_quarter(today, 1, 0),
        NextQuarter => relative_quarter(today, 1, 1),
        LastFinancialQuarter => relative_quarter(today, fy_month, -1),
        CurrentFinancialQuarter => relative_quarter(today, fy_month, 0),
        NextFinancialQuarter => relative_quarter(today, fy_month, 1),
        SameFinancialQuarterLastYear => relative_quarter(today, fy_month, -4),
    }
}

fn day(today: NaiveDate, offset: i64) -> Option<Bounds> {
    let date = shift_days(today, offset)?;
    Some((date, date, Some(1)))
}

fn week(today: NaiveDate, offset: i64) -> Option<Bounds> {
    let start = shift_days(start_of_week(today), 7 * offset)?;
    Some((start, shift_days(start, 6)?, Some(7)))
}

fn month(today: NaiveDate, offset: i32) -> Option<Bounds> {
    let start = shift_months(first_of_month(today), offset)?;
    Some((start, last_of_month(start), None))
}

fn next_days(today: NaiveDate, days: i64) -> Option<Bounds> {
    Some((today, shift_days(today, days - 1)?, Some(days)))
}

fn last_days(today: NaiveDate, days: i64) -> Option<Bounds> {
    Some((shift_days(today, 1 - days)?, today, Some(days)))
}

fn rolling_months(today: NaiveDate, months: i32) -> Option<Bounds> {
    let other = shift_months(today, months)?;
    if months >= 0 {
        Some((today, other, None))
    } else {
        Some((other, today, None))
    }
}

/// A whole (calendar or financial) year. Its day count is the length of the
/// interval rather than the number of days covered.
fn whole_year(year: i32, start_month: u32) -> Option<Bounds> {
    let (start, end) = financial_year_bounds(year, start_month)?;
    Some((start, end, Some((end - start).num_days())))
}

fn financial_quarter(today: NaiveDate, start_month: u32, year_offset: i32, quarter: u32) -> Option<Bounds> {
    let year = financial_year_start_year(today, start_month) + year_offset;
    let (start, end) = financial_quarter_bounds(year, start_month, quarter)?;
    Some((start, end, None))
}

/// The quarter containing `today`, moved by `offset` quarters. Crossing a
/// year boundary moves into the adjacent year.
fn relative_quarter(today: NaiveDate, start_month: u32, offset: i32) -> Option<Bounds> {
    let year = financial_year_start_year(today, start_month);
    let index = financial_quarter_index(today, start_month);
    let (current_start, _) = financial_quarter_bounds(year, start_month, index + 1)?;
    let start = shift_months(current_start, 3 * offset)?;
    let end = shift_months(start, 3)?.pred_opt()?;
    Some((start, end, None))
}
