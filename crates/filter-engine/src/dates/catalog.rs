//! Read-only enumerations used to populate filter value pickers.

use crate::dates::range_type::RangeType;
use chrono::{Datelike, NaiveDate};

/// Picklist order: past ranges first, then the present, then the future.
const PICKLIST_ORDER: &[RangeType] = {
    use RangeType::*;
    &[
        Last18Months,
        Last12Months,
        Last6Months,
        Last3Months,
        Last90Days,
        Last2Months,
        Last60Days,
        MonthBeforeLast,
        LastMonth,
        SameMonthLastYear,
        Last28Days,
        Last14Days,
        Last7Days,
        SixWeeksAgo,
        FiveWeeksAgo,
        FourWeeksAgo,
        ThreeWeeksAgo,
        TwoWeeksAgo,
        LastWeek,
        Yesterday,
        Today,
        Tomorrow,
        ThisWeek,
        Next7Days,
        Next14Days,
        NextWeek,
        TwoWeeksTime,
        ThreeWeeksTime,
        FourWeeksTime,
        FiveWeeksTime,
        SixWeeksTime,
        ThisMonth,
        Next28Days,
        NextMonth,
        MonthAfterNext,
        Next2Months,
        Next60Days,
        Next3Months,
        Next90Days,
        Next6Months,
        Next12Months,
        LastQuarter,
        ThisQuarter,
        NextQuarter,
        LastYear,
        LastYearQ1,
        LastYearQ2,
        LastYearQ3,
        LastYearQ4,
        ThisYear,
        YearToDate,
        ThisYearQ1,
        ThisYearQ2,
        ThisYearQ3,
        ThisYearQ4,
        NextYear,
        NextYearQ1,
        NextYearQ2,
        NextYearQ3,
        NextYearQ4,
        LastFinancialQuarter,
        CurrentFinancialQuarter,
        NextFinancialQuarter,
        SameFinancialQuarterLastYear,
        LastFinancialYear,
        LastFinancialYearQ1,
        LastFinancialYearQ2,
        LastFinancialYearQ3,
        LastFinancialYearQ4,
        ThisFinancialYear,
        FinancialYearToDate,
        ThisFinancialYearQ1,
        ThisFinancialYearQ2,
        ThisFinancialYearQ3,
        ThisFinancialYearQ4,
        NextFinancialYear,
        NextFinancialYearQ1,
        NextFinancialYearQ2,
        NextFinancialYearQ3,
        NextFinancialYearQ4,
    ]
};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

pub fn range_type_choices() -> Vec<(RangeType, &'static str)> {
    PICKLIST_ORDER.iter().map(|r| (*r, r.label())).collect()
}

/// `"#variable_date:<id>"` keys as stored in filter values.
pub fn variable_date_filter_values() -> Vec<(String, &'static str)> {
    PICKLIST_ORDER
        .iter()
        .map(|r| (format!("#variable_date:{}", r.id()), r.label()))
        .collect()
}

/// Ten years back to five years ahead of `today`.
pub fn date_filter_years(today: NaiveDate) -> Vec<(String, String)> {
    let year = today.year();
    (year - 10..=year + 5)
        .map(|y| (format!("#year:{y}"), y.to_string()))
        .collect()
}

pub fn date_filter_months() -> Vec<(String, &'static str)> {
    MONTH_NAMES
        .iter()
        .enumerate()
        .map(|(i, name)| (format!("#month:{}", i + 1), *name))
        .collect()
}

pub fn date_filter_quarters() -> Vec<(String, String)> {
    let calendar = (1..=4).map(|n| (format!("#quarter:{n}"), format!("Q{n}")));
    let financial = (1..=4).map(|n| (format!("#financial_quarter:{n}"), format!("Financial Q{n}")));
    calendar.chain(financial).collect()
}

/// Weekday numbers as the date-part extraction reports them: 1 is Sunday.
pub fn weekday_filter_values() -> Vec<(u32, &'static str)> {
    WEEKDAY_NAMES
        .iter()
        .enumerate()
        .map(|(i, name)| (i as u32 + 1, *name))
        .collect()
}

pub fn week_number_filter_values() -> Vec<u32> {
    (1..=53).collect()
}

pub fn month_name(month: u32) -> Option<&'static str> {
    MONTH_NAMES.get(month.checked_sub(1)? as usize).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_picklist_covers_every_range_once() {
        let listed: HashSet<RangeType> = PICKLIST_ORDER.iter().copied().collect();
        assert_eq!(PICKLIST_ORDER.len(), RangeType::ALL.len());
        assert_eq!(listed.len(), RangeType::ALL.len());
    }

    #[test]
    fn test_variable_date_keys() {
        let values = variable_date_filter_values();
        assert!(values.contains(&("#variable_date:1".to_string(), "Today")));
        assert!(values.contains(&("#variable_date:45".to_string(), "This financial year")));
    }

    #[test]
    fn test_years_span_ten_back_five_ahead() {
        let years = date_filter_years(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(years.len(), 16);
        assert_eq!(years[0], ("#year:2014".to_string(), "2014".to_string()));
        assert_eq!(years[15].0, "#year:2029");
    }

    #[test]
    fn test_months_quarters_and_weekdays() {
        let months = date_filter_months();
        assert_eq!(months[0], ("#month:1".to_string(), "January"));
        assert_eq!(months[11], ("#month:12".to_string(), "December"));

        let quarters = date_filter_quarters();
        assert_eq!(quarters.len(), 8);
        assert_eq!(quarters[1], ("#quarter:2".to_string(), "Q2".to_string()));
        assert_eq!(quarters[4], ("#financial_quarter:1".to_string(), "Financial Q1".to_string()));

        assert_eq!(weekday_filter_values()[0], (1, "Sunday"));
        assert_eq!(week_number_filter_values().last(), Some(&53));
        assert_eq!(month_name(13), None);
        assert_eq!(month_name(0), None);
    }
}
