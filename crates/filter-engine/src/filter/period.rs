use crate::dates::calendar::{first_of_month, last_of_month, months_spanned};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

/// The smallest and largest dates mentioned by the date-bearing leaves of a
/// compiled filter. Lets the rendering layer label a report "March 2024" or
/// "Q1" instead of showing raw bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PeriodData {
    pub min_date: Option<NaiveDateTime>,
    pub max_date: Option<NaiveDateTime>,
}

impl PeriodData {
    pub fn record(&mut self, date: NaiveDateTime) {
        if self.min_date.is_none_or(|min| date < min) {
            self.min_date = Some(date);
        }
        if self.max_date.is_none_or(|max| date > max) {
            self.max_date = Some(date);
        }
    }

    pub fn record_date(&mut self, date: NaiveDate) {
        self.record(date.and_time(NaiveTime::MIN));
    }

    pub fn is_empty(&self) -> bool {
        self.min_date.is_none()
    }

    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.min_date?.date(), self.max_date?.date()))
    }

    pub fn day_period(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.date_range().filter(|(min, max)| min == max)
    }

    pub fn week_period(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.date_range()
            .filter(|(min, max)| (*max - *min).num_days() == 6)
    }

    pub fn month_period(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.whole_months(1)
    }

    pub fn quarter_period(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.whole_months(3)
    }

    pub fn year_period(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.whole_months(12)
    }

    /// The range when it starts on the 1st, ends on a month's last day and
    /// covers exactly `months` calendar months.
    fn whole_months(&self, months: i32) -> Option<(NaiveDate, NaiveDate)> {
        self.date_range().filter(|(min, max)| {
            *min == first_of_month(*min)
                && *max == last_of_month(*max)
                && months_spanned(*min, *max) == months
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn period(min: NaiveDate, max: NaiveDate) -> PeriodData {
        let mut period = PeriodData::default();
        period.record_date(max);
        period.record_date(min);
        period
    }

    #[test]
    fn test_empty_period_detects_nothing() {
        let period = PeriodData::default();
        assert!(period.is_empty());
        assert_eq!(period.date_range(), None);
        assert_eq!(period.day_period(), None);
    }

    #[test]
    fn test_record_keeps_extremes() {
        let mut p = period(d(2024, 3, 1), d(2024, 3, 31));
        p.record_date(d(2024, 3, 10));
        assert_eq!(p.date_range(), Some((d(2024, 3, 1), d(2024, 3, 31))));
    }

    #[test]
    fn test_period_shapes() {
        assert!(period(d(2024, 3, 5), d(2024, 3, 5)).day_period().is_some());
        assert!(period(d(2024, 3, 11), d(2024, 3, 17)).week_period().is_some());
        assert!(period(d(2024, 2, 1), d(2024, 2, 29)).month_period().is_some());
        assert!(period(d(2024, 2, 1), d(2024, 2, 28)).month_period().is_none());
        assert!(period(d(2023, 11, 1), d(2024, 1, 31)).quarter_period().is_some());
        assert!(period(d(2023, 4, 1), d(2024, 3, 31)).year_period().is_some());
        assert!(period(d(2023, 4, 2), d(2024, 3, 31)).year_period().is_none());
    }
}
