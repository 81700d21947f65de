use crate::error::FilterError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

macro_rules! range_types {
    ($($variant:ident = $id:literal => $label:literal,)+) => {
        /// Named relative date ranges. The ids are persisted inside stored filters
        /// (`"#variable_date:17"`) and must never be renumbered.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum RangeType {
            $($variant = $id,)+
        }

        impl RangeType {
            /// Every range type, in id order.
            pub const ALL: &'static [RangeType] = &[$(RangeType::$variant,)+];

            pub fn id(self) -> i64 {
                self as i64
            }

            pub fn from_id(id: i64) -> Result<Self, FilterError> {
                match id {
                    $($id => Ok(RangeType::$variant),)+
                    other => Err(FilterError::UnknownRangeType(other)),
                }
            }

            pub fn label(self) -> &'static str {
                match self {
                    $(RangeType::$variant => $label,)+
                }
            }
        }
    };
}

range_types! {
    Today = 1 => "Today",
    Yesterday = 2 => "Yesterday",
    Tomorrow = 3 => "Tomorrow",
    ThisWeek = 4 => "This week",
    NextWeek = 5 => "Next week",
    TwoWeeksTime = 6 => "2 weeks time",
    ThisMonth = 7 => "This month",
    NextMonth = 8 => "Next month",
    LastMonth = 9 => "Last month",
    Next7Days = 10 => "Next 7 days",
    Last7Days = 11 => "Last 7 days",
    Next14Days = 12 => "Next 14 days",
    Last14Days = 13 => "Last 14 days",
    Next28Days = 14 => "Next 28 days",
    Last28Days = 15 => "Last 28 days",
    ThisYear = 16 => "This year",
    LastYear = 17 => "Last year",
    LastWeek = 18 => "Last week",
    Last18Months = 23 => "Last 18 months",
    Next2Months = 24 => "Next 2 months",
    Last2Months = 25 => "Last 2 months",
    Next3Months = 26 => "Next 3 months",
    Last3Months = 27 => "Last 3 months",
    Next6Months = 28 => "Next 6 months",
    Last6Months = 29 => "Last 6 months",
    Next60Days = 30 => "Next 60 days",
    Last60Days = 31 => "Last 60 days",
    Next90Days = 32 => "Next 90 days",
    Last90Days = 33 => "Last 90 days",
    ThreeWeeksTime = 34 => "3 weeks time",
    FourWeeksTime = 35 => "4 weeks time",
    FiveWeeksTime = 36 => "5 weeks time",
    SixWeeksTime = 37 => "6 weeks time",
    TwoWeeksAgo = 38 => "2 weeks ago",
    ThreeWeeksAgo = 39 => "3 weeks ago",
    FourWeeksAgo = 40 => "4 weeks ago",
    FiveWeeksAgo = 41 => "5 weeks ago",
    SixWeeksAgo = 42 => "6 weeks ago",
    NextYear = 43 => "Next year",
    LastFinancialYear = 44 => "Last financial year",
    ThisFinancialYear = 45 => "This financial year",
    NextFinancialYear = 46 => "Next financial year",
    LastFinancialYearQ1 = 47 => "Last financial year Q1",
    LastFinancialYearQ2 = 48 => "Last financial year Q2",
    LastFinancialYearQ3 = 49 => "Last financial year Q3",
    LastFinancialYearQ4 = 50 => "Last financial year Q4",
    ThisFinancialYearQ1 = 51 => "This financial year Q1",
    ThisFinancialYearQ2 = 52 => "This financial year Q2",
    ThisFinancialYearQ3 = 53 => "This financial year Q3",
    ThisFinancialYearQ4 = 54 => "This financial year Q4",
    NextFinancialYearQ1 = 55 => "Next financial year Q1",
    NextFinancialYearQ2 = 56 => "Next financial year Q2",
    NextFinancialYearQ3 = 57 => "Next financial year Q3",
    NextFinancialYearQ4 = 58 => "Next financial year Q4",
    LastYearQ1 = 59 => "Last year Q1",
    LastYearQ2 = 60 => "Last year Q2",
    LastYearQ3 = 61 => "Last year Q3",
    LastYearQ4 = 62 => "Last year Q4",
    ThisYearQ1 = 63 => "This year Q1",
    ThisYearQ2 = 64 => "This year Q2",
    ThisYearQ3 = 65 => "This year Q3",
    ThisYearQ4 = 66 => "This year Q4",
    NextYearQ1 = 67 => "Next year Q1",
    NextYearQ2 = 68 => "Next year Q2",
    NextYearQ3 = 69 => "Next year Q3",
    NextYearQ4 = 70 => "Next year Q4",
    LastQuarter = 71 => "Last quarter",
    ThisQuarter = 72 => "This quarter",
    NextQuarter = 73 => "Next quarter",
    LastFinancialQuarter = 74 => "Last financial quarter",
    CurrentFinancialQuarter = 75 => "Current financial quarter",
    NextFinancialQuarter = 76 => "Next financial quarter",
    SameFinancialQuarterLastYear = 77 => "Same financial quarter last year",
    MonthBeforeLast = 78 => "Month before last",
    MonthAfterNext = 79 => "Month after next",
    SameMonthLastYear = 80 => "Same month last year",
    Next12Months = 81 => "Next 12 months",
    Last12Months = 82 => "Last 12 months",
    YearToDate = 83 => "Year to date",
    FinancialYearToDate = 84 => "Financial year to date",
}

impl RangeType {
    /// The three whole-financial-year ranges. A financial week number filter
    /// anchors on one of these.
    pub fn is_financial_year(self) -> bool {
        matches!(
            self,
            RangeType::LastFinancialYear | RangeType::ThisFinancialYear | RangeType::NextFinancialYear
        )
    }
}

impl TryFrom<i64> for RangeType {
    type Error = FilterError;

    fn try_from(id: i64) -> Result<Self, Self::Error> {
        RangeType::from_id(id)
    }
}

impl fmt::Display for RangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for RangeType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.id())
    }
}

impl<'de> Deserialize<'de> for RangeType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let id = i64::deserialize(deserializer)?;
        RangeType::from_id(id).map_err(serde::de::Error::custom)
    }
}
