use crate::error::CliError;
use chrono::{NaiveDate, NaiveDateTime};
use filter_engine::{PeriodData, RangeSpec, RangeType};
use model::{core::value::Value, records::row::RowData};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct RangeEntry {
    pub id: i64,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ResolvedRange {
    pub id: i64,
    pub label: &'static str,
    pub today: NaiveDate,
    pub financial_year_start_month: u32,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub day_count: i64,
}

impl ResolvedRange {
    pub fn new(range: RangeType, today: NaiveDate, financial_year_start_month: u32, spec: RangeSpec) -> Self {
        ResolvedRange {
            id: range.id(),
            label: range.label(),
            today,
            financial_year_start_month,
            start: spec.start,
            end: spec.end,
            day_count: spec.day_count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CompileReport {
    pub dialect: String,
    pub sql: String,
    pub params: Vec<Value>,
    pub period: PeriodSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<RowData>>,
}

/// The detected period and the shape it matches, if any.
#[derive(Debug, Serialize)]
pub struct PeriodSummary {
    pub min_date: Option<NaiveDate>,
    pub max_date: Option<NaiveDate>,
    pub kind: Option<&'static str>,
}

impl From<&PeriodData> for PeriodSummary {
    fn from(period: &PeriodData) -> Self {
        let kind = if period.day_period().is_some() {
            Some("day")
        } else if period.week_period().is_some() {
            Some("week")
        } else if period.month_period().is_some() {
            Some("month")
        } else if period.quarter_period().is_some() {
            Some("quarter")
        } else if period.year_period().is_some() {
            Some("year")
        } else {
            None
        };
        let range = period.date_range();
        PeriodSummary {
            min_date: range.map(|(min, _)| min),
            max_date: range.map(|(_, max)| max),
            kind,
        }
    }
}

pub fn print_ranges_table(entries: &[RangeEntry]) {
    println!("{:>4}  {}", "Id", "Range");
    println!("-----------------------------");
    for entry in entries {
        println!("{:>4}  {}", entry.id, entry.label);
    }
}

fn to_json<T: Serialize>(report: &T) -> Result<String, CliError> {
    serde_json::to_string_pretty(report).map_err(CliError::JsonSerialize)
}

pub async fn write_report<T: Serialize>(report: &T, path: &str) -> Result<(), CliError> {
    let json = to_json(report)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}

pub fn print_report<T: Serialize>(report: &T) -> Result<(), CliError> {
    println!("{}", to_json(report)?);
    Ok(())
}
