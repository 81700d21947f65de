#![allow(dead_code)]

use chrono::NaiveDate;
use filter_engine::{CompileContext, FieldCatalog};
use model::{core::value::Value, records::row::RowData};

pub mod utils;

/// The date every fixture scenario is evaluated on: a Friday in ISO week 11.
pub const TODAY: (i32, u32, u32) = (2024, 3, 15);

/// Financial years in the fixtures start in April.
pub const FINANCIAL_YEAR_START_MONTH: u32 = 4;

/// Identity of the logged in user owning orders 1, 3 and 5.
pub const CURRENT_USER: i64 = 7;

pub fn today() -> NaiveDate {
    let (y, m, d) = TODAY;
    NaiveDate::from_ymd_opt(y, m, d).expect("valid fixture date")
}

pub fn orders_catalog() -> FieldCatalog {
    serde_json::from_str(utils::ORDERS_SCHEMA).expect("valid orders schema")
}

/// Fixture rows, typed through the catalog the same way the CLI loads them.
pub fn orders_rows() -> Vec<RowData> {
    let catalog = orders_catalog();
    let records: Vec<serde_json::Map<String, serde_json::Value>> =
        serde_json::from_str(utils::ORDERS_ROWS).expect("valid orders rows");
    records
        .iter()
        .map(|record| catalog.row_from_json(record).expect("typed fixture row"))
        .collect()
}

pub fn fixture_context() -> CompileContext {
    CompileContext::new(today(), FINANCIAL_YEAR_START_MONTH)
        .expect("valid financial month")
        .with_current_user(Value::Int(CURRENT_USER))
}
