use crate::error::{ExpressionError, Result};
use chrono::{Datelike, NaiveDateTime};
use model::core::value::Value;
use planner::query::ast::expr::DatePart;

/// Extracts a date component, matching what the SQL dialects return.
pub fn extract(part: DatePart, value: &Value) -> Result<Value> {
    if value.is_null() {
        return Ok(Value::Null);
    }

    let dt: NaiveDateTime =
        value
            .as_naive_datetime()
            .ok_or_else(|| ExpressionError::TypeMismatch {
                expected: "date or timestamp".to_string(),
                actual: format!("{value:?}"),
            })?;

    let component = match part {
        DatePart::Year => i64::from(dt.year()),
        DatePart::Month => i64::from(dt.month()),
        DatePart::Week => i64::from(dt.iso_week().week()),
        DatePart::Weekday => i64::from(dt.weekday().number_from_sunday()),
    };
    Ok(Value::Int(component))
}
