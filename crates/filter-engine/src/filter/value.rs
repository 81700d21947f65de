//! Decoding of leaf values. Stored filters encode symbolic values as
//! `"#prefix:payload"` strings; they are turned into typed payloads here and
//! nowhere else.

use crate::{
    dates::range_type::RangeType,
    error::{FilterError, Result},
    filter::{field::FieldKind, operator::Operator, tree::LeafKind},
};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use model::core::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuarterRef {
    /// Calendar quarter 1..=4.
    Calendar(u32),
    /// Quarter 1..=4 of the financial year.
    Financial(u32),
}

#[derive(Debug, Clone, PartialEq)]
pub enum LeafValue {
    /// A plain JSON value, converted once the field type is known.
    Literal(serde_json::Value),
    /// `is_null` / `is_not_null` ignore whatever value was sent.
    NullCheck,
    Range(RangeType),
    Year(i32),
    Month(u32),
    Quarter(QuarterRef),
    /// 1 (Sunday) ..= 7 (Saturday).
    Weekday(u32),
    Week(i64),
    /// Whether the leaf asks for the logged in user (`"1"`) or anyone else.
    CurrentUser(bool),
    /// Path of the field to compare against.
    Field(String),
}

impl LeafValue {
    pub fn decode(kind: LeafKind, operator: Operator, leaf: &str, raw: &serde_json::Value) -> Result<Self> {
        if operator.is_null_check() {
            return Ok(LeafValue::NullCheck);
        }

        let value = match kind {
            LeafKind::Plain => LeafValue::Literal(raw.clone()),
            LeafKind::VariableDate => {
                let id = tagged_int(leaf, raw, &["#variable_date"])?.1;
                LeafValue::Range(RangeType::from_id(id)?)
            }
            LeafKind::VariableYear | LeafKind::FinancialVariableYear => {
                let year = tagged_int(leaf, raw, &["#year"])?.1;
                let year = i32::try_from(year)
                    .ok()
                    .filter(|y| NaiveDate::from_ymd_opt(*y, 1, 1).is_some())
                    .ok_or_else(|| FilterError::malformed(leaf, raw, "year out of range"))?;
                LeafValue::Year(year)
            }
            LeafKind::VariableMonth => {
                let month = tagged_int(leaf, raw, &["#month"])?.1;
                LeafValue::Month(bounded(leaf, raw, month, 1, 12)?)
            }
            LeafKind::VariableQuarter => {
                let (prefix, n) = tagged_int(leaf, raw, &["#quarter", "#financial_quarter"])?;
                let n = bounded(leaf, raw, n, 1, 4)?;
                if prefix == "#quarter" {
                    LeafValue::Quarter(QuarterRef::Calendar(n))
                } else {
                    LeafValue::Quarter(QuarterRef::Financial(n))
                }
            }
            LeafKind::VariableDay => LeafValue::Weekday(bounded(leaf, raw, plain_int(leaf, raw)?, 1, 7)?),
            LeafKind::WeekNumber => {
                let week = bounded(leaf, raw, plain_int(leaf, raw)?, 1, 53)?;
                LeafValue::Week(i64::from(week))
            }
            // range checked against the financial year by the compiler
            LeafKind::FinancialWeekNumber => LeafValue::Week(plain_int(leaf, raw)?),
            LeafKind::LoggedInUser => LeafValue::CurrentUser(match raw {
                serde_json::Value::String(s) => s == "1",
                serde_json::Value::Number(n) => n.as_i64() == Some(1),
                serde_json::Value::Bool(b) => *b,
                _ => false,
            }),
            LeafKind::FieldVsField => match raw.as_str().map(str::trim) {
                Some(path) if !path.is_empty() => LeafValue::Field(path.to_string()),
                _ => return Err(FilterError::malformed(leaf, raw, "expected a field path")),
            },
        };
        Ok(value)
    }
}

fn tagged_int<'a>(
    leaf: &str,
    raw: &serde_json::Value,
    prefixes: &[&'a str],
) -> Result<(&'a str, i64)> {
    let text = raw
        .as_str()
        .ok_or_else(|| FilterError::malformed(leaf, raw, "expected a string"))?;
    let (prefix, payload) = text
        .split_once(':')
        .ok_or_else(|| FilterError::malformed(leaf, raw, "missing ':' separator"))?;
    let prefix = prefixes
        .iter()
        .find(|p| **p == prefix.trim())
        .ok_or_else(|| FilterError::malformed(leaf, raw, format!("expected one of {prefixes:?}")))?;
    let number = payload
        .trim()
        .parse::<i64>()
        .map_err(|_| FilterError::malformed(leaf, raw, "payload is not a number"))?;
    Ok((*prefix, number))
}

fn plain_int(leaf: &str, raw: &serde_json::Value) -> Result<i64> {
    match raw {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .ok_or_else(|| FilterError::malformed(leaf, raw, "expected a whole number"))
}

fn bounded(leaf: &str, raw: &serde_json::Value, n: i64, min: i64, max: i64) -> Result<u32> {
    if (min..=max).contains(&n) {
        Ok(n as u32)
    } else {
        Err(FilterError::malformed(leaf, raw, format!("must be between {min} and {max}")))
    }
}

/// Converts a plain leaf value into a `Value` of the field's type.
pub fn literal(leaf: &str, kind: FieldKind, raw: &serde_json::Value) -> Result<Value> {
    use serde_json::Value as Json;

    let malformed = |reason: &str| FilterError::malformed(leaf, raw, reason);
    let value = match (kind, raw) {
        (_, Json::Null) => Value::Null,
        (FieldKind::String, Json::String(s)) => Value::String(s.clone()),
        (FieldKind::String, Json::Number(n)) => Value::String(n.to_string()),
        (FieldKind::String, Json::Bool(b)) => Value::String(b.to_string()),
        (FieldKind::Number, Json::String(s)) => {
            number_from_str(s.trim()).ok_or_else(|| malformed("expected a number"))?
        }
        (FieldKind::ForeignKey | FieldKind::User, Json::String(s)) => Value::key_from_str(s),
        (FieldKind::Number, Json::Bool(_)) => return Err(malformed("expected a number")),
        (FieldKind::Boolean, Json::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Value::Boolean(true),
            "false" | "0" => Value::Boolean(false),
            _ => return Err(malformed("expected a boolean")),
        },
        (FieldKind::Boolean, Json::Number(n)) => Value::Boolean(n.as_i64() != Some(0)),
        (FieldKind::Date, Json::String(s)) => {
            Value::Date(parse_date(s).ok_or_else(|| malformed("expected a YYYY-MM-DD date"))?)
        }
        (FieldKind::DateTime, Json::String(s)) => Value::TimestampNaive(
            parse_datetime(s).ok_or_else(|| malformed("expected a date and time"))?,
        ),
        (FieldKind::Date | FieldKind::DateTime, _) => return Err(malformed("expected a date string")),
        (_, Json::Array(_) | Json::Object(_)) => return Err(malformed("expected a single value")),
        (_, other) => Value::from_json(other),
    };
    Ok(value)
}

/// The values of an `in` / `not_in` leaf: a JSON array or a comma separated string.
pub fn literal_list(leaf: &str, kind: FieldKind, raw: &serde_json::Value) -> Result<Vec<Value>> {
    match raw {
        serde_json::Value::Array(items) => items.iter().map(|item| literal(leaf, kind, item)).collect(),
        serde_json::Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| literal(leaf, kind, &serde_json::Value::String(part.to_string())))
            .collect(),
        other => Ok(vec![literal(leaf, kind, other)?]),
    }
}

fn number_from_str(s: &str) -> Option<Value> {
    if let Ok(i) = s.parse::<i64>() {
        return Some(Value::Int(i));
    }
    s.parse::<f64>().ok().filter(|f| f.is_finite()).map(Value::Float)
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.naive_utc())
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").ok())
        .or_else(|| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").ok())
        .or_else(|| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").ok())
        .or_else(|| parse_date(s).and_then(|d| d.and_hms_opt(0, 0, 0)))
}
