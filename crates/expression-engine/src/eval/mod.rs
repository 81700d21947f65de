use crate::error::Result;
use model::{core::value::Value, records::row::RowData};
use planner::query::ast::expr::Expr;
use tracing::debug;

pub mod binary;
pub mod runtime;

/// Trait for evaluating expressions against a single row.
pub trait Evaluator {
    /// Evaluates to a value. Boolean predicates follow SQL three-valued
    /// logic, so `Value::Null` stands for UNKNOWN.
    fn evaluate(&self, row: &RowData) -> Result<Value>;

    /// A row matches only when the predicate is TRUE; FALSE and UNKNOWN both reject it.
    fn matches(&self, row: &RowData) -> Result<bool> {
        Ok(matches!(self.evaluate(row)?, Value::Boolean(true)))
    }
}

/// Applies an optional predicate to a set of rows, the way a `WHERE` clause
/// would. `None` keeps every row.
pub fn filter_rows<'a>(predicate: Option<&Expr>, rows: &'a [RowData]) -> Result<Vec<&'a RowData>> {
    let Some(predicate) = predicate else {
        return Ok(rows.iter().collect());
    };

    let mut kept = Vec::new();
    for row in rows {
        if predicate.matches(row)? {
            kept.push(row);
        }
    }
    debug!("Predicate kept {} of {} rows", kept.len(), rows.len());
    Ok(kept)
}
