use crate::{
    error::{ExpressionError, Result},
    eval::{
        Evaluator,
        binary::{BinaryOpEvaluator, from_truth, truth},
    },
    functions::{date, pattern},
};
use model::{core::value::Value, records::row::RowData};
use planner::query::ast::expr::{Expr, Ident};

impl Evaluator for Expr {
    fn evaluate(&self, row: &RowData) -> Result<Value> {
        match self {
            Expr::Identifier(ident) => lookup(row, ident),

            Expr::Value(value) => Ok(value.clone()),

            Expr::BinaryOp(op) => {
                let left = op.left.evaluate(row)?;
                let right = op.right.evaluate(row)?;
                BinaryOpEvaluator::new(&left, &right, op.op).evaluate()
            }

            Expr::Not(inner) => {
                let value = inner.evaluate(row)?;
                Ok(from_truth(truth(&value)?.map(|b| !b)))
            }

            Expr::IsNull { expr, negated } => {
                let is_null = expr.evaluate(row)?.is_null();
                Ok(Value::Boolean(is_null != *negated))
            }

            Expr::InList { expr, list } => {
                let needle = expr.evaluate(row)?;
                if needle.is_null() {
                    return Ok(Value::Null);
                }
                let mut saw_null = false;
                for item in list {
                    let candidate = item.evaluate(row)?;
                    if candidate.is_null() {
                        saw_null = true;
                    } else if needle.equal(&candidate) {
                        return Ok(Value::Boolean(true));
                    }
                }
                Ok(if saw_null { Value::Null } else { Value::Boolean(false) })
            }

            Expr::Like {
                expr,
                pattern: pattern_expr,
                case_insensitive,
            } => {
                let input = expr.evaluate(row)?;
                let pattern_value = pattern_expr.evaluate(row)?;
                if input.is_null() || pattern_value.is_null() {
                    return Ok(Value::Null);
                }
                let (Some(input), Some(pattern_str)) = (input.as_string(), pattern_value.as_string())
                else {
                    return Err(ExpressionError::TypeMismatch {
                        expected: "string".to_string(),
                        actual: format!("{input:?}"),
                    });
                };
                Ok(Value::Boolean(pattern::like(
                    &input,
                    &pattern_str,
                    *case_insensitive,
                )))
            }

            Expr::Extract { part, expr } => date::extract(*part, &expr.evaluate(row)?),

            Expr::Wildcard => Err(ExpressionError::UnsupportedOperation(
                "wildcard in a row predicate".to_string(),
            )),
        }
    }
}

fn lookup(row: &RowData, ident: &Ident) -> Result<Value> {
    row.get_qualified(ident.qualifier.as_deref(), &ident.name)
        .map(|field| field.value.clone().unwrap_or(Value::Null))
        .ok_or_else(|| match &ident.qualifier {
            Some(q) => ExpressionError::FieldNotFound(format!("{q}.{}", ident.name)),
            None => ExpressionError::FieldNotFound(ident.name.clone()),
        })
}
