use crate::error::{ExpressionError, Result};
use model::core::value::Value;
use planner::query::ast::expr::BinaryOperator;
use std::cmp::Ordering;

/// Binary operation evaluator with SQL NULL propagation.
pub(crate) struct BinaryOpEvaluator<'a> {
    left: &'a Value,
    right: &'a Value,
    op: BinaryOperator,
}

impl<'a> BinaryOpEvaluator<'a> {
    pub fn new(left: &'a Value, right: &'a Value, op: BinaryOperator) -> Self {
        Self { left, right, op }
    }

    pub fn evaluate(&self) -> Result<Value> {
        if self.op.is_comparison() {
            self.eval_comparison()
        } else {
            self.eval_logical()
        }
    }

    fn eval_comparison(&self) -> Result<Value> {
        if self.left.is_null() || self.right.is_null() {
            return Ok(Value::Null);
        }

        let ordering =
            self.left
                .compare(self.right)
                .ok_or_else(|| ExpressionError::TypeMismatch {
                    expected: format!("a value comparable with {:?}", self.left),
                    actual: format!("{:?}", self.right),
                })?;

        let result = match self.op {
            BinaryOperator::Eq => ordering == Ordering::Equal,
            BinaryOperator::NotEq => ordering != Ordering::Equal,
            BinaryOperator::Lt => ordering == Ordering::Less,
            BinaryOperator::LtEq => ordering != Ordering::Greater,
            BinaryOperator::Gt => ordering == Ordering::Greater,
            BinaryOperator::GtEq => ordering != Ordering::Less,
            BinaryOperator::And | BinaryOperator::Or => unreachable!("logical operator"),
        };
        Ok(Value::Boolean(result))
    }

    fn eval_logical(&self) -> Result<Value> {
        let left = truth(self.left)?;
        let right = truth(self.right)?;

        let result = match self.op {
            BinaryOperator::And => match (left, right) {
                (Some(false), _) | (_, Some(false)) => Some(false),
                (Some(true), Some(true)) => Some(true),
                _ => None,
            },
            BinaryOperator::Or => match (left, right) {
                (Some(true), _) | (_, Some(true)) => Some(true),
                (Some(false), Some(false)) => Some(false),
                _ => None,
            },
            _ => unreachable!("comparison operator"),
        };
        Ok(from_truth(result))
    }
}

/// Reads a boolean in three-valued logic: `None` is UNKNOWN.
pub(crate) fn truth(value: &Value) -> Result<Option<bool>> {
    match value {
        Value::Boolean(b) => Ok(Some(*b)),
        Value::Null => Ok(None),
        other => Err(ExpressionError::TypeMismatch {
            expected: "boolean".to_string(),
            actual: format!("{other:?}"),
        }),
    }
}

pub(crate) fn from_truth(truth: Option<bool>) -> Value {
    truth.map(Value::Boolean).unwrap_or(Value::Null)
}
