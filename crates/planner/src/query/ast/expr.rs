//! Defines the AST for SQL expressions, including the boolean predicates
//! used in `WHERE` clauses.

use model::core::value::Value;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// A column or table identifier, e.g., `users` or `users.id`.
    Identifier(Ident),

    /// A literal value, such as a string, number, boolean, or NULL.
    Value(Value),

    /// A binary operation, e.g., `column = 'value'` or `a AND b`.
    BinaryOp(Box<BinaryOp>),

    /// Logical negation, `NOT (expr)`.
    Not(Box<Expr>),

    /// `expr IS NULL` or, when negated, `expr IS NOT NULL`.
    IsNull { expr: Box<Expr>, negated: bool },

    /// `expr IN (a, b, c)`.
    InList { expr: Box<Expr>, list: Vec<Expr> },

    /// Pattern match with `%`/`_` wildcards and `\` as the escape character.
    Like {
        expr: Box<Expr>,
        pattern: Box<Expr>,
        case_insensitive: bool,
    },

    /// A date component of a temporal expression, e.g. `EXTRACT(MONTH FROM col)`.
    Extract { part: DatePart, expr: Box<Expr> },

    /// The `*` in `SELECT *`.
    Wildcard,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ident {
    pub qualifier: Option<String>, // e.g., the 'users' in 'users.id'
    pub name: String,              // e.g., the 'id' in 'users.id'
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryOp {
    pub left: Expr,
    pub op: BinaryOperator,
    pub right: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOperator {
    // Comparison
    Eq,    // =
    NotEq, // <>
    Lt,    // <
    LtEq,  // <=
    Gt,    // >
    GtEq,  // >=

    // Logical
    And,
    Or,
}

impl BinaryOperator {
    pub fn is_comparison(&self) -> bool {
        !matches!(self, BinaryOperator::And | BinaryOperator::Or)
    }
}

/// Date components that can be extracted from a date or timestamp column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatePart {
    Year,
    Month,
    /// ISO 8601 week of the year, 1..=53.
    Week,
    /// Day of the week, 1 (Sunday) ..= 7 (Saturday).
    Weekday,
}

impl Ident {
    pub fn new(qualifier: Option<&str>, name: &str) -> Self {
        Ident {
            qualifier: qualifier.map(str::to_string),
            name: name.to_string(),
        }
    }
}

impl Expr {
    pub fn column(ident: Ident) -> Self {
        Expr::Identifier(ident)
    }

    pub fn binary(left: Expr, op: BinaryOperator, right: Expr) -> Self {
        Expr::BinaryOp(Box::new(BinaryOp { left, op, right }))
    }

    pub fn compare(self, op: BinaryOperator, value: Value) -> Self {
        Expr::binary(self, op, Expr::Value(value))
    }

    pub fn eq(self, value: Value) -> Self {
        self.compare(BinaryOperator::Eq, value)
    }

    pub fn and(self, other: Expr) -> Self {
        Expr::binary(self, BinaryOperator::And, other)
    }

    pub fn or(self, other: Expr) -> Self {
        Expr::binary(self, BinaryOperator::Or, other)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Expr::Not(Box::new(self))
    }

    pub fn is_null(self, negated: bool) -> Self {
        Expr::IsNull {
            expr: Box::new(self),
            negated,
        }
    }

    pub fn in_list(self, values: Vec<Value>) -> Self {
        Expr::InList {
            expr: Box::new(self),
            list: values.into_iter().map(Expr::Value).collect(),
        }
    }

    pub fn ilike(self, pattern: String) -> Self {
        Expr::Like {
            expr: Box::new(self),
            pattern: Box::new(Expr::Value(Value::String(pattern))),
            case_insensitive: true,
        }
    }

    pub fn extract(self, part: DatePart) -> Self {
        Expr::Extract {
            part,
            expr: Box::new(self),
        }
    }

    /// `self >= start AND self <= end`.
    pub fn between(self, start: Value, end: Value) -> Self {
        self.clone()
            .compare(BinaryOperator::GtEq, start)
            .and(self.compare(BinaryOperator::LtEq, end))
    }

    /// Folds the expressions with `AND`. `None` when the iterator is empty.
    pub fn conjunction(exprs: impl IntoIterator<Item = Expr>) -> Option<Expr> {
        exprs.into_iter().reduce(Expr::and)
    }

    /// Folds the expressions with `OR`. `None` when the iterator is empty.
    pub fn disjunction(exprs: impl IntoIterator<Item = Expr>) -> Option<Expr> {
        exprs.into_iter().reduce(Expr::or)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::ident;

    #[test]
    fn test_conjunction_folds_left() {
        let a = ident("a").eq(Value::Int(1));
        let b = ident("b").eq(Value::Int(2));
        let c = ident("c").eq(Value::Int(3));
        let folded = Expr::conjunction(vec![a.clone(), b.clone(), c.clone()]).unwrap();
        assert_eq!(folded, a.and(b).and(c));
    }

    #[test]
    fn test_empty_fold_is_none() {
        assert!(Expr::conjunction(Vec::new()).is_none());
        assert!(Expr::disjunction(Vec::new()).is_none());
    }

    #[test]
    fn test_between_is_closed_interval() {
        let expr = ident("d").between(Value::Int(1), Value::Int(5));
        let Expr::BinaryOp(op) = expr else {
            panic!("expected AND");
        };
        assert_eq!(op.op, BinaryOperator::And);
        assert!(matches!(&op.left, Expr::BinaryOp(l) if l.op == BinaryOperator::GtEq));
        assert!(matches!(&op.right, Expr::BinaryOp(r) if r.op == BinaryOperator::LtEq));
    }
}
