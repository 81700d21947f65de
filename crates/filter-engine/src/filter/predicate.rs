use model::core::value::Value;
use planner::query::{
    ast::expr::Expr,
    dialect::Dialect,
    renderer::render_to_sql,
};
use serde::Serialize;

/// A composable boolean filter. The identity predicate (no expression)
/// filters nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Predicate(Option<Expr>);

impl Predicate {
    pub fn identity() -> Self {
        Predicate(None)
    }

    pub fn new(expr: Expr) -> Self {
        Predicate(Some(expr))
    }

    pub fn is_identity(&self) -> bool {
        self.0.is_none()
    }

    pub fn expr(&self) -> Option<&Expr> {
        self.0.as_ref()
    }

    pub fn into_expr(self) -> Option<Expr> {
        self.0
    }

    /// Identity is neutral on either side.
    pub fn and(self, other: Predicate) -> Predicate {
        match (self.0, other.0) {
            (Some(left), Some(right)) => Predicate::new(left.and(right)),
            (left, right) => Predicate(left.or(right)),
        }
    }

    /// The SQL for a `WHERE` clause and its bind parameters. `None` for identity.
    pub fn to_sql(&self, dialect: &dyn Dialect) -> Option<(String, Vec<Value>)> {
        self.0.as_ref().map(|expr| render_to_sql(expr, dialect))
    }
}

impl From<Expr> for Predicate {
    fn from(expr: Expr) -> Self {
        Predicate::new(expr)
    }
}

impl From<Option<Expr>> for Predicate {
    fn from(expr: Option<Expr>) -> Self {
        Predicate(expr)
    }
}
