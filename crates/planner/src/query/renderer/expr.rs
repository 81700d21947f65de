use crate::query::{
    ast::expr::{BinaryOp, BinaryOperator, Expr, Ident},
    renderer::{Render, Renderer},
};

impl Render for Expr {
    fn render(&self, r: &mut Renderer) {
        match self {
            Expr::Identifier(ident) => ident.render(r),
            Expr::Value(val) => r.add_param(val.clone()),
            Expr::BinaryOp(op) => op.render(r),
            Expr::Not(inner) => {
                r.sql.push_str("NOT ");
                // BinaryOp already brings its own parentheses
                if matches!(inner.as_ref(), Expr::BinaryOp(_)) {
                    inner.render(r);
                } else {
                    r.sql.push('(');
                    inner.render(r);
                    r.sql.push(')');
                }
            }
            Expr::IsNull { expr, negated } => {
                expr.render(r);
                r.sql.push_str(if *negated { " IS NOT NULL" } else { " IS NULL" });
            }
            Expr::InList { expr, list } => {
                if list.is_empty() {
                    // `IN ()` is not valid SQL
                    r.sql.push_str("(1 = 0)");
                    return;
                }
                expr.render(r);
                r.sql.push_str(" IN (");
                for (i, item) in list.iter().enumerate() {
                    if i > 0 {
                        r.sql.push_str(", ");
                    }
                    item.render(r);
                }
                r.sql.push(')');
            }
            Expr::Like {
                expr,
                pattern,
                case_insensitive,
            } => {
                if !*case_insensitive {
                    expr.render(r);
                    r.sql.push_str(" LIKE ");
                    pattern.render(r);
                } else if r.dialect.supports_ilike() {
                    expr.render(r);
                    r.sql.push_str(" ILIKE ");
                    pattern.render(r);
                } else {
                    r.sql.push_str("LOWER(");
                    expr.render(r);
                    r.sql.push_str(") LIKE LOWER(");
                    pattern.render(r);
                    r.sql.push(')');
                }
            }
            Expr::Extract { part, expr } => {
                let (prefix, suffix) = r.dialect.date_part(*part);
                r.sql.push_str(prefix);
                expr.render(r);
                r.sql.push_str(suffix);
            }
            Expr::Wildcard => r.sql.push('*'),
        }
    }
}

impl Render for Ident {
    fn render(&self, r: &mut Renderer) {
        if let Some(qualifier) = &self.qualifier {
            r.sql.push_str(&r.dialect.quote_identifier(qualifier));
            r.sql.push('.');
        }
        r.sql.push_str(&r.dialect.quote_identifier(&self.name));
    }
}

impl Render for BinaryOp {
    fn render(&self, r: &mut Renderer) {
        r.sql.push('(');
        self.left.render(r);

        let op_str = match self.op {
            BinaryOperator::Eq => " = ",
            BinaryOperator::NotEq => " <> ",
            BinaryOperator::Lt => " < ",
            BinaryOperator::LtEq => " <= ",
            BinaryOperator::Gt => " > ",
            BinaryOperator::GtEq => " >= ",
            BinaryOperator::And => " AND ",
            BinaryOperator::Or => " OR ",
        };
        r.sql.push_str(op_str);

        self.right.render(r);
        r.sql.push(')');
    }
}
