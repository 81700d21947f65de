use crate::query::{
    ast::{
        common::{JoinKind, TableRef},
        select::{FromClause, JoinClause, Select},
    },
    renderer::{Render, Renderer},
};

impl Render for Select {
    fn render(&self, r: &mut Renderer) {
        // 1. SELECT clause
        r.sql.push_str("SELECT ");
        for (i, col) in self.columns.iter().enumerate() {
            if i > 0 {
                r.sql.push_str(", ");
            }
            col.render(r);
        }

        // 2. FROM
        if let Some(from) = &self.from {
            r.sql.push(' ');
            from.render(r);
        }

        // 3. JOIN
        for join in &self.joins {
            r.sql.push(' ');
            join.render(r);
        }

        // 4. WHERE
        if let Some(where_clause) = &self.where_clause {
            r.sql.push_str(" WHERE ");
            where_clause.render(r);
        }
    }
}

impl Render for TableRef {
    fn render(&self, r: &mut Renderer) {
        if let Some(schema) = &self.schema {
            r.sql.push_str(&r.dialect.quote_identifier(schema));
            r.sql.push('.');
        }
        r.sql.push_str(&r.dialect.quote_identifier(&self.name));
    }
}

impl Render for FromClause {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str("FROM ");
        self.table.render(r);
        if let Some(alias) = &self.alias {
            r.sql.push_str(" AS ");
            r.sql.push_str(&r.dialect.quote_identifier(alias));
        }
    }
}

impl Render for JoinClause {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str(match self.kind {
            JoinKind::Left => "LEFT JOIN",
        });
        r.sql.push(' ');
        self.table.render(r);
        if let Some(alias) = &self.alias {
            r.sql.push_str(" AS ");
            r.sql.push_str(&r.dialect.quote_identifier(alias));
        }
        r.sql.push_str(" ON ");
        self.on.render(r);
    }
}

#[cfg(test)]
mod tests {
    use model::core::value::Value;

    use crate::query::{
        ast::{
            common::{JoinKind, TableRef},
            expr::{BinaryOperator, Expr},
        },
        builder::select::SelectBuilder,
        dialect::{MySql, Postgres},
        ident, qualified_ident,
        renderer::render_to_sql,
    };

    #[test]
    fn test_render_select_with_where_and_join() {
        let ast = SelectBuilder::new()
            .select(vec![Expr::Wildcard])
            .from(TableRef::new(None, "orders"), None)
            .join(
                JoinKind::Left,
                TableRef::new(None, "customers"),
                Some("customer"),
                Expr::binary(
                    qualified_ident("orders", "customer_id"),
                    BinaryOperator::Eq,
                    qualified_ident("customer", "id"),
                ),
            )
            .filter(Some(qualified_ident("customer", "name").eq(Value::String("Ada".into()))))
            .build();

        let (sql, params) = render_to_sql(&ast, &Postgres);
        assert_eq!(
            sql,
            r#"SELECT * FROM "orders" LEFT JOIN "customers" AS "customer" ON ("orders"."customer_id" = "customer"."id") WHERE ("customer"."name" = $1)"#
        );
        assert_eq!(params, vec![Value::String("Ada".into())]);
    }

    #[test]
    fn test_render_schema_qualified_table_mysql() {
        let ast = SelectBuilder::new()
            .select(vec![ident("id")])
            .from(TableRef::new(Some("reporting"), "orders"), Some("o"))
            .filter(Some(ident("total").compare(BinaryOperator::GtEq, Value::Int(10))))
            .build();

        let (sql, params) = render_to_sql(&ast, &MySql);
        assert_eq!(sql, "SELECT `id` FROM `reporting`.`orders` AS `o` WHERE (`total` >= ?)");
        assert_eq!(params, vec![Value::Int(10)]);
    }
}
