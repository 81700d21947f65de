#![allow(dead_code)]

use crate::{fixture_context, orders_catalog, orders_rows};
use expression_engine::filter_rows;
use filter_engine::{CompileContext, CompiledFilter, FilterCompiler, FilterGroup};
use model::core::value::Value;
use planner::query::{ast::expr::Expr, dialect::DialectKind, renderer::render_to_sql};

/// Field catalog for the `orders` table, in the JSON form the CLI reads.
pub const ORDERS_SCHEMA: &str = r#"{
    "table": "orders",
    "fields": {
        "id": { "kind": "number" },
        "status": { "kind": "string" },
        "note": { "kind": "string", "nullable": true },
        "total": { "kind": "number" },
        "placed": { "kind": "date", "nullable": true },
        "updated": { "kind": "date_time", "column": "updated_at" },
        "owner_id": { "kind": "user" }
    },
    "relations": {
        "customer": {
            "local_column": "customer_id",
            "table": "customers",
            "fields": {
                "name": { "kind": "string" },
                "region": { "kind": "string", "nullable": true }
            }
        }
    }
}"#;

/// Rows as the joined query returns them. Order 5 has no customer.
pub const ORDERS_ROWS: &str = r#"[
    { "id": 1, "status": "open", "note": "rush", "total": 250, "placed": "2024-03-15",
      "updated_at": "2024-03-15 09:30:00", "owner_id": 7,
      "customer.name": "Acme", "customer.region": "North" },
    { "id": 2, "status": "open", "note": null, "total": 80, "placed": "2024-03-11",
      "updated_at": "2024-03-11 17:00:00", "owner_id": 8,
      "customer.name": "Birch", "customer.region": "South" },
    { "id": 3, "status": "closed", "note": "gift", "total": 40, "placed": "2024-02-20",
      "updated_at": "2024-02-21 08:00:00", "owner_id": 7,
      "customer.name": "Acme", "customer.region": "North" },
    { "id": 4, "status": "closed", "note": "", "total": 500, "placed": "2023-12-05",
      "updated_at": "2023-12-06 11:15:00", "owner_id": 9,
      "customer.name": "Cedar", "customer.region": null },
    { "id": 5, "status": "cancelled", "note": "", "total": 15, "placed": null,
      "updated_at": "2024-01-02 10:00:00", "owner_id": 7,
      "customer.name": null, "customer.region": null },
    { "id": 6, "status": "open", "note": null, "total": 120, "placed": "2024-04-10",
      "updated_at": "2024-04-10 12:00:00", "owner_id": 8,
      "customer.name": "Birch", "customer.region": "South" }
]"#;

pub fn parse_tree(json: &str) -> Option<FilterGroup> {
    FilterGroup::parse(json).expect("valid filter tree")
}

/// Compiles `json` against the orders catalog with the fixture context.
pub fn compile_fixture(json: &str) -> CompiledFilter {
    compile_with(json, &fixture_context(), None, None)
}

pub fn compile_with(
    json: &str,
    ctx: &CompileContext,
    extra_predicate: Option<Expr>,
    prefix: Option<&str>,
) -> CompiledFilter {
    let catalog = orders_catalog();
    let tree = parse_tree(json);
    filter_engine::compile(tree.as_ref(), &catalog, ctx, extra_predicate, prefix).expect("filter compiles")
}

pub fn compile_both(json: &str, extra: &str) -> CompiledFilter {
    let catalog = orders_catalog();
    let ctx = fixture_context();
    let tree = parse_tree(json);
    let extra = parse_tree(extra).expect("non-empty extra tree");
    FilterCompiler::new(&catalog, &ctx)
        .with_extra_tree(&extra)
        .compile(tree.as_ref())
        .expect("filter compiles")
}

/// Ids of the fixture rows the compiled predicate keeps.
pub fn matching_ids(compiled: &CompiledFilter) -> Vec<i64> {
    let rows = orders_rows();
    filter_rows(compiled.predicate.expr(), &rows)
        .expect("predicate evaluates")
        .into_iter()
        .filter_map(|row| row.get_value("id").as_i64())
        .collect()
}

/// The full `SELECT` for the compiled filter.
pub fn select_sql(compiled: &CompiledFilter, dialect: DialectKind) -> (String, Vec<Value>) {
    let select = orders_catalog().select(compiled.predicate.expr().cloned());
    render_to_sql(&select, dialect.dialect())
}
