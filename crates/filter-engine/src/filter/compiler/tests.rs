use super::*;
use crate::{
    error::{FieldResolutionError, FilterError},
    filter::field::{FieldCatalog, FieldKind},
};
use expression_engine::filter_rows;
use model::{
    core::value::{FieldValue, Value},
    records::row::RowData,
};
use planner::query::{
    ast::expr::BinaryOperator,
    dialect::{MySql, Postgres},
    qualified_ident,
};
use serde_json::json;
use tracing_test::traced_test;

fn today() -> NaiveDate {
    // a Friday, ISO week 11
    NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
}

fn ctx() -> CompileContext {
    CompileContext::new(today(), 4).unwrap().with_current_user(Value::Int(7))
}

fn catalog() -> FieldCatalog {
    let customer = FieldCatalog::new("customers")
        .field("name", FieldKind::String, false)
        .field("region", FieldKind::String, true);
    FieldCatalog::new("orders")
        .field("status", FieldKind::String, false)
        .field("note", FieldKind::String, true)
        .field("total", FieldKind::Number, false)
        .field("placed", FieldKind::Date, true)
        .field("shipped", FieldKind::Date, true)
        .field("owner_id", FieldKind::User, false)
        .field("paid", FieldKind::Boolean, false)
        .relation("customer", "customer_id", customer)
}

fn date(y: i32, m: u32, d: u32) -> Value {
    Value::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn order(id: i64, status: &str, note: Value, total: i64, placed: Value, shipped: Value, owner: i64, customer: Value) -> RowData {
    RowData::new(
        "orders",
        vec![
            FieldValue::new("id", Value::Int(id)),
            FieldValue::new("status", Value::String(status.to_string())),
            FieldValue::new("note", note),
            FieldValue::new("total", Value::Int(total)),
            FieldValue::new("placed", placed),
            FieldValue::new("shipped", shipped),
            FieldValue::new("owner_id", Value::Int(owner)),
            FieldValue::new("paid", Value::Boolean(id % 2 == 0)),
            FieldValue::new("customer.name", customer),
        ],
    )
}

fn rows() -> Vec<RowData> {
    let text = |s: &str| Value::String(s.to_string());
    vec![
        order(1, "open", text("rush"), 120, date(2024, 3, 15), date(2024, 3, 20), 7, text("Acme")),
        order(2, "closed", Value::Null, 40, date(2024, 5, 2), date(2024, 5, 1), 8, text("Birch")),
        order(3, "open", text("gift"), 15, Value::Null, Value::Null, 7, Value::Null),
        order(4, "cancelled", text(""), 300, date(2023, 11, 20), date(2023, 11, 20), 9, text("Acme")),
    ]
}

fn tree(json: serde_json::Value) -> FilterGroup {
    FilterGroup::from_json(json).unwrap().unwrap()
}

fn and(rules: serde_json::Value) -> FilterGroup {
    tree(json!({ "condition": "AND", "rules": rules }))
}

fn leaf(id: &str, field: &str, operator: &str, value: serde_json::Value) -> serde_json::Value {
    json!({ "id": id, "field": field, "type": "string", "operator": operator, "value": value })
}

fn compile_tree(group: &FilterGroup) -> Result<CompiledFilter> {
    let catalog = catalog();
    let ctx = ctx();
    FilterCompiler::new(&catalog, &ctx).compile(Some(group))
}

fn matching_ids(compiled: &CompiledFilter) -> Vec<i64> {
    let rows = rows();
    filter_rows(compiled.predicate.expr(), &rows)
        .unwrap()
        .into_iter()
        .filter_map(|row| row.get_value("id").as_i64())
        .collect()
}

fn ids_for(group: &FilterGroup) -> Vec<i64> {
    matching_ids(&compile_tree(group).unwrap())
}

#[test]
fn test_empty_trees_compile_to_identity() {
    let catalog = catalog();
    let ctx = ctx();
    let compiler = FilterCompiler::new(&catalog, &ctx);

    assert!(compiler.compile(None).unwrap().predicate.is_identity());
    assert!(compiler.compile(Some(&and(json!([])))).unwrap().predicate.is_identity());

    let nested = tree(json!({
        "condition": "OR",
        "rules": [
            { "condition": "AND", "rules": [] },
            { "condition": "OR", "rules": [{ "condition": "AND", "rules": [] }] }
        ]
    }));
    let compiled = compiler.compile(Some(&nested)).unwrap();
    assert!(compiled.predicate.is_identity());
    assert!(compiled.period.is_empty());
}

#[test]
fn test_empty_nested_group_is_skipped() {
    let group = tree(json!({
        "condition": "OR",
        "rules": [
            { "condition": "AND", "rules": [] },
            leaf("status", "status", "equal", json!("closed"))
        ]
    }));
    assert_eq!(ids_for(&group), vec![2]);
}

#[traced_test]
#[test]
fn test_nested_groups_follow_their_combinators() {
    let group = tree(json!({
        "condition": "OR",
        "rules": [
            { "condition": "AND", "rules": [
                leaf("status", "status", "equal", json!("open")),
                leaf("total", "total", "greater", json!(100))
            ]},
            leaf("status", "status", "equal", json!("cancelled"))
        ]
    }));
    assert_eq!(ids_for(&group), vec![1, 4]);
    assert!(logs_contain("Compiling OR group with 2 children"));
}

#[test]
fn test_negation_partitions_rows_with_nulls() {
    let positive = ids_for(&and(json!([leaf("note", "note", "equal", json!("rush"))])));
    let negative = ids_for(&and(json!([leaf("note", "note", "not_equal", json!("rush"))])));
    assert_eq!(positive, vec![1]);
    // order 2 has no note and still lands on the negated side
    assert_eq!(negative, vec![2, 3, 4]);

    let not_contains = ids_for(&and(json!([leaf("note", "note", "not_contains", json!("i"))])));
    assert_eq!(not_contains, vec![1, 2, 4]);
}

#[test]
fn test_null_literals_compile_to_null_checks() {
    assert_eq!(ids_for(&and(json!([leaf("note", "note", "equal", json!(null))]))), vec![2]);
    assert_eq!(
        ids_for(&and(json!([leaf("note", "note", "not_equal", json!(null))]))),
        vec![1, 3, 4]
    );
    assert_eq!(
        ids_for(&and(json!([leaf("placed__variable_date", "placed", "is_null", json!(null))]))),
        vec![3]
    );
}

#[test]
fn test_pattern_operators() {
    assert_eq!(ids_for(&and(json!([leaf("note", "note", "contains", json!("IF"))]))), vec![3]);
    assert_eq!(ids_for(&and(json!([leaf("note", "note", "begins_with", json!("ru"))]))), vec![1]);
    assert_eq!(ids_for(&and(json!([leaf("note", "note", "ends_with", json!("ft"))]))), vec![3]);
    assert_eq!(
        ids_for(&and(json!([leaf("status", "status", "in", json!(["open", "closed"]))]))),
        vec![1, 2, 3]
    );
    assert_eq!(
        ids_for(&and(json!([leaf("status", "status", "not_in", json!("open,closed"))]))),
        vec![4]
    );
}

#[test]
fn test_renders_parameterised_sql() {
    let compiled = compile_tree(&and(json!([
        leaf("status", "status", "equal", json!("open")),
        leaf("note", "note", "not_contains", json!("50%"))
    ])))
    .unwrap();

    let (sql, params) = compiled.predicate.to_sql(&Postgres).unwrap();
    assert_eq!(
        sql,
        r#"(("orders"."status" = $1) AND NOT ("orders"."note" ILIKE $2 AND "orders"."note" IS NOT NULL))"#
    );
    assert_eq!(
        params,
        vec![Value::String("open".to_string()), Value::String("%50\\%%".to_string())]
    );

    let (sql, _) = compiled.predicate.to_sql(&MySql).unwrap();
    assert!(sql.starts_with("((`orders`.`status` = ?) AND NOT ("));
}

#[test]
fn test_negation_on_required_field_has_no_null_guard() {
    let compiled = compile_tree(&and(json!([leaf("status", "status", "not_equal", json!("open"))]))).unwrap();
    let (sql, _) = compiled.predicate.to_sql(&Postgres).unwrap();
    assert_eq!(sql, r#"NOT ("orders"."status" = $1)"#);
}

#[test]
fn test_variable_date_today() {
    let group = and(json!([leaf("placed__variable_date", "placed", "equal", json!("#variable_date:1"))]));
    let compiled = compile_tree(&group).unwrap();
    assert_eq!(matching_ids(&compiled), vec![1]);

    let (sql, params) = compiled.predicate.to_sql(&Postgres).unwrap();
    assert_eq!(sql, r#"(("orders"."placed" >= $1) AND ("orders"."placed" <= $2))"#);
    assert_eq!(params, vec![date(2024, 3, 15), date(2024, 3, 15)]);
    assert!(compiled.period.day_period().is_some());
}

#[test]
fn test_variable_date_orderings() {
    let before_this_month = and(json!([leaf("placed__variable_date", "placed", "less", json!("#variable_date:7"))]));
    assert_eq!(ids_for(&before_this_month), vec![4]);

    let after_this_month = and(json!([leaf("placed__variable_date", "placed", "greater", json!("#variable_date:7"))]));
    assert_eq!(ids_for(&after_this_month), vec![2]);

    let outside = and(json!([leaf("placed__variable_date", "placed", "not_equal", json!("#variable_date:7"))]));
    assert_eq!(ids_for(&outside), vec![2, 3, 4]);
}

#[test]
fn test_period_for_this_month() {
    let compiled = compile_tree(&and(json!([
        leaf("placed__variable_date", "placed", "equal", json!("#variable_date:7"))
    ])))
    .unwrap();
    let d = |day| NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
    assert_eq!(compiled.period.month_period(), Some((d(1), d(31))));
    assert_eq!(compiled.period.quarter_period(), None);
}

#[test]
fn test_negated_leaves_do_not_record_a_period() {
    let compiled = compile_tree(&and(json!([
        leaf("placed__variable_date", "placed", "not_equal", json!("#variable_date:7"))
    ])))
    .unwrap();
    assert!(compiled.period.is_empty());
}

#[test]
fn test_variable_year() {
    let this_year = and(json!([leaf("placed__variable_year", "placed", "equal", json!("#year:2024"))]));
    let compiled = compile_tree(&this_year).unwrap();
    assert_eq!(matching_ids(&compiled), vec![1, 2]);
    assert!(compiled.period.year_period().is_some());

    let other_years = and(json!([leaf("placed__variable_year", "placed", "not_equal", json!("#year:2024"))]));
    assert_eq!(ids_for(&other_years), vec![3, 4]);

    let before = and(json!([leaf("placed__variable_year", "placed", "less", json!("#year:2024"))]));
    assert_eq!(ids_for(&before), vec![4]);
}

#[test]
fn test_financial_variable_year() {
    // FY2023 runs 2023-04-01 ..= 2024-03-31
    let group = and(json!([
        leaf("placed__financial_variable_year", "placed", "equal", json!("#year:2023"))
    ]));
    let compiled = compile_tree(&group).unwrap();
    assert_eq!(matching_ids(&compiled), vec![1, 4]);

    let start = NaiveDate::from_ymd_opt(2023, 4, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
    assert_eq!(compiled.period.year_period(), Some((start, end)));

    let later = and(json!([
        leaf("placed__financial_variable_year", "placed", "greater", json!("#year:2023"))
    ]));
    assert_eq!(ids_for(&later), vec![2]);
}

#[test]
fn test_calendar_quarter() {
    let q2 = and(json!([leaf("placed__variable_quarter", "placed", "equal", json!("#quarter:2"))]));
    assert_eq!(ids_for(&q2), vec![2]);

    let compiled = compile_tree(&q2).unwrap();
    let (sql, params) = compiled.predicate.to_sql(&Postgres).unwrap();
    assert_eq!(
        sql,
        r#"((EXTRACT(MONTH FROM "orders"."placed") > $1) AND (EXTRACT(MONTH FROM "orders"."placed") <= $2))"#
    );
    assert_eq!(params, vec![Value::Int(3), Value::Int(6)]);
}

#[test]
fn test_financial_quarter_follows_start_month() {
    // with an April start, Q1 is April to June and Q4 is January to March
    let q1 = and(json!([leaf("placed__variable_quarter", "placed", "equal", json!("#financial_quarter:1"))]));
    assert_eq!(ids_for(&q1), vec![2]);
    let q4 = and(json!([leaf("placed__variable_quarter", "placed", "in", json!("#financial_quarter:4"))]));
    assert_eq!(ids_for(&q4), vec![1]);
    let not_q3 = and(json!([
        leaf("placed__variable_quarter", "placed", "not_in", json!("#financial_quarter:3"))
    ]));
    assert_eq!(ids_for(&not_q3), vec![1, 2, 3]);
}

#[test]
fn test_month_and_weekday() {
    let march = and(json!([leaf("placed__variable_month", "placed", "equal", json!("#month:3"))]));
    assert_eq!(ids_for(&march), vec![1]);

    // weekdays count from Sunday = 1, so Friday is 6
    let fridays = and(json!([leaf("placed__variable_day", "placed", "equal", json!(6))]));
    assert_eq!(ids_for(&fridays), vec![1]);
}

#[test]
fn test_week_number() {
    let from_week_11 = and(json!([leaf("placed__week_number", "placed", "greater_or_equal", json!(11))]));
    assert_eq!(ids_for(&from_week_11), vec![1, 2, 4]);

    let not_week_11 = and(json!([leaf("placed__week_number", "placed", "not_equal", json!("11"))]));
    assert_eq!(ids_for(&not_week_11), vec![2, 3, 4]);
}

#[test]
fn test_financial_week_anchored_by_sibling_range() {
    // week 50 of FY2023 is 2024-03-09 up to 2024-03-16
    let group = and(json!([
        leaf("placed__variable_date", "placed", "equal", json!("#variable_date:45")),
        leaf("placed__financial_week_number", "placed", "equal", json!(50))
    ]));
    assert_eq!(ids_for(&group), vec![1]);

    let by_year = and(json!([
        leaf("placed__financial_week_number", "placed", "less", json!(2)),
        leaf("placed__financial_variable_year", "placed", "equal", json!("#year:2023"))
    ]));
    assert_eq!(ids_for(&by_year), Vec::<i64>::new());
}

#[test]
fn test_financial_week_errors() {
    let unanchored = and(json!([leaf("placed__financial_week_number", "placed", "equal", json!(3))]));
    assert!(matches!(compile_tree(&unanchored), Err(FilterError::MissingFinancialYear)));

    // an anchor in a parent group does not count
    let nested = and(json!([
        leaf("placed__variable_date", "placed", "equal", json!("#variable_date:45")),
        { "condition": "AND", "rules": [leaf("placed__financial_week_number", "placed", "equal", json!(3))] }
    ]));
    assert!(matches!(compile_tree(&nested), Err(FilterError::MissingFinancialYear)));

    let out_of_range = and(json!([
        leaf("placed__variable_date", "placed", "equal", json!("#variable_date:44")),
        leaf("placed__financial_week_number", "placed", "equal", json!(60))
    ]));
    assert!(matches!(
        compile_tree(&out_of_range),
        Err(FilterError::FinancialWeekOutOfRange(60))
    ));
}

#[test]
fn test_logged_in_user() {
    let mine = and(json!([leaf("owner_id__logged_in_user", "owner_id", "equal", json!("1"))]));
    assert_eq!(ids_for(&mine), vec![1, 3]);

    let not_mine = and(json!([leaf("owner_id__logged_in_user", "owner_id", "equal", json!("0"))]));
    assert_eq!(ids_for(&not_mine), vec![2, 4]);

    let double_negative = and(json!([leaf("owner_id__logged_in_user", "owner_id", "not_equal", json!("0"))]));
    assert_eq!(ids_for(&double_negative), vec![1, 3]);

    let catalog = catalog();
    let anonymous = CompileContext::new(today(), 4).unwrap();
    let result = FilterCompiler::new(&catalog, &anonymous).compile(Some(&mine));
    assert!(matches!(result, Err(FilterError::MissingLoggedInUser)));
}

#[test]
fn test_field_vs_field() {
    let shipped_early = and(json!([leaf("shipped__field_vs_field", "shipped", "less", json!("placed"))]));
    assert_eq!(ids_for(&shipped_early), vec![2]);

    let same_day = and(json!([leaf("shipped__field_vs_field", "shipped", "equal", json!("placed"))]));
    assert_eq!(ids_for(&same_day), vec![4]);

    let different_day = and(json!([leaf("shipped__field_vs_field", "shipped", "not_equal", json!("placed"))]));
    assert_eq!(ids_for(&different_day), vec![1, 2, 3]);
}

#[test]
fn test_extra_predicate_is_anded_with_or_tree() {
    let group = tree(json!({
        "condition": "OR",
        "rules": [
            leaf("status", "status", "equal", json!("open")),
            leaf("status", "status", "equal", json!("closed"))
        ]
    }));
    let catalog = catalog();
    let ctx = ctx();
    let scope = qualified_ident("orders", "total").compare(BinaryOperator::Gt, Value::Int(30));

    let compiled = compile(Some(&group), &catalog, &ctx, Some(scope.clone()), None).unwrap();
    assert_eq!(matching_ids(&compiled), vec![1, 2]);

    let scope_only = compile(None, &catalog, &ctx, Some(scope), None).unwrap();
    assert_eq!(matching_ids(&scope_only), vec![1, 2, 4]);
}

#[test]
fn test_extra_tree_is_anded() {
    let catalog = catalog();
    let ctx = ctx();
    let user_tree = and(json!([leaf("status", "status", "equal", json!("open"))]));
    let dashboard = tree(json!({
        "condition": "OR",
        "rules": [leaf("placed__variable_date", "placed", "equal", json!("#variable_date:7"))]
    }));

    let compiled = FilterCompiler::new(&catalog, &ctx)
        .with_extra_tree(&dashboard)
        .compile(Some(&user_tree))
        .unwrap();
    assert_eq!(matching_ids(&compiled), vec![1]);
    assert!(compiled.period.month_period().is_some());
}

#[test]
fn test_prefix_scopes_fields_to_relation() {
    let catalog = catalog();
    let ctx = ctx();
    let group = and(json!([leaf("name", "name", "equal", json!("Acme"))]));

    let compiled = compile(Some(&group), &catalog, &ctx, None, Some("customer")).unwrap();
    assert_eq!(matching_ids(&compiled), vec![1, 4]);

    let (sql, _) = compiled.predicate.to_sql(&Postgres).unwrap();
    assert_eq!(sql, r#"("customer"."name" = $1)"#);

    // fields reached through a relation are nullable
    let negated = and(json!([leaf("name", "name", "not_equal", json!("Acme"))]));
    let compiled = compile(Some(&negated), &catalog, &ctx, None, Some("customer")).unwrap();
    assert_eq!(matching_ids(&compiled), vec![2, 3]);
}

#[test]
fn test_unsupported_operators_fail_fast() {
    let cases = [
        leaf("status", "status", "less", json!("m")),
        leaf("total", "total", "contains", json!("1")),
        leaf("paid", "paid", "in", json!([true])),
        leaf("status__logged_in_user", "status", "equal", json!("1")),
        leaf("status__variable_date", "status", "equal", json!("#variable_date:1")),
        leaf("placed__variable_month", "placed", "greater", json!("#month:3")),
        leaf("placed__week_number", "placed", "in", json!(3)),
    ];
    for case in cases {
        let result = compile_tree(&and(json!([case.clone()])));
        assert!(
            matches!(result, Err(FilterError::UnsupportedOperatorForType { .. })),
            "{case} should be rejected, got {result:?}"
        );
    }
}

#[test]
fn test_non_numeric_value_on_number_field_is_malformed() {
    let group = and(json!([leaf("total", "total", "equal", json!("abc"))]));
    assert!(matches!(
        compile_tree(&group),
        Err(FilterError::MalformedLeafValue { leaf, value, .. }) if leaf == "total" && value == "\"abc\""
    ));

    let listed = and(json!([leaf("total", "total", "in", json!("15, lots"))]));
    assert!(matches!(compile_tree(&listed), Err(FilterError::MalformedLeafValue { .. })));

    let numeric_text = and(json!([leaf("total", "total", "equal", json!("120"))]));
    assert_eq!(ids_for(&numeric_text), vec![1]);
}

#[test]
fn test_field_resolution_errors_propagate() {
    let unknown = and(json!([leaf("colour", "colour", "equal", json!("red"))]));
    assert!(matches!(
        compile_tree(&unknown),
        Err(FilterError::FieldResolution(FieldResolutionError::UnknownField { path })) if path == "colour"
    ));

    let relation = and(json!([leaf("supplier__name", "supplier__name", "equal", json!("x"))]));
    assert!(matches!(
        compile_tree(&relation),
        Err(FilterError::FieldResolution(FieldResolutionError::UnknownRelation { name })) if name == "supplier"
    ));
}

#[test]
fn test_closure_resolver() {
    let resolver = |path: &str| -> std::result::Result<ResolvedField, FieldResolutionError> {
        Ok(ResolvedField {
            path: path.to_string(),
            kind: FieldKind::Number,
            column: planner::query::ast::expr::Ident::new(None, path),
            nullable: false,
        })
    };
    let ctx = ctx();
    let group = and(json!([leaf("total", "total", "greater_or_equal", json!(100))]));
    let compiled = FilterCompiler::new(&resolver, &ctx).compile(Some(&group)).unwrap();
    assert_eq!(matching_ids(&compiled), vec![1, 4]);
}

#[test]
fn test_context_rejects_bad_financial_month() {
    assert!(matches!(
        CompileContext::new(today(), 13),
        Err(FilterError::InvalidFinancialYearStartMonth(13))
    ));
}
