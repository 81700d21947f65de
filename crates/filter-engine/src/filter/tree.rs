//! The filter tree. Filters arrive as the JSON a query-builder widget
//! produces; they are decoded once into typed nodes here.

use crate::{
    error::{FilterError, Result},
    filter::{operator::Operator, value::LeafValue},
};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Combinator {
    And,
    Or,
}

/// Only an exact `"AND"` selects conjunction; any other condition is OR.
impl From<&str> for Combinator {
    fn from(condition: &str) -> Self {
        match condition {
            "AND" => Combinator::And,
            _ => Combinator::Or,
        }
    }
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Combinator::And => f.write_str("AND"),
            Combinator::Or => f.write_str("OR"),
        }
    }
}

/// How a leaf's value is interpreted, taken from the suffix of its id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeafKind {
    Plain,
    VariableDate,
    VariableYear,
    FinancialVariableYear,
    VariableMonth,
    VariableQuarter,
    VariableDay,
    WeekNumber,
    FinancialWeekNumber,
    LoggedInUser,
    FieldVsField,
}

const SUFFIXES: &[(&str, LeafKind)] = &[
    ("__financial_variable_year", LeafKind::FinancialVariableYear),
    ("__financial_week_number", LeafKind::FinancialWeekNumber),
    ("__variable_date", LeafKind::VariableDate),
    ("__variable_year", LeafKind::VariableYear),
    ("__variable_month", LeafKind::VariableMonth),
    ("__variable_quarter", LeafKind::VariableQuarter),
    ("__variable_day", LeafKind::VariableDay),
    ("__week_number", LeafKind::WeekNumber),
    ("__logged_in_user", LeafKind::LoggedInUser),
    ("__field_vs_field", LeafKind::FieldVsField),
];

impl LeafKind {
    pub fn from_leaf_id(id: &str) -> Self {
        SUFFIXES
            .iter()
            .find(|(suffix, _)| id.ends_with(suffix))
            .map(|(_, kind)| *kind)
            .unwrap_or(LeafKind::Plain)
    }

    pub fn describe(self) -> &'static str {
        match self {
            LeafKind::Plain => "a plain value",
            LeafKind::VariableDate => "a variable date",
            LeafKind::VariableYear => "a variable year",
            LeafKind::FinancialVariableYear => "a financial variable year",
            LeafKind::VariableMonth => "a variable month",
            LeafKind::VariableQuarter => "a variable quarter",
            LeafKind::VariableDay => "a variable day",
            LeafKind::WeekNumber => "a week number",
            LeafKind::FinancialWeekNumber => "a financial week number",
            LeafKind::LoggedInUser => "the logged in user",
            LeafKind::FieldVsField => "another field",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterLeaf {
    pub id: String,
    pub field: String,
    pub operator: Operator,
    pub kind: LeafKind,
    pub value: LeafValue,
}

impl FilterLeaf {
    pub fn new(id: &str, field: &str, operator: Operator, raw: serde_json::Value) -> Result<Self> {
        let kind = LeafKind::from_leaf_id(id);
        let value = LeafValue::decode(kind, operator, id, &raw)?;
        Ok(FilterLeaf {
            id: id.to_string(),
            field: field.to_string(),
            operator,
            kind,
            value,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterGroup {
    pub combinator: Combinator,
    pub children: Vec<FilterNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterNode {
    Group(FilterGroup),
    Leaf(FilterLeaf),
}

impl FilterGroup {
    pub fn new(combinator: Combinator, children: Vec<FilterNode>) -> Self {
        FilterGroup {
            combinator,
            children,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Parses a stored filter. Blank input, `null` and `{}` mean "no filter".
    pub fn parse(json: &str) -> Result<Option<FilterGroup>> {
        if json.trim().is_empty() {
            return Ok(None);
        }
        FilterGroup::from_json(serde_json::from_str(json)?)
    }

    pub fn from_json(json: serde_json::Value) -> Result<Option<FilterGroup>> {
        match &json {
            serde_json::Value::Null => return Ok(None),
            serde_json::Value::Object(map) if map.is_empty() => return Ok(None),
            serde_json::Value::Object(map) if !map.contains_key("condition") => {
                return Err(FilterError::InvalidTree(
                    "top level node must be a group with a condition".to_string(),
                ));
            }
            serde_json::Value::Object(_) => {}
            _ => return Err(FilterError::InvalidTree("expected a JSON object".to_string())),
        }

        let raw: RawGroup = serde_json::from_value(json)?;
        FilterGroup::try_from(raw).map(Some)
    }

    /// Leaves directly under this group, skipping nested groups.
    pub fn leaves(&self) -> impl Iterator<Item = &FilterLeaf> {
        self.children.iter().filter_map(|child| match child {
            FilterNode::Leaf(leaf) => Some(leaf),
            FilterNode::Group(_) => None,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
struct RawGroup {
    condition: String,
    #[serde(default)]
    rules: Vec<RawNode>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawNode {
    Group(RawGroup),
    Rule(RawRule),
}

#[derive(Debug, Clone, Deserialize)]
struct RawRule {
    id: String,
    field: String,
    operator: String,
    #[serde(default)]
    value: serde_json::Value,
}

impl TryFrom<RawGroup> for FilterGroup {
    type Error = FilterError;

    fn try_from(raw: RawGroup) -> Result<Self> {
        let combinator = Combinator::from(raw.condition.as_str());
        let children = raw
            .rules
            .into_iter()
            .map(|node| match node {
                RawNode::Group(group) => FilterGroup::try_from(group).map(FilterNode::Group),
                RawNode::Rule(rule) => {
                    let operator = rule.operator.parse()?;
                    FilterLeaf::new(&rule.id, &rule.field, operator, rule.value).map(FilterNode::Leaf)
                }
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(FilterGroup::new(combinator, children))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dates::range_type::RangeType, filter::value::QuarterRef};

    #[test]
    fn test_leaf_kind_from_suffix() {
        assert_eq!(LeafKind::from_leaf_id("created__variable_date"), LeafKind::VariableDate);
        assert_eq!(
            LeafKind::from_leaf_id("created__financial_variable_year"),
            LeafKind::FinancialVariableYear
        );
        assert_eq!(
            LeafKind::from_leaf_id("created__financial_week_number"),
            LeafKind::FinancialWeekNumber
        );
        assert_eq!(LeafKind::from_leaf_id("created__week_number"), LeafKind::WeekNumber);
        assert_eq!(LeafKind::from_leaf_id("customer__name"), LeafKind::Plain);
    }

    #[test]
    fn test_parse_nested_tree() {
        let json = r##"{
            "condition": "OR",
            "rules": [
                { "condition": "AND", "rules": [
                    { "id": "status", "field": "status", "type": "string", "operator": "equal", "value": "open" },
                    { "id": "placed__variable_quarter", "field": "placed", "type": "string",
                      "operator": "equal", "value": "#quarter:2" }
                ]},
                { "id": "placed__variable_date", "field": "placed", "type": "string",
                  "operator": "is_null", "value": null }
            ],
            "valid": true
        }"##;

        let tree = FilterGroup::parse(json).unwrap().unwrap();
        assert_eq!(tree.combinator, Combinator::Or);
        assert_eq!(tree.children.len(), 2);

        let FilterNode::Group(inner) = &tree.children[0] else {
            panic!("expected a nested group");
        };
        assert_eq!(inner.combinator, Combinator::And);
        let quarter: Vec<&FilterLeaf> = inner.leaves().collect();
        assert_eq!(quarter[1].value, LeafValue::Quarter(QuarterRef::Calendar(2)));

        let FilterNode::Leaf(leaf) = &tree.children[1] else {
            panic!("expected a leaf");
        };
        assert_eq!(leaf.kind, LeafKind::VariableDate);
        assert_eq!(leaf.value, LeafValue::NullCheck);
    }

    #[test]
    fn test_parse_decodes_range_ids() {
        let json = r##"{"condition":"AND","rules":[
            {"id":"d__variable_date","field":"d","operator":"equal","value":"#variable_date:45"}]}"##;
        let tree = FilterGroup::parse(json).unwrap().unwrap();
        let leaf = tree.leaves().next().unwrap();
        assert_eq!(leaf.value, LeafValue::Range(RangeType::ThisFinancialYear));
    }

    #[test]
    fn test_empty_inputs_mean_no_filter() {
        assert_eq!(FilterGroup::parse("").unwrap(), None);
        assert_eq!(FilterGroup::parse("null").unwrap(), None);
        assert_eq!(FilterGroup::parse("{}").unwrap(), None);
        let empty = FilterGroup::parse(r#"{"condition":"AND","rules":[]}"#).unwrap().unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_condition_other_than_and_is_or() {
        for condition in ["and", "Or", "any", ""] {
            let json = format!(r#"{{"condition":"{condition}","rules":[]}}"#);
            let tree = FilterGroup::parse(&json).unwrap().unwrap();
            assert_eq!(tree.combinator, Combinator::Or, "condition {condition:?}");
        }
        let tree = FilterGroup::parse(r#"{"condition":"AND","rules":[]}"#).unwrap().unwrap();
        assert_eq!(tree.combinator, Combinator::And);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            FilterGroup::parse(r#"{"condition":"AND","rules":[{"id":"a","field":"a","operator":"like","value":1}]}"#),
            Err(FilterError::UnknownOperator(op)) if op == "like"
        ));
        assert!(matches!(
            FilterGroup::parse(r#"[1, 2]"#),
            Err(FilterError::InvalidTree(_))
        ));
        assert!(matches!(FilterGroup::parse("{"), Err(FilterError::Json(_))));
    }
}
