use crate::error::FilterError;
use planner::query::ast::expr::BinaryOperator;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

/// Comparison operators a filter leaf can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    Contains,
    NotContains,
    BeginsWith,
    NotBeginsWith,
    EndsWith,
    NotEndsWith,
    In,
    NotIn,
    IsNull,
    IsNotNull,
}

impl Operator {
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Equal => "equal",
            Operator::NotEqual => "not_equal",
            Operator::Less => "less",
            Operator::LessOrEqual => "less_or_equal",
            Operator::Greater => "greater",
            Operator::GreaterOrEqual => "greater_or_equal",
            Operator::Contains => "contains",
            Operator::NotContains => "not_contains",
            Operator::BeginsWith => "begins_with",
            Operator::NotBeginsWith => "not_begins_with",
            Operator::EndsWith => "ends_with",
            Operator::NotEndsWith => "not_ends_with",
            Operator::In => "in",
            Operator::NotIn => "not_in",
            Operator::IsNull => "is_null",
            Operator::IsNotNull => "is_not_null",
        }
    }

    /// `not_*` operators are built as their positive form and then negated
    /// as a whole.
    pub fn is_negated(self) -> bool {
        matches!(
            self,
            Operator::NotEqual
                | Operator::NotIn
                | Operator::NotContains
                | Operator::NotBeginsWith
                | Operator::NotEndsWith
        )
    }

    pub fn positive(self) -> Operator {
        match self {
            Operator::NotEqual => Operator::Equal,
            Operator::NotIn => Operator::In,
            Operator::NotContains => Operator::Contains,
            Operator::NotBeginsWith => Operator::BeginsWith,
            Operator::NotEndsWith => Operator::EndsWith,
            other => other,
        }
    }

    pub fn is_null_check(self) -> bool {
        matches!(self, Operator::IsNull | Operator::IsNotNull)
    }

    pub fn is_ordering(self) -> bool {
        matches!(
            self,
            Operator::Less | Operator::LessOrEqual | Operator::Greater | Operator::GreaterOrEqual
        )
    }

    /// The SQL comparison for `equal` and the ordering operators.
    pub fn comparison(self) -> Option<BinaryOperator> {
        match self {
            Operator::Equal => Some(BinaryOperator::Eq),
            Operator::Less => Some(BinaryOperator::Lt),
            Operator::LessOrEqual => Some(BinaryOperator::LtEq),
            Operator::Greater => Some(BinaryOperator::Gt),
            Operator::GreaterOrEqual => Some(BinaryOperator::GtEq),
            _ => None,
        }
    }
}

impl FromStr for Operator {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let op = match s {
            "equal" => Operator::Equal,
            "not_equal" => Operator::NotEqual,
            "less" => Operator::Less,
            "less_or_equal" => Operator::LessOrEqual,
            "greater" => Operator::Greater,
            "greater_or_equal" => Operator::GreaterOrEqual,
            "contains" => Operator::Contains,
            "not_contains" => Operator::NotContains,
            "begins_with" => Operator::BeginsWith,
            "not_begins_with" => Operator::NotBeginsWith,
            "ends_with" => Operator::EndsWith,
            "not_ends_with" => Operator::NotEndsWith,
            "in" => Operator::In,
            "not_in" => Operator::NotIn,
            "is_null" => Operator::IsNull,
            "is_not_null" => Operator::IsNotNull,
            other => return Err(FilterError::UnknownOperator(other.to_string())),
        };
        Ok(op)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Operator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Operator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
