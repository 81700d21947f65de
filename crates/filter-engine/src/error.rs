use thiserror::Error;

pub type Result<T> = std::result::Result<T, FilterError>;

/// Errors raised while resolving date ranges or compiling a filter tree.
#[derive(Debug, Error)]
pub enum FilterError {
    /// The range id is not part of the catalog. Usually a stale stored filter.
    #[error("Unknown range type: {0}")]
    UnknownRangeType(i64),

    /// A leaf value did not follow its `prefix:payload` encoding.
    #[error("Malformed value {value:?} for leaf '{leaf}': {reason}")]
    MalformedLeafValue {
        leaf: String,
        value: String,
        reason: String,
    },

    #[error(transparent)]
    FieldResolution(#[from] FieldResolutionError),

    #[error("Operator '{operator}' is not supported for {target}")]
    UnsupportedOperatorForType { operator: String, target: String },

    #[error("Unknown operator: {0}")]
    UnknownOperator(String),

    #[error("Financial year start month must be between 1 and 12, got {0}")]
    InvalidFinancialYearStartMonth(u32),

    #[error("Filter references the logged in user but no user was supplied")]
    MissingLoggedInUser,

    /// A financial week number leaf needs a financial year leaf in the same group.
    #[error(
        "Financial week number requires a financial year (select a financial year or use a financial year date range)"
    )]
    MissingFinancialYear,

    #[error("Financial week number must be between 1 and 53, got {0}")]
    FinancialWeekOutOfRange(i64),

    #[error("Date arithmetic out of range: {0}")]
    DateOutOfRange(String),

    #[error("Invalid filter tree: {0}")]
    InvalidTree(String),

    #[error("Failed to parse filter JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors surfaced by a [`crate::FieldResolver`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldResolutionError {
    #[error("Unknown field: {path}")]
    UnknownField { path: String },

    #[error("Unknown relation: {name}")]
    UnknownRelation { name: String },
}

impl FilterError {
    pub(crate) fn malformed(leaf: &str, value: impl ToString, reason: impl Into<String>) -> Self {
        FilterError::MalformedLeafValue {
            leaf: leaf.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}
