//! Defines the `Dialect` trait for database-specific SQL syntax.

use crate::query::ast::expr::DatePart;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

pub trait Dialect: Send + Sync {
    /// Wraps an identifier (like a table or column name) in the correct
    /// quotation marks for the dialect.
    ///
    /// - PostgreSQL uses double quotes: `"my_column"`
    /// - MySQL uses backticks: `` `my_column` ``
    fn quote_identifier(&self, ident: &str) -> String;

    /// Returns the placeholder for a parameterized query.
    ///
    /// - PostgreSQL uses `$1`, `$2`, etc.
    /// - MySQL uses `?`
    fn get_placeholder(&self, index: usize) -> String;

    /// Returns the SQL surrounding an expression to extract a date component,
    /// as a `(prefix, suffix)` pair.
    fn date_part(&self, part: DatePart) -> (&'static str, &'static str);

    /// Whether the dialect has a native case-insensitive `ILIKE`.
    fn supports_ilike(&self) -> bool;

    /// Returns the name of the dialect (e.g., "PostgreSQL", "MySQL").
    fn name(&self) -> String;
}

#[derive(Debug, Clone)]
pub struct Postgres;

impl Dialect for Postgres {
    fn quote_identifier(&self, ident: &str) -> String {
        format!(r#""{}""#, ident.replace('"', "\"\""))
    }

    fn get_placeholder(&self, index: usize) -> String {
        // PostgreSQL uses $1, $2, etc.
        format!("${}", index + 1)
    }

    fn date_part(&self, part: DatePart) -> (&'static str, &'static str) {
        match part {
            DatePart::Year => ("EXTRACT(YEAR FROM ", ")"),
            DatePart::Month => ("EXTRACT(MONTH FROM ", ")"),
            DatePart::Week => ("EXTRACT(WEEK FROM ", ")"),
            // DOW is 0 (Sunday) ..= 6 (Saturday)
            DatePart::Weekday => ("(EXTRACT(DOW FROM ", ") + 1)"),
        }
    }

    fn supports_ilike(&self) -> bool {
        true
    }

    fn name(&self) -> String {
        "PostgreSQL".into()
    }
}

#[derive(Debug, Clone)]
pub struct MySql;

impl Dialect for MySql {
    fn quote_identifier(&self, ident: &str) -> String {
        format!(r#"`{}`"#, ident.replace('`', "``"))
    }

    fn get_placeholder(&self, _index: usize) -> String {
        // MySQL uses ?
        "?".into()
    }

    fn date_part(&self, part: DatePart) -> (&'static str, &'static str) {
        match part {
            DatePart::Year => ("YEAR(", ")"),
            DatePart::Month => ("MONTH(", ")"),
            // mode 3: weeks start on Monday, week 1 has 4+ days (ISO 8601)
            DatePart::Week => ("WEEK(", ", 3)"),
            DatePart::Weekday => ("DAYOFWEEK(", ")"),
        }
    }

    fn supports_ilike(&self) -> bool {
        false
    }

    fn name(&self) -> String {
        "MySQL".into()
    }
}

/// Serializable selector for a built-in dialect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectKind {
    #[default]
    Postgres,
    MySql,
}

impl DialectKind {
    pub fn dialect(&self) -> &'static dyn Dialect {
        match self {
            DialectKind::Postgres => &Postgres,
            DialectKind::MySql => &MySql,
        }
    }
}

impl FromStr for DialectKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(DialectKind::Postgres),
            "mysql" => Ok(DialectKind::MySql),
            other => Err(format!("Unknown SQL dialect: {other}")),
        }
    }
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dialect().name())
    }
}
