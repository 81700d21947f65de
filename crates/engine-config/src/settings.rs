use crate::{
    env::EnvManager,
    error::{ConfigError, Result},
};
use chrono::{Local, NaiveDate};
use planner::query::dialect::DialectKind;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use tracing::{info, warn};

pub const FINANCIAL_YEAR_START_MONTH_VAR: &str = "REPORT_FINANCIAL_YEAR_START_MONTH";
pub const SQL_DIALECT_VAR: &str = "REPORT_SQL_DIALECT";
pub const TODAY_VAR: &str = "REPORT_TODAY";

const DEFAULT_FINANCIAL_YEAR_START_MONTH: u32 = 1;

/// Settings shared by every filter compilation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    /// Month (1-12) on which the financial year starts.
    pub financial_year_start_month: u32,
    pub dialect: DialectKind,
    /// Pins "today" for relative date ranges. Uses the local date when unset.
    pub today: Option<NaiveDate>,
}

impl Default for FilterSettings {
    fn default() -> Self {
        FilterSettings {
            financial_year_start_month: DEFAULT_FINANCIAL_YEAR_START_MONTH,
            dialect: DialectKind::default(),
            today: None,
        }
    }
}

impl FilterSettings {
    /// Defaults, overlaid with the settings file (if any), overlaid with the
    /// environment.
    pub fn load(path: Option<&Path>, env: &EnvManager) -> Result<Self> {
        let mut settings = match path {
            Some(path) => FilterSettings::from_file(path)?,
            None => FilterSettings::default(),
        };
        settings.apply_env(env)?;
        settings.normalize();

        info!(
            "Loaded filter settings (financial year starts in month {}, dialect: {})",
            settings.financial_year_start_month, settings.dialect
        );
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn apply_env(&mut self, env: &EnvManager) -> Result<()> {
        if let Some(month) = env.get(FINANCIAL_YEAR_START_MONTH_VAR) {
            self.financial_year_start_month =
                month.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    key: FINANCIAL_YEAR_START_MONTH_VAR.to_string(),
                    reason: format!("'{month}' is not a month number"),
                })?;
        }
        if let Some(dialect) = env.get(SQL_DIALECT_VAR) {
            self.dialect = dialect.parse().map_err(|reason| ConfigError::InvalidValue {
                key: SQL_DIALECT_VAR.to_string(),
                reason,
            })?;
        }
        if let Some(today) = env.get(TODAY_VAR) {
            let date = NaiveDate::parse_from_str(today.trim(), "%Y-%m-%d").map_err(|e| {
                ConfigError::InvalidValue {
                    key: TODAY_VAR.to_string(),
                    reason: e.to_string(),
                }
            })?;
            self.today = Some(date);
        }
        Ok(())
    }

    /// The pinned date, or the local date.
    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    fn normalize(&mut self) {
        if !(1..=12).contains(&self.financial_year_start_month) {
            warn!(
                "Financial year start month {} is out of range, falling back to {}",
                self.financial_year_start_month, DEFAULT_FINANCIAL_YEAR_START_MONTH
            );
            self.financial_year_start_month = DEFAULT_FINANCIAL_YEAR_START_MONTH;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tracing_test::traced_test;

    fn settings_file(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let settings = FilterSettings::load(None, &EnvManager::empty()).unwrap();
        assert_eq!(settings, FilterSettings::default());
        assert_eq!(settings.financial_year_start_month, 1);
        assert_eq!(settings.dialect, DialectKind::Postgres);
    }

    #[test]
    fn test_file_then_env_precedence() {
        let file = settings_file(r#"{ "financial_year_start_month": 4, "dialect": "mysql" }"#);
        let env = EnvManager::empty()
            .with_var(FINANCIAL_YEAR_START_MONTH_VAR, "7")
            .with_var(TODAY_VAR, "2024-03-15");

        let settings = FilterSettings::load(Some(file.path()), &env).unwrap();
        assert_eq!(settings.financial_year_start_month, 7);
        assert_eq!(settings.dialect, DialectKind::MySql);
        assert_eq!(settings.today(), NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let file = settings_file(r#"{ "today": "2023-12-31" }"#);
        let settings = FilterSettings::load(Some(file.path()), &EnvManager::empty()).unwrap();
        assert_eq!(settings.financial_year_start_month, 1);
        assert_eq!(settings.today, NaiveDate::from_ymd_opt(2023, 12, 31));
    }

    #[traced_test]
    #[test]
    fn test_out_of_range_month_falls_back() {
        let env = EnvManager::empty().with_var(FINANCIAL_YEAR_START_MONTH_VAR, "13");
        let settings = FilterSettings::load(None, &env).unwrap();
        assert_eq!(settings.financial_year_start_month, 1);
        assert!(logs_contain("falling back to 1"));
    }

    #[test]
    fn test_invalid_values_are_errors() {
        let env = EnvManager::empty().with_var(SQL_DIALECT_VAR, "oracle");
        assert!(matches!(
            FilterSettings::load(None, &env),
            Err(ConfigError::InvalidValue { key, .. }) if key == SQL_DIALECT_VAR
        ));

        let env = EnvManager::empty().with_var(TODAY_VAR, "15/03/2024");
        assert!(FilterSettings::load(None, &env).is_err());

        let env = EnvManager::empty().with_var(FINANCIAL_YEAR_START_MONTH_VAR, "april");
        assert!(FilterSettings::load(None, &env).is_err());

        let file = settings_file("{ not json");
        assert!(matches!(
            FilterSettings::load(Some(file.path()), &EnvManager::empty()),
            Err(ConfigError::Parse { .. })
        ));
    }
}
