use crate::{
    error::CliError,
    output::{CompileReport, PeriodSummary, RangeEntry, ResolvedRange},
};
use chrono::NaiveDate;
use clap::Parser;
use commands::Commands;
use engine_config::{EnvManager, FilterSettings};
use filter_engine::{
    CompileContext, FieldCatalog, FilterGroup, RangeType, compile, dates::catalog::range_type_choices,
    dates::resolve_range,
};
use model::{core::value::Value, records::row::RowData};
use planner::query::{dialect::DialectKind, renderer::render_to_sql};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;
mod error;
mod output;

#[derive(Parser)]
#[command(
    name = "report-filters",
    version = "0.1.0",
    about = "Compile report filter trees into SQL predicates"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    // Logs go to stderr so that reports on stdout stay machine readable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Ranges { json } => {
            let entries: Vec<RangeEntry> = range_type_choices()
                .into_iter()
                .map(|(range, label)| RangeEntry { id: range.id(), label })
                .collect();
            if json {
                output::print_report(&entries)?;
            } else {
                output::print_ranges_table(&entries);
            }
        }
        Commands::Resolve {
            id,
            today,
            financial_month,
            settings,
            env_file,
        } => {
            let mut settings = load_settings(settings.as_deref(), env_file.as_deref())?;
            if let Some(today) = today {
                settings.today = Some(parse_date(&today)?);
            }
            let month = financial_month.unwrap_or(settings.financial_year_start_month);

            let range = RangeType::from_id(id)?;
            let today = settings.today();
            let spec = resolve_range(range, today, month)?;
            output::print_report(&ResolvedRange::new(range, today, month, spec))?;
        }
        Commands::Compile {
            filter,
            schema,
            prefix,
            user,
            dialect,
            settings,
            env_file,
            rows,
            output,
        } => {
            let settings = load_settings(settings.as_deref(), env_file.as_deref())?;
            let dialect = match dialect {
                Some(name) => name
                    .parse::<DialectKind>()
                    .map_err(CliError::InvalidArgument)?,
                None => settings.dialect,
            };

            let catalog: FieldCatalog = read_json(&schema).await?;
            let tree = FilterGroup::parse(&read_file(&filter).await?)?;
            let mut ctx = CompileContext::new(settings.today(), settings.financial_year_start_month)?;
            if let Some(user) = user {
                ctx = ctx.with_current_user(user_value(&user));
            }

            info!("Compiling {} against table '{}'", filter, catalog.table);
            let compiled = compile(tree.as_ref(), &catalog, &ctx, None, prefix.as_deref())?;

            let matching_rows = match rows {
                Some(path) => {
                    let records: Vec<serde_json::Map<String, serde_json::Value>> = read_json(&path).await?;
                    let records = records
                        .iter()
                        .map(|record| catalog.row_from_json(record))
                        .collect::<Result<Vec<RowData>, _>>()?;
                    let kept = expression_engine::filter_rows(compiled.predicate.expr(), &records)?;
                    info!("{} of {} rows match", kept.len(), records.len());
                    Some(kept.into_iter().cloned().collect())
                }
                None => None,
            };

            let select = catalog.select(compiled.predicate.expr().cloned());
            let (sql, params) = render_to_sql(&select, dialect.dialect());
            let report = CompileReport {
                dialect: dialect.to_string(),
                sql,
                params,
                period: PeriodSummary::from(&compiled.period),
                rows: matching_rows,
            };

            match output {
                Some(path) => output::write_report(&report, &path).await?,
                None => output::print_report(&report)?,
            }
        }
    }

    Ok(())
}

fn load_settings(path: Option<&str>, env_file: Option<&str>) -> Result<FilterSettings, CliError> {
    let mut env = EnvManager::from_process();
    if let Some(env_file) = env_file {
        env.load_from_file(env_file)?;
    }
    Ok(FilterSettings::load(path.map(Path::new), &env)?)
}

async fn read_file(path: &str) -> Result<String, CliError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CliError::FileRead {
            path: path.to_string(),
            source,
        })
}

async fn read_json<T: DeserializeOwned>(path: &str) -> Result<T, CliError> {
    let content = read_file(path).await?;
    serde_json::from_str(&content).map_err(|source| CliError::JsonParse {
        path: path.to_string(),
        source,
    })
}

fn parse_date(s: &str) -> Result<NaiveDate, CliError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| CliError::InvalidArgument(format!("'{s}' is not a YYYY-MM-DD date: {e}")))
}

/// Numeric identities compare as numbers, UUIDs as UUIDs, anything else as text.
fn user_value(user: &str) -> Value {
    Value::key_from_str(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_value() {
        assert_eq!(user_value("42"), Value::Int(42));
        assert_eq!(user_value("alice"), Value::String("alice".to_string()));
        assert!(matches!(user_value("67e55044-10b1-426f-9247-bb680e5fe0c8"), Value::Uuid(_)));
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-03-15").unwrap(), NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert!(matches!(parse_date("15/03/2024"), Err(CliError::InvalidArgument(_))));
    }

    #[test]
    fn test_cli_parses_compile() {
        let cli = Cli::try_parse_from([
            "report-filters",
            "compile",
            "--filter",
            "tree.json",
            "--schema",
            "orders.json",
            "--dialect",
            "mysql",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Compile { dialect: Some(d), rows: None, .. } if d == "mysql"
        ));
    }
}
