use engine_config::ConfigError;
use expression_engine::ExpressionError;
use filter_engine::FilterError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to read {path}: {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write the report: {0}")]
    FileWrite(#[from] std::io::Error),

    #[error("Failed to parse {path} as JSON: {source}")]
    JsonParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Filter error: {0}")]
    Filter(#[from] FilterError),

    #[error("Failed to evaluate the filter over the rows: {0}")]
    Evaluation(#[from] ExpressionError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
