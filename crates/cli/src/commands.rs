use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// List the relative date ranges in picklist order
    Ranges {
        #[arg(long, help = "Print the catalog as JSON instead of a table")]
        json: bool,
    },
    /// Resolve a relative date range to concrete bounds
    Resolve {
        /// Range id, e.g. 7 for "This month"
        id: i64,

        #[arg(long, help = "Resolve relative to this date (YYYY-MM-DD) instead of today")]
        today: Option<String>,

        #[arg(long, help = "Month (1-12) on which the financial year starts")]
        financial_month: Option<u32>,

        #[arg(long, help = "JSON settings file")]
        settings: Option<String>,

        #[arg(long, help = "Load environment variables from this .env file")]
        env_file: Option<String>,
    },
    /// Compile a filter tree into a SQL query
    Compile {
        #[arg(long, help = "Filter tree JSON file")]
        filter: String,

        #[arg(long, help = "Field catalog JSON file describing the base table")]
        schema: String,

        #[arg(long, help = "Relation path prepended to every field of the filter")]
        prefix: Option<String>,

        #[arg(long, help = "Identity of the logged in user")]
        user: Option<String>,

        #[arg(long, help = "SQL dialect: postgres or mysql")]
        dialect: Option<String>,

        #[arg(long, help = "JSON settings file")]
        settings: Option<String>,

        #[arg(long, help = "Load environment variables from this .env file")]
        env_file: Option<String>,

        #[arg(
            long,
            help = "JSON array of rows to filter in memory with the compiled predicate"
        )]
        rows: Option<String>,

        #[arg(
            long,
            help = "If specified, writes the JSON report to this file instead of stdout"
        )]
        output: Option<String>,
    },
}
