use clap::{Args, Subcommand};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Set the target attribute on every record that lacks it
    Run {
        #[command(flatten)]
        args: BackfillArgs,
    },
    /// Scan and count records lacking the attribute without writing anything
    Check {
        #[command(flatten)]
        args: BackfillArgs,
    },
    /// Describe the table to verify connectivity and key schema
    Ping {
        #[command(flatten)]
        table: TableArgs,

        #[arg(long, help = "Print the table description as JSON")]
        json: bool,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct TableArgs {
    #[arg(long, help = "Table name [env: BACKFILL_TABLE_NAME]")]
    pub table: Option<String>,

    #[arg(long, help = "AWS region [env: BACKFILL_REGION]")]
    pub region: Option<String>,

    #[arg(long, help = "Endpoint override, e.g. http://localhost:8000 [env: BACKFILL_ENDPOINT]")]
    pub endpoint: Option<String>,

    #[arg(long, help = "Per-request timeout in milliseconds [env: BACKFILL_TIMEOUT_MS]")]
    pub timeout_ms: Option<u64>,

    #[arg(long, help = "Load variables from this .env file before resolving settings")]
    pub env_file: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct BackfillArgs {
    #[command(flatten)]
    pub table: TableArgs,

    #[arg(long, help = "Attribute to backfill [env: BACKFILL_ATTRIBUTE] [default: isTimeClaimed]")]
    pub attribute: Option<String>,

    #[arg(long, help = "Value for records lacking the attribute [env: BACKFILL_DEFAULT_VALUE] [default: false]")]
    pub default_value: Option<bool>,

    #[arg(long, help = "Partition key attribute; discovered from the table if omitted [env: BACKFILL_PARTITION_KEY]")]
    pub partition_key: Option<String>,

    #[arg(long, help = "Sort key attribute, requires --partition-key [env: BACKFILL_SORT_KEY]")]
    pub sort_key: Option<String>,

    #[arg(long, help = "Maximum items evaluated per scan call [env: BACKFILL_PAGE_SIZE]")]
    pub page_size: Option<usize>,

    #[arg(long, help = "Use strongly consistent reads for the scan")]
    pub consistent_read: bool,

    #[arg(long, help = "Attempts per store call on throttling or transient errors [env: BACKFILL_MAX_ATTEMPTS] [default: 5]")]
    pub max_attempts: Option<usize>,

    #[arg(long, help = "Resume token (JSON) printed by a failed or interrupted run")]
    pub resume_from: Option<String>,

    #[arg(long, help = "Write the JSON report to this file instead of stdout")]
    pub report: Option<String>,
}
