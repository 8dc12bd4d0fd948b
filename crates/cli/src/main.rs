use crate::{
    commands::{BackfillArgs, TableArgs},
    error::CliError,
    shutdown::{ExitCode, ShutdownCoordinator},
};
use clap::Parser;
use commands::Commands;
use connectors::{dynamodb::DynamoDbStore, store::RecordStore};
use engine_core::runner::BackfillRunner;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod commands;
mod env;
mod error;
mod output;
mod settings;
mod shutdown;

#[derive(Parser)]
#[command(
    name = "backfill",
    version,
    about = "Set a missing boolean attribute on every record of a DynamoDB table"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    // Initialize logger
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let shutdown = ShutdownCoordinator::new(CancellationToken::new());
    shutdown.register_handlers();

    let code = match execute(cli.command, &shutdown).await {
        Ok(()) => ExitCode::Success,
        Err(err) if err.is_cancelled() || shutdown.is_shutdown_requested() => {
            warn!(error = %err, "Stopped before completion");
            log_resume_token(&err);
            ExitCode::ShutdownRequested
        }
        Err(err) => {
            error!(error = %err, "Backfill failed");
            log_resume_token(&err);
            ExitCode::GeneralError
        }
    };

    std::process::exit(code.as_i32());
}

async fn execute(command: Commands, shutdown: &ShutdownCoordinator) -> Result<(), CliError> {
    match command {
        Commands::Run { args } => run_backfill(args, false, shutdown).await,
        Commands::Check { args } => run_backfill(args, true, shutdown).await,
        Commands::Ping { table, json } => ping(table, json).await,
    }
}

async fn run_backfill(
    args: BackfillArgs,
    dry_run: bool,
    shutdown: &ShutdownCoordinator,
) -> Result<(), CliError> {
    let env = settings::load_env(args.table.env_file.as_deref())?;
    let store_config = settings::store_config(&args.table, &env)?;
    let config = settings::backfill_config(&args, &env, &store_config, dry_run)?;

    let store = DynamoDbStore::connect(store_config).await;
    let runner = BackfillRunner::new(Arc::new(store), config)
        .with_cancellation(shutdown.cancel_token());

    let report = runner.run().await?;

    match args.report {
        Some(path) => {
            output::write_report(&report, &path).await?;
            info!(path = %path, "Report written");
        }
        None => output::print_report(&report)?,
    }

    Ok(())
}

async fn ping(table: TableArgs, as_json: bool) -> Result<(), CliError> {
    let env = settings::load_env(table.env_file.as_deref())?;
    let store_config = settings::store_config(&table, &env)?;

    info!(table = %store_config.table_name, "Describing table");
    let store = DynamoDbStore::connect(store_config).await;
    let info = store.describe().await?;

    output::print_table_info(&info, as_json)
}

fn log_resume_token(err: &CliError) {
    let Some(cursor) = err.resume_cursor() else {
        return;
    };

    match serde_json::to_string(cursor) {
        Ok(token) => info!(resume_from = %token, "Rerun with --resume-from to continue"),
        Err(e) => warn!(error = %e, "Failed to serialize resume token"),
    }
}
