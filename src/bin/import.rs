//! CLI for the legacy spreadsheet importers. Feed it CSV exports of the
//! requisition and engine-shelf sheets.

use std::fs::File;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;
use uuid::Uuid;

use aerostock_api as api;

#[derive(Parser)]
#[command(
    name = "aerostock-import",
    about = "Import legacy spreadsheet data into the inventory database"
)]
struct Cli {
    /// Actor id recorded on every created row
    #[arg(long)]
    actor: Option<Uuid>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import a CSV export of the requisition sheet (orders and line items)
    Requisitions {
        /// Path to the CSV file
        #[arg(long)]
        file: PathBuf,
    },
    /// Import a CSV export of the engine kanban shelf sheet
    EngineShelf {
        /// Path to the CSV file
        #[arg(long)]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cfg = api::config::load_config()?;
    api::config::init_tracing(cfg.log_level(), cfg.log_json);

    let db = api::db::establish_connection(&cfg).await?;
    api::db::run_migrations(&db).await?;

    match cli.command {
        Command::Requisitions { file } => {
            let reader = File::open(&file)?;
            let report = api::import::import_requisitions(&db, cli.actor, reader).await?;
            info!(
                created_orders = report.created_orders,
                updated_orders = report.updated_orders,
                created_items = report.created_items,
                skipped_rows = report.skipped_rows,
                row_errors = report.row_errors,
                "requisition import done"
            );
            println!(
                "orders created: {}, orders updated: {}, lines created: {}, skipped: {}, errors: {}",
                report.created_orders,
                report.updated_orders,
                report.created_items,
                report.skipped_rows,
                report.row_errors
            );
        }
        Command::EngineShelf { file } => {
            let reader = File::open(&file)?;
            let report = api::import::import_engine_shelf(&db, cli.actor, reader).await?;
            info!(
                created_items = report.created_items,
                created_inventory = report.created_inventory,
                skipped_rows = report.skipped_rows,
                row_errors = report.row_errors,
                "engine shelf import done"
            );
            println!(
                "items created: {}, inventory rows created: {}, skipped: {}, errors: {}",
                report.created_items,
                report.created_inventory,
                report.skipped_rows,
                report.row_errors
            );
        }
    }

    Ok(())
}
