use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use invoice_data::ClientLoader;
use invoice_db_sqlite::SqliteRepository;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Import clients from a CSV file into the invoice database.
///
/// The CSV file needs a header row with these columns:
/// - name: Display name (required)
/// - email: Contact email, used to detect clients already present (required)
/// - phone, address, company: Optional, may be left blank
#[derive(Parser, Debug)]
#[command(name = "invoice-data-loader")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the CSV file containing client data
    #[arg(short, long)]
    file: PathBuf,

    /// SQLite database URL (e.g., sqlite:invoices.db?mode=rwc to create if missing)
    #[arg(short, long, default_value = "sqlite:invoices.db?mode=rwc")]
    database: String,

    /// Run database migrations before loading data
    #[arg(short, long, default_value_t = false)]
    migrate: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::from("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let repo = SqliteRepository::new(&args.database).await?;

    if args.migrate {
        info!("running migrations");
        repo.run_migrations().await?;
    }

    let file = File::open(&args.file)
        .with_context(|| format!("Failed to open: {}", args.file.display()))?;

    let records = ClientLoader::parse(file)
        .with_context(|| format!("Failed to parse CSV: {}", args.file.display()))?;
    info!(records = records.len(), file = %args.file.display(), "parsed client records");

    let inserted = ClientLoader::load(&repo, &records)
        .await
        .context("Failed to load clients into the database")?;

    info!(
        inserted,
        skipped = records.len() - inserted,
        "client import complete"
    );

    Ok(())
}
