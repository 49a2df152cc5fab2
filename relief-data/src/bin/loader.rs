use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use relief_data::{IncomeLoader, ReceiptLoader};
use relief_db_sqlite::SqliteRepository;

/// Import receipts and yearly income from CSV files into the database.
///
/// Receipts CSV columns: date, description, amount, category, sub_category,
/// status (the last three optional). Income CSV columns: year, employment,
/// dividend, other.
#[derive(Parser, Debug)]
#[command(name = "relief-data-loader")]
#[command(version, about, long_about = None)]
struct Args {
    /// CSV file of receipts to import
    #[arg(short, long)]
    receipts: Option<PathBuf>,

    /// CSV file of yearly income to import
    #[arg(short, long)]
    income: Option<PathBuf>,

    /// SQLite database path or URL; created if missing
    #[arg(short, long, default_value = "relief.db")]
    database: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.receipts.is_none() && args.income.is_none() {
        bail!("nothing to import: pass --receipts and/or --income");
    }

    let repo = SqliteRepository::new(&args.database)
        .await
        .with_context(|| format!("Failed to connect to database: {}", args.database))?;
    repo.run_migrations()
        .await
        .context("Failed to run migrations")?;

    if let Some(path) = &args.receipts {
        println!("Loading receipts from: {}", path.display());

        let file =
            File::open(path).with_context(|| format!("Failed to open: {}", path.display()))?;
        let records = ReceiptLoader::parse(file)
            .with_context(|| format!("Failed to parse CSV: {}", path.display()))?;
        let receipts = ReceiptLoader::to_new_receipts(&records)
            .with_context(|| format!("Invalid receipt in: {}", path.display()))?;

        let created = ReceiptLoader::load(&repo, &receipts)
            .await
            .context("Failed to store receipts")?;
        println!("Imported {created} receipts.");
    }

    if let Some(path) = &args.income {
        println!("Loading income from: {}", path.display());

        let file =
            File::open(path).with_context(|| format!("Failed to open: {}", path.display()))?;
        let records = IncomeLoader::parse(file)
            .with_context(|| format!("Failed to parse CSV: {}", path.display()))?;

        let saved = IncomeLoader::load(&repo, &records)
            .await
            .context("Failed to store income")?;
        println!("Saved income for {saved} year(s).");
    }

    Ok(())
}
