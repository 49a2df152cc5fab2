use std::path::PathBuf;

use anyhow::Context;
use chrono::{Datelike, Local};
use clap::{Parser, Subcommand};
use relief_core::format::parse_amount;
use rust_decimal::Decimal;
use tracing::debug;

use relief_cli::{app, logging, settings::Settings};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Malaysian personal income tax relief tracker.
///
/// Reads receipts, profile and income from the configured database and
/// reports claimable relief and estimated tax for a year of assessment.
#[derive(Debug, Parser)]
struct Cli {
    /// Settings file. Defaults to `relief.toml` in the working directory.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Database backend, overriding the settings file.
    #[arg(long)]
    backend: Option<String>,

    /// Database connection string, overriding the settings file.
    /// For SQLite this is a file path (e.g. `relief.db`) or `:memory:`.
    #[arg(long)]
    db: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Full tax summary with per-category relief.
    Summary {
        #[arg(long)]
        year: Option<i32>,
    },
    /// Per-category relief usage.
    Categories {
        #[arg(long)]
        year: Option<i32>,
    },
    /// Bracket tax and dividend surcharge for a chargeable income.
    Tax {
        /// Chargeable income, e.g. `100000` or `RM 100,000.00`.
        #[arg(long, value_parser = parse_amount)]
        income: Decimal,

        #[arg(long, value_parser = parse_amount, default_value = "0")]
        dividend: Decimal,

        #[arg(long)]
        year: Option<i32>,
    },
    /// Suggests a relief category for a receipt description.
    Suggest {
        #[arg(required = true, num_args = 1..)]
        description: Vec<String>,
    },
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(backend) = cli.backend {
        settings.database.backend = backend;
    }
    if let Some(db) = cli.db {
        settings.database.connection_string = db;
    }

    logging::init_logging(&settings.logging.level, settings.logging.file.as_deref())?;

    let resolve_year = |year: Option<i32>| {
        year.or(settings.default_year)
            .unwrap_or_else(|| Local::now().year())
    };

    match cli.command {
        Command::Summary { year } => {
            let year = resolve_year(year);
            let summary = app::summarize(year, &load(&settings, year).await?);
            println!("{}", app::SummaryReport(&summary));
        }
        Command::Categories { year } => {
            let year = resolve_year(year);
            let summary = app::summarize(year, &load(&settings, year).await?);
            println!("{}", app::CategoryReport(&summary.categories));
        }
        Command::Tax {
            income,
            dividend,
            year,
        } => {
            println!("{}", app::quote_tax(income, dividend, resolve_year(year)));
        }
        Command::Suggest { description } => {
            println!("{}", app::describe_suggestion(&description.join(" ")));
        }
    }

    Ok(())
}

async fn load(
    settings: &Settings,
    year: i32,
) -> anyhow::Result<app::Snapshot> {
    let db_config = settings.db_config();

    debug!("connecting to {} backend", db_config.backend);
    let repo = app::build_registry()
        .create(&db_config)
        .await
        .with_context(|| format!("cannot open database '{}'", db_config.connection_string))?;

    app::load_snapshot(&*repo, year)
        .await
        .with_context(|| format!("cannot load data for {year}"))
}
