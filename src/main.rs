//! Command-line entry point for the Inshorts harvester.
//!
//! ```sh
//! DATABASE_URL_SQLITE=sqlite:///inshorts.db DATABASE_TABLE_SQLITE=inshorts \
//!     inshorts_harvester harvest
//! ```

use std::error::Error;
use std::io::Write as _;
use std::path::Path;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

use inshorts_harvester::browser::ChromiumLauncher;
use inshorts_harvester::categories::Category;
use inshorts_harvester::cli::{Cli, Command};
use inshorts_harvester::config::HarvestConfig;
use inshorts_harvester::orchestrator::{HarvestOutcome, Harvester};
use inshorts_harvester::outputs;
use inshorts_harvester::storage::{Column, Filter, PersistenceGateway};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let mut config = HarvestConfig::load(args.config.as_deref())?;
    args.apply(&mut config);
    debug!(config = %config.to_yaml()?, "Resolved configuration");

    match &args.command {
        Command::Harvest {
            category,
            no_export,
            ..
        } => harvest(&config, category.clone(), *no_export).await?,
        Command::Show { category } => show(&config, category.as_deref())?,
        Command::Purge { yes } => purge(&config, *yes)?,
        Command::Categories => {
            for category in Category::ALL {
                println!("{:<14} {}", category.key(), category.url());
            }
        }
    }

    let elapsed = start_time.elapsed();
    info!(?elapsed, "Execution complete");
    Ok(())
}

#[instrument(level = "info", skip(config))]
async fn harvest(
    config: &HarvestConfig,
    category: Option<String>,
    no_export: bool,
) -> Result<(), Box<dyn Error>> {
    let key = match category {
        Some(key) => key,
        None => prompt_category().await?,
    };

    let launcher = ChromiumLauncher::new(config.pagination.headless);
    let harvester = Harvester::new(launcher, config)?;
    let report = harvester.run(&key, config.pagination.max_triggers).await?;

    for (i, record) in report.records.iter().enumerate() {
        println!("{:>4}  {:<24} {}", i + 1, record.date, record.title);
    }
    info!(
        category = %report.session.category,
        triggers = report.session.performed_triggers,
        expansion = %report.session.end,
        elapsed = ?report.session.elapsed,
        outcome = %report.outcome,
        "Harvest report"
    );

    if matches!(report.outcome, HarvestOutcome::NothingExtracted) {
        warn!("The page layout was not recognised; see the diagnostics above");
    }

    if !no_export && !report.records.is_empty() {
        let export_dir = Path::new(&config.export_dir);
        if let Err(e) =
            outputs::write_snapshots(&report.records, export_dir, report.session.category.key()).await
        {
            error!(error = %e, path = %export_dir.display(), "Failed to write snapshots");
        }
    }
    Ok(())
}

/// Ask for a category key on stdin.
async fn prompt_category() -> Result<String, Box<dyn Error>> {
    print!("Enter category to scrape ({}): ", Category::known_keys());
    std::io::stdout().flush()?;

    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
    Ok(line.trim().to_string())
}

fn show(config: &HarvestConfig, category: Option<&str>) -> Result<(), Box<dyn Error>> {
    let gateway = PersistenceGateway::open(&config.storage)?;
    gateway.create_table()?;
    let filter = category.map(|c| Filter::Eq(Column::Category, c.to_string()));
    let records = gateway.read_all(filter.as_ref())?;
    gateway.close()?;

    let json = outputs::json::to_json(&records)?;
    println!("{}", String::from_utf8(json)?);
    info!(count = records.len(), "Listed records");
    Ok(())
}

fn purge(config: &HarvestConfig, yes: bool) -> Result<(), Box<dyn Error>> {
    if !yes {
        return Err("refusing to delete every record without --yes".into());
    }
    let mut gateway = PersistenceGateway::open(&config.storage)?;
    gateway.create_table()?;
    let table = gateway.table().to_string();
    let removed = gateway.delete_all()?;
    gateway.close()?;
    println!("Deleted {removed} records from {table}");
    Ok(())
}
