//! Command-line interface definitions.
//!
//! Storage settings can be given as flags or through the
//! `DATABASE_URL_SQLITE` / `DATABASE_TABLE_SQLITE` environment variables;
//! either way they override the YAML config file.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::HarvestConfig;

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Prompt for a category, click "load more" up to 10 times
/// inshorts_harvester --database sqlite:///inshorts.db --table inshorts harvest
///
/// # Non-interactive, smaller budget, no file snapshots
/// inshorts_harvester harvest sports --triggers 3 --no-export
///
/// # Inspect what is stored
/// inshorts_harvester show --category sports
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub storage: StorageArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug)]
pub struct StorageArgs {
    /// SQLite database path or sqlite:/// URL
    #[arg(long, env = "DATABASE_URL_SQLITE", global = true)]
    pub database: Option<String>,

    /// Table holding harvested records
    #[arg(long, env = "DATABASE_TABLE_SQLITE", global = true)]
    pub table: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Expand a category page, extract its articles and store them
    Harvest {
        /// Category key; prompted for when omitted
        category: Option<String>,

        /// Maximum number of "load more" activations
        #[arg(short, long)]
        triggers: Option<usize>,

        /// Directory for CSV and JSON snapshots
        #[arg(short, long)]
        export_dir: Option<String>,

        /// Skip the CSV and JSON snapshots
        #[arg(long)]
        no_export: bool,

        /// Show the browser window
        #[arg(long)]
        headed: bool,
    },
    /// Print stored records as JSON
    Show {
        /// Only records of this category label
        #[arg(long)]
        category: Option<String>,
    },
    /// Delete every stored record
    Purge {
        /// Confirm the irreversible delete
        #[arg(long)]
        yes: bool,
    },
    /// List known category keys
    Categories,
}

impl Cli {
    /// Fold flag values over a loaded config.
    pub fn apply(&self, config: &mut HarvestConfig) {
        if let Some(database) = &self.storage.database {
            config.storage.database = Some(database.clone());
        }
        if let Some(table) = &self.storage.table {
            config.storage.table = Some(table.clone());
        }
        if let Command::Harvest {
            triggers,
            export_dir,
            headed,
            ..
        } = &self.command
        {
            if let Some(triggers) = triggers {
                config.pagination.max_triggers = *triggers;
            }
            if let Some(export_dir) = export_dir {
                config.export_dir = export_dir.clone();
            }
            if *headed {
                config.pagination.headless = false;
            }
        }
    }
}
