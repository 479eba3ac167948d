//! Ivy CLI - IV medication and extravasation management reference

use clap::{Parser, Subcommand};
use ivy::config::{self, IvyConfig};
use ivy::storage::SqliteStore;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "ivy")]
#[command(version)]
#[command(about = "Evidence-based IV medication and extravasation management reference")]
#[command(long_about = r#"
Ivy keeps IV medication guidance in a local SQLite database:
  • Line requirements (central, peripheral, midline)
  • Extravasation risk and management
  • Antidotes with preparation and administration notes
  • Supporting references

Example usage:
  ivy init
  ivy import medications.json
  ivy search vinc
  ivy show <id>
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the database file (overrides the config)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Emit JSON instead of human-readable output
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a config file and create the database
    Init {
        /// Overwrite an existing config
        #[arg(short, long)]
        force: bool,
    },

    /// Import medication records from a JSON file
    Import {
        /// JSON array of medication records
        file: PathBuf,
    },

    /// List medications by name
    List {
        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<usize>,

        /// Number of medications to skip
        #[arg(short, long, default_value = "0")]
        offset: usize,
    },

    /// Search medications by name, brand, class or indication
    Search {
        /// Search text (case-insensitive substring)
        query: String,

        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show a medication with its antidotes and references
    Show {
        /// Medication id
        id: String,

        /// Show the full record even when it is not free
        #[arg(short, long)]
        subscriber: bool,
    },

    /// Show statistics about the database
    Stats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

impl OutputMode {
    pub fn is_human(&self) -> bool {
        matches!(self, OutputMode::Human)
    }
}

/// Print a JSON envelope for machine consumers
pub fn emit_success(output_mode: OutputMode, command: &str, data: serde_json::Value) -> anyhow::Result<()> {
    if output_mode.is_human() {
        return Ok(());
    }
    let envelope = serde_json::json!({
        "ok": true,
        "command": command,
        "data": data,
    });
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(())
}

/// Resolve the database from `--database`, then the config file
fn open_store(database: Option<&Path>, config: &IvyConfig) -> anyhow::Result<SqliteStore> {
    let mut config = config.clone();
    if let Some(path) = database {
        config.database = Some(path.to_string_lossy().to_string());
    }
    if let Some(path) = config.database.as_deref() {
        config::ensure_db_dir(Path::new(path))?;
    }
    SqliteStore::from_config(&config)
        .map_err(|e| anyhow::anyhow!("{} (run `ivy init` or pass --database)", e))
}

/// Default log level; import progress is reported at `info`
fn log_directive(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "info" }
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::new(log_directive(cli.verbose)))
        .init();

    if let Err(e) = run(cli) {
        ivy::ui::error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let output_mode = if cli.json { OutputMode::Json } else { OutputMode::Human };
    let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);
    let config = config::load_config(Some(&config_path))?.unwrap_or_default();

    match cli.command {
        Commands::Init { force } => {
            let database = cli.database.unwrap_or_else(config::default_database_path);
            commands::run_init(output_mode, &config_path, &database, force)?;
        }

        Commands::Import { file } => {
            let store = open_store(cli.database.as_deref(), &config)?;
            commands::run_import(output_mode, &store, &file)?;
        }

        Commands::List { limit, offset } => {
            let store = open_store(cli.database.as_deref(), &config)?;
            let limit = limit.unwrap_or_else(|| config.list_limit());
            commands::run_list(output_mode, &store, limit, offset)?;
        }

        Commands::Search { query, limit } => {
            let store = open_store(cli.database.as_deref(), &config)?;
            let limit = limit.unwrap_or_else(|| config.search_limit());
            commands::run_search(output_mode, &store, &query, limit)?;
        }

        Commands::Show { id, subscriber } => {
            let store = open_store(cli.database.as_deref(), &config)?;
            commands::run_show(output_mode, &store, &id, subscriber)?;
        }

        Commands::Stats => {
            let store = open_store(cli.database.as_deref(), &config)?;
            commands::run_stats(output_mode, &store)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_directive() {
        assert_eq!(log_directive(false), "info");
        assert_eq!(log_directive(true), "debug");
    }

    #[test]
    fn test_cli_parses_global_flags() {
        let cli = Cli::try_parse_from(["ivy", "--json", "show", "m1", "--subscriber"]).unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Show { ref id, subscriber: true } if id == "m1"));
    }
}
