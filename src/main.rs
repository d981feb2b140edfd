//! Roster CLI - manage employee records from the command line

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use roster::config;
use roster::storage::RecordStore;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "roster")]
#[command(version)]
#[command(about = "Employee records with a runtime-extensible schema")]
#[command(long_about = r#"
Roster keeps employee records (name, department, salary and any extra
columns you add) in a local SQLite database.

Example usage:
  roster add --set name=Ana --set department=Eng --set salary=70000
  roster add-columns "nickname, office"
  roster view --department Eng --min-salary 50000 --csv eng.csv
  roster update --id 2 --set salary=90000
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the database file (overrides the config file)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Emit JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database (and optionally a config file)
    Init {
        /// Also write roster.toml pointing at the database
        #[arg(long)]
        config_file: bool,

        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// List the attributes records currently have
    Columns,

    /// Add free-text attributes to every record
    AddColumns {
        /// Comma-separated attribute names
        names: String,
    },

    /// Add an employee
    Add {
        /// Attribute value, repeatable
        #[arg(short, long = "set", value_name = "FIELD=VALUE")]
        set: Vec<String>,
    },

    /// Update attributes of an employee
    Update {
        /// Employee ID
        #[arg(long)]
        id: i64,

        /// Attribute value, repeatable
        #[arg(short, long = "set", value_name = "FIELD=VALUE")]
        set: Vec<String>,
    },

    /// Delete an employee
    Delete {
        /// Employee ID
        #[arg(long)]
        id: i64,
    },

    /// Show one employee
    Get {
        /// Employee ID
        #[arg(long)]
        id: i64,
    },

    /// View employees, optionally filtered
    View {
        /// Exact department name
        #[arg(long)]
        department: Option<String>,

        /// Minimum salary (inclusive)
        #[arg(long)]
        min_salary: Option<f64>,

        /// Maximum salary (inclusive)
        #[arg(long)]
        max_salary: Option<f64>,

        /// Also write the result set to this CSV file
        #[arg(long, value_name = "FILE")]
        csv: Option<PathBuf>,
    },

    /// Show statistics about the store
    Stats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

impl OutputMode {
    pub fn is_human(self) -> bool {
        self == OutputMode::Human
    }
}

pub fn emit_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("ROSTER_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let output_mode = if cli.json { OutputMode::Json } else { OutputMode::Human };

    let loaded = config::load_config(cli.config.as_deref())?;
    let database = config::resolve_database_path(cli.database, loaded.as_ref());
    config::ensure_db_dir(&database)?;

    // Nothing works without the store, so failing to open it ends the process
    let mut store = RecordStore::open(&database)?;

    let outcome = match cli.command {
        Commands::Init { config_file, force } => {
            let path = cli.config.clone().unwrap_or_else(config::default_config_path);
            commands::run_init(&store, output_mode, config_file.then_some(path.as_path()), force)
        }
        Commands::Columns => commands::run_columns(&store, output_mode),
        Commands::AddColumns { names } => commands::run_add_columns(&mut store, output_mode, &names),
        Commands::Add { set } => commands::run_add(&store, output_mode, &set),
        Commands::Update { id, set } => commands::run_update(&store, output_mode, id, &set),
        Commands::Delete { id } => commands::run_delete(&store, output_mode, id),
        Commands::Get { id } => commands::run_get(&store, output_mode, id),
        Commands::View { department, min_salary, max_salary, csv } => {
            let filter = roster::RecordFilter { department, min_salary, max_salary };
            commands::run_view(&store, output_mode, &filter, csv.as_deref())
        }
        Commands::Stats => commands::run_stats(&store, output_mode),
    };

    let closed = store.close();

    if let Err(e) = settle(outcome, closed) {
        // Store-level failures other than an unusable database are reported, not raised
        match e.downcast_ref::<roster::Error>() {
            Some(err) if !err.is_fatal() => {
                roster::ui::error(&err.to_string());
                std::process::exit(1);
            }
            _ => return Err(e),
        }
    }

    Ok(())
}

/// The command's own error wins; a close failure after it is only logged
fn settle(outcome: anyhow::Result<()>, closed: roster::Result<()>) -> anyhow::Result<()> {
    match (outcome, closed) {
        (Err(e), Err(close_err)) => {
            tracing::error!("Failed to close the database: {}", close_err);
            Err(e)
        }
        (Err(e), Ok(())) => Err(e),
        (Ok(()), closed) => closed.map_err(Into::into),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster::Error;

    fn close_failure() -> roster::Result<()> {
        Err(Error::Io(std::io::Error::other("close failed")))
    }

    #[test]
    fn test_command_error_survives_close_failure() {
        let outcome: anyhow::Result<()> = Err(Error::Validation("Please fill out all fields.".to_string()).into());
        let err = settle(outcome, close_failure()).unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Validation(_))));
    }

    #[test]
    fn test_close_failure_reported_after_success() {
        let err = settle(Ok(()), close_failure()).unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Io(_))));
        assert!(settle(Ok(()), Ok(())).is_ok());
    }
}
