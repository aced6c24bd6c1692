//! CLI - Command Line Interface
//!
//! Thin wrapper: builds a `StoreConfig`, opens file storage, runs one
//! operation, prints the result.
//!
//! Configuration precedence (lowest first):
//! - `--config <yaml>`
//! - `JSONDB_PATH` / `JSONDB_INDENT`
//! - `--db` / `--indent`
//!
//! Field arguments are `key=value`; a value that parses as JSON is stored as
//! that JSON value (`age=30`, `ok=true`, `tags=["a"]`), anything else as a
//! string.

use clap::{Args, Parser, Subcommand, ValueEnum};
use jsondb_core::{into_record, Record, StoreConfig, StoreError, Value};
use jsondb_storage::{create_file_storage, Storage};
use serde::Serialize;
use std::fmt::Display;
use std::io::Write;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// CLI Errors
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Invalid field '{0}': expected key=value")]
    InvalidField(String),

    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Indented JSON
    #[default]
    Pretty,
    /// Single-line JSON
    Compact,
}

/// JsonDB CLI
#[derive(Parser, Debug)]
#[command(name = "jsondb")]
#[command(author, version, about = "Use a JSON file as a database", long_about = None)]
pub struct Cli {
    /// Database file
    #[arg(short, long, global = true)]
    pub(crate) db: Option<PathBuf>,

    /// YAML configuration file
    #[arg(short, long, global = true)]
    pub(crate) config: Option<PathBuf>,

    /// Indent width for written files
    #[arg(long, global = true)]
    pub(crate) indent: Option<usize>,

    /// Verbose output (debug logs on stderr)
    #[arg(short, long, global = true)]
    pub(crate) verbose: bool,

    /// Output format for JSON results
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Pretty)]
    pub(crate) output: OutputFormat,

    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a table if it does not exist
    CreateTable { table: String },

    /// Append a record to a table
    Add {
        table: String,
        #[command(flatten)]
        fields: FieldArgs,
    },

    /// Delete the record at an index
    Delete { table: String, index: usize },

    /// Merge fields into the record at an index
    Update {
        table: String,
        index: usize,
        #[command(flatten)]
        fields: FieldArgs,
    },

    /// Set KEY to NEW on the first record where KEY equals OLD
    UpdateWhere {
        table: String,
        key: String,
        old: String,
        new: String,
    },

    /// Print a table's records
    Get { table: String },

    /// Check whether a record with these fields exists
    Exists {
        table: String,
        #[command(flatten)]
        fields: FieldArgs,
    },

    /// Find records in every table where KEY equals VALUE
    Find { key: String, value: String },

    /// Remove every record from a table
    Clear { table: String },

    /// Print the whole document
    Dump,

    /// List table names
    Tables,

    /// Reset the document to {}
    ClearAll,

    /// Delete the database file
    Destroy,
}

#[derive(Args, Debug, Default)]
pub struct FieldArgs {
    /// Fields as a JSON object
    #[arg(long)]
    pub json: Option<String>,

    /// Fields as key=value pairs
    pub fields: Vec<String>,
}

/// Parse CLI arguments and execute the command
pub async fn run_cli() -> Result<(), CliError> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = build_config(&cli)?;
    debug!("Using database: {:?}", config.path);

    let storage = create_file_storage(config).await?;
    let mut stdout = std::io::stdout();
    execute(cli.command, storage.as_ref(), cli.output, &mut stdout).await
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub(crate) fn build_config(cli: &Cli) -> Result<StoreConfig, CliError> {
    let base = match &cli.config {
        Some(path) => StoreConfig::from_yaml_file(path)?,
        None => StoreConfig::default(),
    };
    let mut config = base.apply_env()?;
    if let Some(db) = &cli.db {
        config.path = db.clone();
    }
    if let Some(indent) = cli.indent {
        config.indent = indent;
    }
    config.validate()?;
    Ok(config)
}

/// Run one command against `storage`, writing results to `out`.
pub async fn execute(
    command: Commands,
    storage: &dyn Storage,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    match command {
        Commands::CreateTable { table } => {
            storage.create_table(&table).await?;
            writeln!(out, "Table '{}' is ready", table)?;
        }
        Commands::Add { table, fields } => {
            let record = parse_fields(&fields)?;
            storage.add_record(&table, record).await?;
            writeln!(out, "Record added to table '{}'", table)?;
        }
        Commands::Delete { table, index } => {
            print_status(out, storage.delete_record(&table, index).await)?;
        }
        Commands::Update { table, index, fields } => {
            let record = parse_fields(&fields)?;
            print_status(out, storage.update_record(&table, index, record).await)?;
        }
        Commands::UpdateWhere { table, key, old, new } => {
            storage
                .update_where(&table, &key, parse_value(&old), parse_value(&new))
                .await?;
            writeln!(out, "Updated '{}' in table '{}'", key, table)?;
        }
        Commands::Get { table } => {
            let records = storage.get_table(&table).await?;
            print_json(out, &records, format)?;
        }
        Commands::Exists { table, fields } => {
            let record = parse_fields(&fields)?;
            let found = storage.record_exists(&table, record).await?;
            writeln!(out, "{}", found)?;
        }
        Commands::Find { key, value } => {
            let records = storage.find_by_field(&key, parse_value(&value)).await?;
            print_json(out, &records, format)?;
        }
        Commands::Clear { table } => {
            print_status(out, storage.clear_table(&table).await)?;
        }
        Commands::Dump => {
            let document = storage.get_all().await?;
            print_json(out, &document, format)?;
        }
        Commands::Tables => {
            for name in storage.table_names().await? {
                writeln!(out, "{}", name)?;
            }
        }
        Commands::ClearAll => {
            storage.clear_all().await?;
            writeln!(out, "All tables deleted")?;
        }
        Commands::Destroy => {
            storage.destroy().await?;
            writeln!(out, "Database deleted")?;
        }
    }
    Ok(())
}

/// Print the confirmation of a mutation; a failed one is returned as the error.
fn print_status<T: Display>(
    out: &mut dyn Write,
    result: jsondb_core::Result<T>,
) -> Result<(), CliError> {
    let (message, ok) = StoreError::status(&result);
    if !ok {
        debug!("Mutation failed: {}", message);
    }
    result?;
    writeln!(out, "{}", message)?;
    Ok(())
}

fn print_json<T: Serialize>(out: &mut dyn Write, value: &T, format: OutputFormat) -> Result<(), CliError> {
    let text = match format {
        OutputFormat::Pretty => serde_json::to_string_pretty(value),
        OutputFormat::Compact => serde_json::to_string(value),
    }
    .map_err(StoreError::from)?;
    writeln!(out, "{}", text)?;
    Ok(())
}

/// A JSON literal if `raw` parses as one, otherwise the raw string.
pub(crate) fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Build a record from `--json` then `key=value` pairs; pairs win on conflict.
pub(crate) fn parse_fields(args: &FieldArgs) -> Result<Record, CliError> {
    let mut record = match &args.json {
        Some(text) => {
            let value: Value =
                serde_json::from_str(text).map_err(|e| CliError::InvalidJson(e.to_string()))?;
            into_record(value)?
        }
        None => Record::new(),
    };

    for pair in &args.fields {
        let (key, raw) = pair
            .split_once('=')
            .filter(|(key, _)| !key.is_empty())
            .ok_or_else(|| CliError::InvalidField(pair.clone()))?;
        record.insert(key.to_string(), parse_value(raw));
    }
    Ok(record)
}
