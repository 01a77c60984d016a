//! Command-line driver for the pets store.
//!
//! # Responsibility
//! - Expose resource-path operations (query/insert/update/delete/type) on a
//!   file-backed store.
//! - Print results as JSON so scripts can consume them.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;
use petshelter_core::{
    init_logging, FieldMap, FieldValue, Gender, PetRepository, PetService, ShelterConfig,
    SqlitePetRepository,
};
use serde_json::{json, Value};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "petshelter", version, about = "Query and edit the pet shelter database")]
struct Cli {
    /// Directory holding shelter.db
    #[arg(long, env = "PETSHELTER_DATA_DIR", default_value = ".", global = true)]
    data_dir: PathBuf,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long, env = "PETSHELTER_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    /// Write rolling logs to this directory
    #[arg(long, env = "PETSHELTER_LOG_DIR", global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read rows from /pets or /pets/<id>
    Query(QueryArgs),
    /// Insert one pet into /pets
    Insert(InsertArgs),
    /// Update rows addressed by a path and optional filter
    Update(UpdateArgs),
    /// Delete rows addressed by a path and optional filter
    Delete(DeleteArgs),
    /// Print the content type of a path
    Type { path: String },
    /// Insert the sample pet
    Sample,
    /// Health check
    Ping,
}

#[derive(Args, Debug)]
struct SelectionArgs {
    /// SQL filter with `?` placeholders (ignored for /pets/<id>)
    #[arg(long)]
    filter: Option<String>,

    /// Filter argument, repeatable
    #[arg(long = "arg")]
    args: Vec<String>,
}

#[derive(Args, Debug)]
struct QueryArgs {
    path: String,

    /// Projected column, repeatable; all columns when omitted
    #[arg(long = "column")]
    columns: Vec<String>,

    #[command(flatten)]
    selection: SelectionArgs,

    /// ORDER BY clause
    #[arg(long)]
    sort: Option<String>,
}

#[derive(Args, Debug)]
struct PetFieldArgs {
    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    breed: Option<String>,

    /// unknown|male|female or 0|1|2
    #[arg(long, value_parser = parse_gender)]
    gender: Option<Gender>,

    #[arg(long, allow_negative_numbers = true)]
    weight: Option<i64>,
}

impl PetFieldArgs {
    fn to_fields(&self) -> FieldMap {
        let mut fields = FieldMap::new();
        if let Some(name) = &self.name {
            fields.put("name", name.as_str());
        }
        if let Some(breed) = &self.breed {
            fields.put("breed", breed.as_str());
        }
        if let Some(gender) = self.gender {
            fields.put("gender", gender.as_i64());
        }
        if let Some(weight) = self.weight {
            fields.put("weight", weight);
        }
        fields
    }
}

#[derive(Args, Debug)]
struct InsertArgs {
    #[arg(long, default_value = "/pets")]
    path: String,

    #[command(flatten)]
    fields: PetFieldArgs,
}

#[derive(Args, Debug)]
struct UpdateArgs {
    path: String,

    #[command(flatten)]
    fields: PetFieldArgs,

    #[command(flatten)]
    selection: SelectionArgs,
}

#[derive(Args, Debug)]
struct DeleteArgs {
    path: String,

    #[command(flatten)]
    selection: SelectionArgs,
}

fn parse_gender(value: &str) -> Result<Gender, String> {
    Gender::parse(value).ok_or_else(|| format!("unknown gender `{value}`"))
}

fn filter_values(selection: &SelectionArgs) -> Vec<FieldValue> {
    selection
        .args
        .iter()
        .map(|arg| FieldValue::from(arg.as_str()))
        .collect()
}

fn init_cli_logging(cli: &Cli, config: &ShelterConfig) -> Result<()> {
    let Some(log_dir) = &cli.log_dir else {
        return Ok(());
    };
    let log_dir = if log_dir.is_absolute() {
        log_dir.clone()
    } else {
        std::env::current_dir()
            .context("failed to resolve current directory")?
            .join(log_dir)
    };
    init_logging(&config.log_level, &log_dir).context("failed to initialize logging")?;
    Ok(())
}

fn run(cli: &Cli) -> Result<Value> {
    let mut config = ShelterConfig::new(&cli.data_dir);
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    init_cli_logging(cli, &config)?;

    let db = config.open_store();
    let repo = SqlitePetRepository::new(&db);
    info!(
        "event=cli_command module=cli status=start db_path={}",
        config.db_path().display()
    );

    let output = match &cli.command {
        Command::Query(args) => {
            let columns: Vec<&str> = args.columns.iter().map(String::as_str).collect();
            let cursor = repo
                .query(
                    &args.path,
                    &columns,
                    args.selection.filter.as_deref(),
                    &filter_values(&args.selection),
                    args.sort.as_deref(),
                )
                .with_context(|| format!("query {} failed", args.path))?;
            let rows: Vec<FieldMap> = cursor.map(|row| row.to_field_map()).collect();
            serde_json::to_value(rows)?
        }
        Command::Insert(args) => {
            let id = repo
                .insert(&args.path, &args.fields.to_fields())
                .with_context(|| format!("insert into {} failed", args.path))?;
            json!({ "id": id })
        }
        Command::Update(args) => {
            let changed = repo
                .update(
                    &args.path,
                    &args.fields.to_fields(),
                    args.selection.filter.as_deref(),
                    &filter_values(&args.selection),
                )
                .with_context(|| format!("update {} failed", args.path))?;
            json!({ "changed": changed })
        }
        Command::Delete(args) => {
            let changed = repo
                .delete(
                    &args.path,
                    args.selection.filter.as_deref(),
                    &filter_values(&args.selection),
                )
                .with_context(|| format!("delete {} failed", args.path))?;
            json!({ "changed": changed })
        }
        Command::Type { path } => {
            let kind = repo
                .resource_type(path)
                .with_context(|| format!("type of {path} failed"))?;
            json!({ "content_type": kind.content_type() })
        }
        Command::Sample => {
            let id = PetService::new(repo).insert_sample_pet()?;
            json!({ "id": id })
        }
        Command::Ping => json!({
            "ping": petshelter_core::ping(),
            "version": petshelter_core::core_version(),
        }),
    };

    Ok(output)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = run(&cli)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
