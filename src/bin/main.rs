//! jaql CLI - inspect JAQL filters, relations and NLQ translations
//!
//! Usage:
//!   jaql classify <item.json>
//!   jaql filter <item.json>
//!   jaql translate <query.json> --schema <schema.json>
//!   jaql relations <query.json>
//!
//! Examples:
//!   jaql classify demos/top10.json
//!   jaql relations demos/relations_query.json
//!   jaql translate demos/nlq_query.json --schema demos/ecommerce_schema.json

use clap::{Parser, Subcommand};
use jaql_model::config::{LoggingSettings, Settings};
use jaql_model::jaql::{JaqlQuery, MetadataItem};
use jaql_model::model::filter::{classify, extract_filter_type, filter_from_metadata_item};
use jaql_model::nlq::{translate_query_str, DataSchema};
use jaql_model::query::QueryDescription;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;

#[derive(Parser)]
#[command(name = "jaql")]
#[command(about = "jaql - inspect JAQL filters, relations and NLQ translations")]
#[command(version)]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the filter type and condition type of a metadata item
    Classify {
        /// Path to a JSON metadata item ({jaql: {...}})
        file: PathBuf,
    },

    /// Parse a metadata item into a typed filter and print its JAQL
    Filter {
        /// Path to a JSON metadata item ({jaql: {...}})
        file: PathBuf,
    },

    /// Translate NLQ query JSON into a JAQL query
    Translate {
        /// Path to the NLQ query JSON
        file: PathBuf,

        /// Path to the data source schema JSON
        #[arg(short, long)]
        schema: PathBuf,
    },

    /// Validate the filter relations of a JAQL query and print leaf order
    Relations {
        /// Path to a JAQL query JSON
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match Settings::load() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading settings: {}", e);
            return ExitCode::FAILURE;
        }
    };
    init_logging(&settings.logging, cli.json_logs);

    match cli.command {
        Commands::Classify { file } => cmd_classify(&file),
        Commands::Filter { file } => cmd_filter(&file),
        Commands::Translate { file, schema } => cmd_translate(&file, &schema),
        Commands::Relations { file } => cmd_relations(&file),
    }
}

fn init_logging(logging: &LoggingSettings, force_json: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let env_filter = EnvFilter::try_from_env("JAQL_LOG")
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let fmt_layer = if logging.json || force_json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ExitCode> {
    let source = fs::read_to_string(path).map_err(|e| {
        eprintln!("Error reading file '{}': {}", path.display(), e);
        ExitCode::FAILURE
    })?;
    serde_json::from_str(&source).map_err(|e| {
        eprintln!("Error parsing '{}': {}", path.display(), e);
        ExitCode::FAILURE
    })
}

fn print_json<T: serde::Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(text) => {
            println!("{}", text);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_classify(file: &Path) -> ExitCode {
    let item: MetadataItem = match read_json(file) {
        Ok(item) => item,
        Err(code) => return code,
    };

    let Some(filter) = &item.jaql.filter else {
        println!("filter type: includeAll");
        println!("condition:   none");
        return ExitCode::SUCCESS;
    };

    let filter_type = extract_filter_type(filter, item.jaql.datatype);
    let condition = classify(filter);
    debug!(file = %file.display(), "classified filter");
    println!("filter type: {}", filter_type.as_str());
    println!("condition:   {}", condition.as_str());
    ExitCode::SUCCESS
}

fn cmd_filter(file: &Path) -> ExitCode {
    let item: MetadataItem = match read_json(file) {
        Ok(item) => item,
        Err(code) => return code,
    };

    let filter = filter_from_metadata_item(&item);
    println!("-- {} filter ({})", filter.type_name(), filter.guid());
    print_json(&filter.metadata_items())
}

fn cmd_translate(file: &Path, schema: &Path) -> ExitCode {
    let schema: DataSchema = match read_json(schema) {
        Ok(schema) => schema,
        Err(code) => return code,
    };
    let source = match fs::read_to_string(file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", file.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let result = match translate_query_str(&source, &schema) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error parsing '{}': {}", file.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let code = print_json(&result);
    if result.is_success() {
        code
    } else {
        ExitCode::FAILURE
    }
}

fn cmd_relations(file: &Path) -> ExitCode {
    let jaql: JaqlQuery = match read_json(file) {
        Ok(jaql) => jaql,
        Err(code) => return code,
    };

    let query = match QueryDescription::from_jaql(&jaql) {
        Ok(query) => query,
        Err(e) => {
            eprintln!("Invalid relations: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match &query.filter_relations {
        Some(relations) => {
            println!("OK: {} filters related", relations.guids().len());
            for guid in relations.guids() {
                let kind = query
                    .filters
                    .iter()
                    .find(|f| f.guid() == guid)
                    .map(|f| f.type_name())
                    .unwrap_or("?");
                println!("  - {} ({})", guid, kind);
            }
        }
        None => println!("OK: {} filters, all ANDed", query.filters.len()),
    }
    ExitCode::SUCCESS
}
