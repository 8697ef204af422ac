pub mod cli;
pub mod config;
pub mod credentials;
pub mod data;
pub mod error;
pub mod ingest;
pub mod io_utils;
pub mod parser;
pub mod record;
pub mod schema;
pub mod schema_cmd;
pub mod source;
pub mod stream;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::{LevelFilter, debug, info};

use crate::{
    cli::{Cli, Commands},
    config::IngestConfig,
    source::DatatableSource,
};

pub use crate::{
    config::{RepeatedHeaderPolicy, StreamConfig},
    data::Value,
    error::IngestError,
    parser::RecordParser,
    record::Record,
    schema::{DateFormat, Schema, SchemaInferer},
    stream::{DataStream, LineOutcome},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("datalink_ingest", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Parse(args) => ingest::execute(&args),
        Commands::Schema(args) => schema_cmd::execute(&args),
        Commands::Source(args) => handle_source(&args),
    }
}

fn handle_source(args: &cli::SourceArgs) -> Result<()> {
    if credentials::init_from_env() {
        debug!("API key loaded from the environment");
    }
    if let Some(path) = &args.config {
        let config = IngestConfig::load(path)?;
        if let Some(token) = &config.auth_token {
            credentials::set_api_key(token);
        }
    }
    if let Some(token) = &args.api_key {
        credentials::set_api_key(token);
    }
    let source = DatatableSource::from_process_credential(&args.code)?;
    println!("{}", source.url());
    info!("Resolved datatable source for '{}'", source.code());
    Ok(())
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        other => (other as char).to_string(),
    }
}
