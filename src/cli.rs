use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::RepeatedHeaderPolicy;

#[derive(Debug, Parser)]
#[command(author, version, about = "Ingest self-describing CSV dataset exports", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Parse a dataset export into typed records
    Parse(ParseArgs),
    /// Show the schema inferred from a dataset's header line
    Schema(SchemaArgs),
    /// Print the remote datatable URL for a dataset code
    Source(SourceArgs),
}

#[derive(Debug, Args)]
pub struct ParseArgs {
    /// Input CSV file ('-' reads stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Output file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Symbol stamped on every record
    #[arg(short = 's', long = "symbol", default_value = "")]
    pub symbol: String,
    /// Column to use as the primary value ahead of close, price, settle and value
    #[arg(long = "value-column")]
    pub value_column: Option<String>,
    /// Timestamp used when the dataset has no date column (defaults to now, UTC)
    #[arg(long = "fallback-time", value_parser = parse_fallback_time)]
    pub fallback_time: Option<NaiveDateTime>,
    /// Handling of header lines repeated inside the data
    #[arg(long = "repeated-header")]
    pub repeated_header: Option<RepeatedHeaderPolicy>,
    /// Output format
    #[arg(long, default_value = "jsonl")]
    pub format: OutputFormat,
    /// Stop after emitting this many records
    #[arg(long)]
    pub limit: Option<usize>,
    /// YAML configuration file
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
#[value(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Jsonl,
    Json,
    Table,
    Bincode,
}

#[derive(Debug, Args)]
pub struct SchemaArgs {
    /// Input CSV file ('-' reads stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Column to use as the primary value ahead of the default keywords
    #[arg(long = "value-column")]
    pub value_column: Option<String>,
    /// Emit the schema as YAML instead of a table
    #[arg(long)]
    pub yaml: bool,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Dataset code such as QDL/BCHAIN
    pub code: String,
    /// API key (overrides the config file and NASDAQ_AUTH_TOKEN)
    #[arg(long = "api-key")]
    pub api_key: Option<String>,
    /// YAML configuration file
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}

pub fn parse_fallback_time(value: &str) -> Result<NaiveDateTime, String> {
    let value = value.trim();
    if let Ok(parsed) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Ok(parsed);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| format!("Expected YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS, got '{value}'"))
}
