//! The `parse` command: drives a [`DataStream`] over a local export and writes
//! the resulting records.

use std::io::{Read, Write};

use anyhow::{Context, Result};
use chrono::{NaiveDateTime, Utc};
use encoding_rs::Encoding;
use itertools::Itertools;
use log::{info, warn};

use crate::{
    cli::{OutputFormat, ParseArgs},
    config::IngestConfig,
    error::IngestError,
    io_utils,
    record::Record,
    stream::{DataStream, LineOutcome, StreamStats},
    table,
};

#[derive(Debug, Default)]
pub struct IngestSummary {
    pub records: Vec<Record>,
    /// `(line number, error)` for every rejected data line.
    pub rejected: Vec<(u64, IngestError)>,
    pub stats: StreamStats,
}

pub fn execute(args: &ParseArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => IngestConfig::load(path)?,
        None => IngestConfig::default(),
    };
    let mut stream_config = config.stream_config(&args.symbol);
    if let Some(column) = &args.value_column {
        stream_config = stream_config.with_value_column(column.clone());
    }
    if let Some(policy) = args.repeated_header {
        stream_config = stream_config.with_repeated_header(policy);
    }

    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let fallback_time = args
        .fallback_time
        .unwrap_or_else(|| Utc::now().naive_utc());
    info!(
        "Parsing '{}' as symbol '{}' (delimiter '{}')",
        args.input.display(),
        args.symbol,
        crate::printable_delimiter(delimiter)
    );

    let mut stream = DataStream::new(args.symbol.clone(), stream_config).with_delimiter(delimiter as char);
    let mut reader = io_utils::open_csv_reader_from_path(&args.input, delimiter)?;
    let summary = ingest_reader(&mut stream, &mut reader, encoding, fallback_time, args.limit)
        .with_context(|| format!("Ingesting {:?}", args.input))?;

    let mut output = io_utils::open_output(args.output.as_deref())?;
    write_records(&mut output, &stream, &summary.records, args.format)?;
    output.flush().context("Flushing output")?;

    info!(
        "Emitted {} record(s); {} line(s) rejected, {} repeated header(s) skipped",
        summary.records.len(),
        summary.rejected.len(),
        summary.stats.repeated_headers
    );
    Ok(())
}

/// Feeds every record of `reader` to `stream`.
///
/// Rejected lines are logged and collected; a stream-level error stops
/// ingestion and is returned.
pub fn ingest_reader<R: Read>(
    stream: &mut DataStream,
    reader: &mut csv::Reader<R>,
    encoding: &'static Encoding,
    fallback_time: NaiveDateTime,
    limit: Option<usize>,
) -> Result<IngestSummary> {
    let mut summary = IngestSummary::default();
    let mut raw = csv::ByteRecord::new();
    let mut ordinal = 0u64;

    while reader
        .read_byte_record(&mut raw)
        .with_context(|| format!("Reading line {}", ordinal + 1))?
    {
        ordinal += 1;
        if limit.is_some_and(|max| summary.records.len() >= max) {
            break;
        }
        let line_number = raw.position().map(|p| p.line()).unwrap_or(ordinal);
        let tokens = io_utils::decode_record(&raw, encoding)
            .with_context(|| format!("Decoding line {line_number}"))?;
        match stream.feed(&tokens, fallback_time) {
            Ok(LineOutcome::Record(record)) => summary.records.push(record),
            Ok(LineOutcome::Header | LineOutcome::RepeatedHeader) => {}
            Err(err) if err.is_line_level() => {
                warn!("Line {line_number} rejected: {err}");
                summary.rejected.push((line_number, err));
            }
            Err(err) => {
                return Err(err).with_context(|| format!("Line {line_number}"));
            }
        }
    }

    summary.stats = stream.stats();
    Ok(summary)
}

pub fn write_records<W: Write>(
    out: &mut W,
    stream: &DataStream,
    records: &[Record],
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Jsonl => {
            for record in records {
                serde_json::to_writer(&mut *out, record).context("Writing JSON record")?;
                writeln!(out)?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, records).context("Writing JSON records")?;
            writeln!(out)?;
        }
        OutputFormat::Table => {
            let (headers, rows) = tabulate(stream, records);
            write!(out, "{}", table::render_table(&headers, &rows))?;
        }
        OutputFormat::Bincode => {
            bincode::serde::encode_into_std_write(records, out, bincode::config::standard())
                .context("Writing binary records")?;
        }
    }
    Ok(())
}

/// Decodes the output of [`OutputFormat::Bincode`].
pub fn decode_bincode_records(bytes: &[u8]) -> Result<Vec<Record>> {
    let (records, _) = bincode::serde::decode_from_slice(bytes, bincode::config::standard())
        .context("Reading binary records")?;
    Ok(records)
}

fn tabulate(stream: &DataStream, records: &[Record]) -> (Vec<String>, Vec<Vec<String>>) {
    let columns = stream
        .schema()
        .map(|schema| {
            schema
                .fields()
                .iter()
                .filter(|name| schema.template().contains_key(*name))
                .unique()
                .cloned()
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    let headers = ["symbol", "time", "value"]
        .into_iter()
        .map(str::to_string)
        .chain(columns.iter().cloned())
        .collect();
    let rows = records
        .iter()
        .map(|record| {
            let mut row = vec![
                record.symbol.clone(),
                record.time.format("%Y-%m-%d %H:%M:%S").to_string(),
                record
                    .value
                    .map(|v| v.normalize().to_string())
                    .unwrap_or_default(),
            ];
            row.extend(
                columns
                    .iter()
                    .map(|name| record.fields.get(name).map(|v| v.to_string()).unwrap_or_default()),
            );
            row
        })
        .collect();
    (headers, rows)
}
