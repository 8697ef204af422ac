//! The `schema` command: infers a schema from the header line and reports the
//! fields, the temporal column and the field that will supply primary values.

use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use log::info;
use serde::Serialize;

use crate::{
    cli::SchemaArgs,
    config::StreamConfig,
    io_utils,
    schema::DateFormat,
    stream::DataStream,
    table,
};

#[derive(Debug, Serialize)]
pub struct SchemaReport {
    pub fields: Vec<String>,
    pub temporal: Option<TemporalReport>,
    pub primary_field: Option<String>,
    pub value_keywords: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct TemporalReport {
    pub field: String,
    pub index: usize,
    pub format: DateFormat,
    pub pattern: String,
}

pub fn execute(args: &SchemaArgs) -> Result<()> {
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let mut reader = io_utils::open_csv_reader_from_path(&args.input, delimiter)?;

    let mut header = csv::ByteRecord::new();
    if !reader
        .read_byte_record(&mut header)
        .context("Reading header line")?
    {
        return Err(anyhow!("Input {:?} has no header line", args.input));
    }
    let tokens = io_utils::decode_record(&header, encoding)?;

    let mut config = StreamConfig::default();
    if let Some(column) = &args.value_column {
        config = config.with_value_column(column.clone());
    }
    let mut stream = DataStream::new("", config);
    stream.feed(&tokens, Utc::now().naive_utc())?;
    let report = build_report(&stream).ok_or_else(|| anyhow!("Schema was not inferred"))?;

    if args.yaml {
        print!("{}", serde_yaml::to_string(&report).context("Rendering schema YAML")?);
    } else {
        print_report(&report);
    }
    info!(
        "Inferred {} field(s) from {:?}",
        report.fields.len(),
        args.input
    );
    Ok(())
}

pub fn build_report(stream: &DataStream) -> Option<SchemaReport> {
    let schema = stream.schema()?;
    let temporal = schema.temporal().map(|column| TemporalReport {
        field: schema.fields()[column.index].clone(),
        index: column.index,
        format: column.format,
        pattern: column.format.pattern().to_string(),
    });
    Some(SchemaReport {
        fields: schema.fields().to_vec(),
        temporal,
        primary_field: stream.primary_field().map(str::to_string),
        value_keywords: stream.parser().keywords().as_slice().to_vec(),
    })
}

fn print_report(report: &SchemaReport) {
    let rows = report
        .fields
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let role = match &report.temporal {
                Some(t) if t.index == idx => format!("time ({})", t.pattern),
                _ if report.primary_field.as_deref() == Some(name.as_str()) => "value".to_string(),
                _ => String::new(),
            };
            vec![(idx + 1).to_string(), name.clone(), role]
        })
        .collect::<Vec<_>>();
    let headers = vec!["#".to_string(), "field".to_string(), "role".to_string()];
    table::print_table(&headers, &rows);
}
