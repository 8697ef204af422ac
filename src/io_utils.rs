//! Local I/O for the CLI: input readers, decoding and output sinks.
//!
//! The engine itself never performs I/O. This module plays the fetch
//! collaborator for local files and stdin (`-`): it reads delimited records
//! with the `csv` crate, decodes them with `encoding_rs`, and hands raw tokens
//! to a stream. Headers are not interpreted here; the stream infers them.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use encoding_rs::{Encoding, UTF_8};

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    match label {
        Some(value) => Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'")),
        None => Ok(UTF_8),
    }
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    })
}

/// Records are read without header handling and with a variable field count:
/// short and long data lines are resolved against the schema downstream.
pub fn open_csv_reader<R>(reader: R, delimiter: u8) -> csv::Reader<R>
where
    R: Read,
{
    csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true)
        .from_reader(reader)
}

pub fn open_csv_reader_from_path(path: &Path, delimiter: u8) -> Result<csv::Reader<Box<dyn Read>>> {
    let reader: Box<dyn Read> = if is_dash(path) {
        Box::new(std::io::stdin().lock())
    } else {
        Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Opening input file {path:?}"))?,
        ))
    };
    Ok(open_csv_reader(reader, delimiter))
}

pub fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(p) if !is_dash(p) => Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("Creating output file {p:?}"))?,
        )),
        _ => Box::new(std::io::stdout().lock()),
    })
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(anyhow!(
            "Failed to decode text with encoding {}",
            encoding.name()
        ))
    } else {
        Ok(text.into_owned())
    }
}

pub fn decode_record(record: &csv::ByteRecord, encoding: &'static Encoding) -> Result<Vec<String>> {
    record
        .iter()
        .map(|field| decode_bytes(field, encoding))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::WINDOWS_1252;
    use std::path::PathBuf;

    #[test]
    fn delimiter_follows_extension_unless_provided() {
        assert_eq!(resolve_input_delimiter(&PathBuf::from("a.tsv"), None), b'\t');
        assert_eq!(resolve_input_delimiter(&PathBuf::from("a.csv"), None), b',');
        assert_eq!(resolve_input_delimiter(&PathBuf::from("a.tsv"), Some(b';')), b';');
    }

    #[test]
    fn flexible_reader_accepts_ragged_rows() {
        let mut reader = open_csv_reader("date,value\n2024-04-30\n2024-05-31,1,extra\n".as_bytes(), b',');
        let lengths = reader
            .byte_records()
            .map(|r| r.unwrap().len())
            .collect::<Vec<_>>();
        assert_eq!(lengths, vec![2, 1, 3]);
    }

    #[test]
    fn decode_record_honors_encoding() {
        let (encoded, _, _) = WINDOWS_1252.encode("Caf\u{e9}");
        let record = csv::ByteRecord::from(vec![&encoded[..]]);
        let decoded = decode_record(&record, resolve_encoding(Some("windows-1252")).unwrap()).unwrap();
        assert_eq!(decoded, vec!["Caf\u{e9}".to_string()]);
        assert!(resolve_encoding(Some("no-such-encoding")).is_err());
    }
}
