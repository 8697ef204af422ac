//! Per-symbol ingestion driver.
//!
//! A [`DataStream`] binds one symbol to its own [`SchemaInferer`] and
//! [`RecordParser`]. Lines must be fed in source order: the first becomes the
//! header, the rest become records. Nothing is shared between streams.

use chrono::NaiveDateTime;
use log::{debug, warn};

use crate::{
    config::{RepeatedHeaderPolicy, StreamConfig},
    error::{IngestError, IngestResult},
    parser::RecordParser,
    record::Record,
    schema::{Schema, SchemaInferer},
};

/// Result of feeding one line to a stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// The line was the header; the schema is now inferred.
    Header,
    /// The line repeated the header and was skipped.
    RepeatedHeader,
    Record(Record),
}

impl LineOutcome {
    pub fn into_record(self) -> Option<Record> {
        match self {
            LineOutcome::Record(record) => Some(record),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    pub lines: usize,
    pub records: usize,
    pub rejected: usize,
    pub repeated_headers: usize,
}

#[derive(Debug)]
pub struct DataStream {
    symbol: String,
    config: StreamConfig,
    inferer: SchemaInferer,
    parser: RecordParser,
    delimiter: char,
    aborted: bool,
    stats: StreamStats,
}

impl DataStream {
    pub fn new(symbol: impl Into<String>, config: StreamConfig) -> Self {
        let parser = RecordParser::new(config.value_column.as_deref());
        Self {
            symbol: symbol.into(),
            config,
            inferer: SchemaInferer::new(),
            parser,
            delimiter: ',',
            aborted: false,
            stats: StreamStats::default(),
        }
    }

    /// Splits lines given to [`DataStream::feed_line`] on `delimiter` instead of a comma.
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    pub fn schema(&self) -> Option<&Schema> {
        self.inferer.schema()
    }

    pub fn parser(&self) -> &RecordParser {
        &self.parser
    }

    pub fn stats(&self) -> StreamStats {
        self.stats
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// Name of the field that supplies the primary value, once the schema is known.
    pub fn primary_field(&self) -> Option<&str> {
        self.schema()
            .and_then(|schema| self.parser.keywords().resolve(schema))
    }

    pub fn feed_line(&mut self, line: &str, fallback_time: NaiveDateTime) -> IngestResult<LineOutcome> {
        let line = line.trim_end_matches(['\r', '\n']);
        let tokens = line.split(self.delimiter).collect::<Vec<_>>();
        self.feed(&tokens, fallback_time)
    }

    pub fn feed<S: AsRef<str>>(
        &mut self,
        tokens: &[S],
        fallback_time: NaiveDateTime,
    ) -> IngestResult<LineOutcome> {
        if self.aborted {
            return Err(IngestError::StreamAborted {
                symbol: self.symbol.clone(),
            });
        }
        self.stats.lines += 1;

        let Some(schema) = self.inferer.schema() else {
            let schema = self.inferer.infer(tokens);
            debug!(
                "[{}] header consumed: {} field(s), temporal {:?}",
                self.symbol,
                schema.field_count(),
                schema.temporal_field()
            );
            return Ok(LineOutcome::Header);
        };

        if schema.matches_header(tokens) {
            self.stats.repeated_headers += 1;
            return match self.config.repeated_header {
                RepeatedHeaderPolicy::Ignore => {
                    debug!("[{}] skipping repeated header at line {}", self.symbol, self.stats.lines);
                    Ok(LineOutcome::RepeatedHeader)
                }
                RepeatedHeaderPolicy::Reject => {
                    warn!("[{}] repeated header at line {}; aborting stream", self.symbol, self.stats.lines);
                    self.aborted = true;
                    Err(IngestError::SchemaViolation {
                        symbol: self.symbol.clone(),
                    })
                }
            };
        }

        match self.parser.parse(schema, tokens, &self.symbol, fallback_time) {
            Ok(record) => {
                self.stats.records += 1;
                Ok(LineOutcome::Record(record))
            }
            Err(err) => {
                self.stats.rejected += 1;
                Err(err)
            }
        }
    }
}
