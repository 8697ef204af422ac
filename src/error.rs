use thiserror::Error;

use crate::schema::DateFormat;

/// Failures raised by the ingestion engine and the source descriptor.
///
/// Line-level errors (`TemporalParse`) reject a single data line and leave the
/// stream usable. Stream-level errors (`SchemaViolation`, `StreamAborted`)
/// stop the stream that raised them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestError {
    #[error("repeated header on stream '{symbol}' rejected; schema is already inferred")]
    SchemaViolation { symbol: String },

    #[error("stream '{symbol}' was aborted by an earlier schema violation")]
    StreamAborted { symbol: String },

    #[error("failed to parse '{value}' in column '{column}' with format {format} (line: {line})")]
    TemporalParse {
        column: String,
        value: String,
        format: DateFormat,
        line: String,
    },

    #[error("no API key configured for the dataset source")]
    MissingApiKey,

    #[error("dataset code cannot be empty")]
    EmptyDatasetCode,
}

impl IngestError {
    /// True when the error rejects a single line and the stream may continue.
    pub fn is_line_level(&self) -> bool {
        matches!(self, IngestError::TemporalParse { .. })
    }
}

pub type IngestResult<T> = std::result::Result<T, IngestError>;
