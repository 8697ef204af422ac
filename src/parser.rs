//! Data-line parsing against an inferred [`Schema`].
//!
//! Each data line is split positionally. The temporal column is parsed with the
//! schema's [`DateFormat`](crate::schema::DateFormat) and a failure rejects the
//! line. Every other non-empty token becomes a number when it parses as a
//! decimal and text otherwise; empty and missing tokens keep the zero default.
//!
//! The primary value comes from the first entry of [`ValueKeywords`] that names
//! one of the schema's fields. Only numeric fields qualify.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use itertools::Itertools;
use log::debug;
use rust_decimal::Decimal;

use crate::{
    data::{Value, normalize_field_name},
    error::{IngestError, IngestResult},
    record::Record,
    schema::Schema,
};

pub const DEFAULT_VALUE_KEYWORDS: &[&str] = &["close", "price", "settle", "value"];

/// Ordered primary-value keywords, highest priority first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueKeywords {
    keywords: Vec<String>,
}

impl ValueKeywords {
    /// Builds the list with `value_column` (trimmed, lower-cased) at priority 0.
    /// A blank name is treated as absent.
    pub fn new(value_column: Option<&str>) -> Self {
        let custom = value_column
            .map(normalize_field_name)
            .filter(|name| !name.is_empty());
        let keywords = custom
            .into_iter()
            .chain(DEFAULT_VALUE_KEYWORDS.iter().map(|k| k.to_string()))
            .unique()
            .collect();
        Self { keywords }
    }

    pub fn as_slice(&self) -> &[String] {
        &self.keywords
    }

    /// First keyword, in priority order, that is also a schema field.
    pub fn resolve<'a>(&'a self, schema: &Schema) -> Option<&'a str> {
        self.keywords
            .iter()
            .find(|keyword| schema.contains(keyword))
            .map(String::as_str)
    }
}

impl Default for ValueKeywords {
    fn default() -> Self {
        Self::new(None)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecordParser {
    keywords: ValueKeywords,
}

impl RecordParser {
    pub fn new(value_column: Option<&str>) -> Self {
        Self {
            keywords: ValueKeywords::new(value_column),
        }
    }

    pub fn keywords(&self) -> &ValueKeywords {
        &self.keywords
    }

    pub fn parse<S: AsRef<str>>(
        &self,
        schema: &Schema,
        tokens: &[S],
        symbol: &str,
        fallback_time: NaiveDateTime,
    ) -> IngestResult<Record> {
        let mut fields = schema.template().clone();
        let mut time = fallback_time;
        let temporal = schema.temporal();

        for (index, (name, token)) in schema.fields().iter().zip(tokens).enumerate() {
            let raw = token.as_ref();
            if raw.is_empty() {
                continue;
            }
            match temporal {
                Some(column) if column.index == index => {
                    time = column
                        .format
                        .parse(raw)
                        .ok_or_else(|| IngestError::TemporalParse {
                            column: name.clone(),
                            value: raw.to_string(),
                            format: column.format,
                            line: tokens.iter().map(|t| t.as_ref()).join(","),
                        })?;
                }
                _ => {
                    fields.insert(name.clone(), Value::from_token(raw));
                }
            }
        }

        let value = self.primary_value(schema, &fields);
        Ok(Record {
            symbol: symbol.to_string(),
            time,
            fields,
            value,
        })
    }

    fn primary_value(
        &self,
        schema: &Schema,
        fields: &BTreeMap<String, Value>,
    ) -> Option<Decimal> {
        let name = self.keywords.resolve(schema)?;
        match fields.get(name) {
            Some(Value::Number(number)) => Some(*number),
            Some(other) => {
                debug!("Primary value field '{name}' is not numeric: {other:?}");
                None
            }
            None => {
                debug!("Primary value field '{name}' is the temporal column");
                None
            }
        }
    }
}
