//! Header-driven schema inference.
//!
//! A stream's first line is its header. [`SchemaInferer`] turns that line into
//! a [`Schema`]: the ordered, normalized field names, the temporal column (the
//! first header token matching `date`, `year` or `report_month`) with its
//! [`DateFormat`], and a zero-valued field template cloned for every record.
//!
//! Inference happens once. Later calls leave the schema untouched.

use std::{collections::BTreeMap, fmt};

use chrono::{NaiveDate, NaiveDateTime};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::data::{Value, normalize_field_name};

const TEMPORAL_KEYWORDS: &[(&str, DateFormat)] = &[
    ("date", DateFormat::FullDate),
    ("year", DateFormat::Year),
    ("report_month", DateFormat::YearMonth),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateFormat {
    /// `2021-12-02`
    FullDate,
    /// `2018`, resolved to January 1st.
    Year,
    /// `2024-02`, resolved to the first day of the month.
    YearMonth,
}

impl DateFormat {
    /// Looks up the format bound to a header token, ignoring case.
    pub fn for_header(token: &str) -> Option<Self> {
        let lowered = token.to_lowercase();
        TEMPORAL_KEYWORDS
            .iter()
            .find(|(keyword, _)| *keyword == lowered)
            .map(|(_, format)| *format)
    }

    pub fn pattern(&self) -> &'static str {
        match self {
            DateFormat::FullDate => "%Y-%m-%d",
            DateFormat::Year => "%Y",
            DateFormat::YearMonth => "%Y-%m",
        }
    }

    /// Parses `raw` strictly against this format: zero-padded digits in the
    /// exact layout, no sign and no surrounding whitespace. Midnight is used
    /// for the time.
    pub fn parse(&self, raw: &str) -> Option<NaiveDateTime> {
        let date = match self {
            DateFormat::FullDate => {
                let [year, month, day] = digit_groups(raw, &[4, 2, 2])?;
                NaiveDate::from_ymd_opt(year as i32, month, day)?
            }
            DateFormat::Year => {
                let [year] = digit_groups(raw, &[4])?;
                NaiveDate::from_ymd_opt(year as i32, 1, 1)?
            }
            DateFormat::YearMonth => {
                let [year, month] = digit_groups(raw, &[4, 2])?;
                NaiveDate::from_ymd_opt(year as i32, month, 1)?
            }
        };
        date.and_hms_opt(0, 0, 0)
    }
}

/// Splits `raw` on `-` into groups of exactly `widths` ASCII digits.
fn digit_groups<const N: usize>(raw: &str, widths: &[usize; N]) -> Option<[u32; N]> {
    let mut groups = [0u32; N];
    let mut parts = raw.split('-');
    for (slot, width) in groups.iter_mut().zip(widths) {
        let part = parts.next()?;
        if part.len() != *width || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *slot = part.parse().ok()?;
    }
    parts.next().is_none().then_some(groups)
}

impl fmt::Display for DateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.pattern())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalColumn {
    pub index: usize,
    pub format: DateFormat,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schema {
    fields: Vec<String>,
    temporal: Option<TemporalColumn>,
    #[serde(skip)]
    template: BTreeMap<String, Value>,
}

impl Schema {
    pub fn from_header<S: AsRef<str>>(header: &[S]) -> Self {
        let mut fields = Vec::with_capacity(header.len());
        let mut temporal = None;
        for (index, token) in header.iter().enumerate() {
            let token = token.as_ref();
            if temporal.is_none() {
                temporal = DateFormat::for_header(token).map(|format| TemporalColumn { index, format });
            }
            fields.push(normalize_field_name(token));
        }
        let template = fields
            .iter()
            .enumerate()
            .filter(|(index, _)| temporal.is_none_or(|t| t.index != *index))
            .map(|(_, name)| (name.clone(), Value::default()))
            .collect();
        Schema {
            fields,
            temporal,
            template,
        }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn temporal(&self) -> Option<TemporalColumn> {
        self.temporal
    }

    pub fn temporal_field(&self) -> Option<&str> {
        self.temporal
            .and_then(|t| self.fields.get(t.index))
            .map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|name| name == field)
    }

    /// Zero-valued mapping for every non-temporal field.
    pub fn template(&self) -> &BTreeMap<String, Value> {
        &self.template
    }

    /// True when `tokens` normalize to exactly this schema's field names.
    pub fn matches_header<S: AsRef<str>>(&self, tokens: &[S]) -> bool {
        tokens.len() == self.fields.len()
            && tokens
                .iter()
                .zip(&self.fields)
                .all(|(token, field)| normalize_field_name(token.as_ref()) == *field)
    }
}

/// Owns the inference state of one stream.
#[derive(Debug, Default)]
pub struct SchemaInferer {
    schema: Option<Schema>,
}

impl SchemaInferer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.schema.is_some()
    }

    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }

    /// Consumes a header line. Once initialized this is a no-op that returns
    /// the schema inferred by the first call.
    pub fn infer<S: AsRef<str>>(&mut self, header: &[S]) -> &Schema {
        if self.schema.is_some() {
            debug!("Schema already inferred; ignoring header with {} token(s)", header.len());
        }
        self.schema.get_or_insert_with(|| {
            let schema = Schema::from_header(header);
            debug!(
                "Inferred {} field(s); temporal column {:?}",
                schema.field_count(),
                schema.temporal_field()
            );
            schema
        })
    }
}
