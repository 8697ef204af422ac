use std::collections::BTreeMap;

use chrono::{Duration, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::data::{Value, normalize_field_name};

/// One parsed data line.
///
/// `fields` holds every non-temporal column keyed by its normalized name. The
/// temporal column (if any) is lifted into `time`. `value` is the primary
/// numeric value, unset when no numeric keyword field was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub symbol: String,
    pub time: NaiveDateTime,
    pub fields: BTreeMap<String, Value>,
    pub value: Option<Decimal>,
}

impl Record {
    /// Every record covers one day.
    pub fn period() -> Duration {
        Duration::days(1)
    }

    pub fn end_time(&self) -> NaiveDateTime {
        self.time + Self::period()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(&normalize_field_name(name))
    }

    pub fn number(&self, name: &str) -> Option<Decimal> {
        self.get(name).and_then(Value::as_decimal)
    }
}
