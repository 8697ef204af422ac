//! Stream and application configuration.
//!
//! [`StreamConfig`] is fixed when a [`DataStream`](crate::stream::DataStream) is
//! built. [`IngestConfig`] is the optional YAML file read by the CLI; it carries
//! the access credential, a default value column, per-symbol value-column
//! overrides and the repeated-header policy.

use std::{collections::BTreeMap, fs, path::Path};

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// What a stream does with a data line that repeats its header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "kebab-case")]
pub enum RepeatedHeaderPolicy {
    /// Skip the line and keep parsing.
    #[default]
    Ignore,
    /// Treat the line as a schema violation and abort the stream.
    Reject,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamConfig {
    pub value_column: Option<String>,
    pub repeated_header: RepeatedHeaderPolicy,
}

impl StreamConfig {
    pub fn with_value_column(mut self, name: impl Into<String>) -> Self {
        self.value_column = Some(name.into());
        self
    }

    pub fn with_repeated_header(mut self, policy: RepeatedHeaderPolicy) -> Self {
        self.repeated_header = policy;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IngestConfig {
    pub auth_token: Option<String>,
    pub value_column: Option<String>,
    /// Symbol -> value column, e.g. `SHFE/SCF2021: settle`.
    pub value_columns: BTreeMap<String, String>,
    pub repeated_header: RepeatedHeaderPolicy,
}

impl IngestConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Opening config file {path:?}"))?;
        Self::from_yaml(&raw).with_context(|| format!("Parsing config file {path:?}"))
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Per-symbol override first, then the file-wide value column.
    pub fn stream_config(&self, symbol: &str) -> StreamConfig {
        let value_column = self
            .value_columns
            .get(symbol)
            .or(self.value_column.as_ref())
            .cloned();
        StreamConfig {
            value_column,
            repeated_header: self.repeated_header,
        }
    }
}
