//! Job configuration for a cleaning run.
//!
//! A [`CleanConfig`] names the target table, the columns to clean, the
//! similarity threshold and the order terms are fed to the clusterer. It is
//! built from an optional YAML file and then overridden by command-line
//! flags; nothing here is global, so independent jobs never share state.
//!
//! ```yaml
//! table: capacitacoes
//! columns: [modalidade, instituicao_promotora]
//! threshold: 70
//! order: frequency
//! ```

use std::{fmt, fs::File, io::Read, path::Path};

use anyhow::{Context, Result, anyhow};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::{cli::TargetArgs, cluster::TermRecord, error::CanonError};

pub const DEFAULT_THRESHOLD: u8 = 70;

/// Minimum similarity score (inclusive) for two terms to cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Threshold(u8);

impl Threshold {
    pub fn new(value: i64) -> Result<Self, CanonError> {
        if (0..=100).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(CanonError::InvalidThreshold(value))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self(DEFAULT_THRESHOLD)
    }
}

impl TryFrom<i64> for Threshold {
    type Error = CanonError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Threshold> for i64 {
    fn from(value: Threshold) -> Self {
        i64::from(value.0)
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Order in which a column's distinct values are presented to the clusterer.
///
/// Clustering is first-seen greedy, so the order decides which values act
/// as seeds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[value(rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum TermOrder {
    /// Most frequent first, ties broken by value
    #[default]
    Frequency,
    /// Order of first appearance in the input
    FirstSeen,
    /// Lexicographic by value
    Alphabetical,
}

impl TermOrder {
    /// Sorts `terms` in place. `FirstSeen` leaves the slice untouched.
    pub fn arrange(self, terms: &mut [TermRecord]) {
        match self {
            TermOrder::Frequency => terms.sort_by(|a, b| {
                b.occurrences()
                    .cmp(&a.occurrences())
                    .then_with(|| a.value().cmp(&b.value()))
            }),
            TermOrder::FirstSeen => {}
            TermOrder::Alphabetical => terms.sort_by(|a, b| a.value().cmp(&b.value())),
        }
    }
}

/// Settings as they appear in a YAML config file; every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub table: Option<String>,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub threshold: Option<Threshold>,
    #[serde(default)]
    pub order: Option<TermOrder>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self> {
        let mut file = File::open(path).with_context(|| format!("Opening config file {path:?}"))?;
        let mut raw = String::new();
        file.read_to_string(&mut raw)
            .with_context(|| format!("Reading config file {path:?}"))?;
        Self::parse(&raw).with_context(|| format!("Parsing config file {path:?}"))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }
}

/// Fully resolved settings for one cleaning job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanConfig {
    pub table: String,
    pub columns: Vec<String>,
    pub threshold: Threshold,
    pub order: TermOrder,
}

impl CleanConfig {
    /// Merges the optional config file with command-line overrides.
    ///
    /// Flags win over file values. Without an explicit table name the input
    /// file stem is used.
    pub fn resolve(args: &TargetArgs, input: &Path) -> Result<Self> {
        let file = match &args.config {
            Some(path) => ConfigFile::load(path)?,
            None => ConfigFile::default(),
        };
        Self::merge(file, args, input)
    }

    fn merge(file: ConfigFile, args: &TargetArgs, input: &Path) -> Result<Self> {
        let columns = if args.columns.is_empty() {
            file.columns
        } else {
            args.columns.clone()
        };
        let columns = normalize_columns(columns);
        if columns.is_empty() {
            return Err(anyhow!(
                "No columns to clean. Supply --columns or list them in a config file."
            ));
        }

        let table = args
            .table
            .clone()
            .or(file.table)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .or_else(|| table_from_path(input))
            .ok_or_else(|| anyhow!("Cannot derive a table name from {input:?}; supply --table"))?;

        Ok(Self {
            table,
            columns,
            threshold: args.threshold.or(file.threshold).unwrap_or_default(),
            order: args.order.or(file.order).unwrap_or_default(),
        })
    }
}

fn normalize_columns(columns: Vec<String>) -> Vec<String> {
    let mut seen = Vec::with_capacity(columns.len());
    for column in columns {
        let trimmed = column.trim();
        if trimmed.is_empty() || seen.iter().any(|c: &String| c == trimmed) {
            continue;
        }
        seen.push(trimmed.to_string());
    }
    seen
}

fn table_from_path(input: &Path) -> Option<String> {
    if crate::io_utils::is_dash(input) {
        return None;
    }
    input
        .file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
        .filter(|stem| !stem.is_empty())
}
