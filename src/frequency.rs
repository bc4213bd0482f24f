use std::{collections::HashMap, path::Path};

use anyhow::{Context, Result};
use encoding_rs::Encoding;
use log::debug;

use crate::{cluster::TermRecord, config::TermOrder, error::CanonError, io_utils};

/// Distinct non-empty values of one column with their counts, in order of
/// first appearance. Empty fields are treated as null and only tallied.
#[derive(Debug, Clone)]
pub struct FrequencyTable {
    column: String,
    rows: usize,
    nulls: usize,
    first_seen: Vec<String>,
    counts: HashMap<String, usize>,
}

impl FrequencyTable {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            rows: 0,
            nulls: 0,
            first_seen: Vec::new(),
            counts: HashMap::new(),
        }
    }

    pub fn record(&mut self, raw: &str) {
        self.rows += 1;
        if raw.is_empty() {
            self.nulls += 1;
            return;
        }
        match self.counts.get_mut(raw) {
            Some(count) => *count += 1,
            None => {
                self.counts.insert(raw.to_string(), 1);
                self.first_seen.push(raw.to_string());
            }
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn nulls(&self) -> usize {
        self.nulls
    }

    pub fn distinct(&self) -> usize {
        self.first_seen.len()
    }

    /// Converts the table into validated term records arranged by `order`.
    pub fn to_terms(&self, order: TermOrder) -> Result<Vec<TermRecord>, CanonError> {
        let mut terms = self
            .first_seen
            .iter()
            .map(|value| TermRecord::observed(value.as_str(), self.counts[value]))
            .collect::<Result<Vec<_>, _>>()?;
        order.arrange(&mut terms);
        Ok(terms)
    }
}

/// Frequency tables for the requested columns found in the input headers.
/// Columns absent from the headers have no table.
#[derive(Debug, Default)]
pub struct ColumnScan {
    pub tables: Vec<FrequencyTable>,
}

impl ColumnScan {
    pub fn table(&self, column: &str) -> Option<&FrequencyTable> {
        self.tables.iter().find(|table| table.column() == column)
    }
}

/// Streams `input` once and tallies every requested column.
pub fn scan_columns(
    input: &Path,
    delimiter: u8,
    encoding: &'static Encoding,
    columns: &[String],
) -> Result<ColumnScan> {
    let mut reader = io_utils::open_csv_reader_from_path(input, delimiter)?;
    let headers = io_utils::reader_headers(&mut reader, encoding)
        .with_context(|| format!("Reading headers from {input:?}"))?;

    let mut scan = ColumnScan::default();
    let mut targets = Vec::with_capacity(columns.len());
    for column in columns {
        if let Some(idx) = headers.iter().position(|header| header == column) {
            targets.push(idx);
            scan.tables.push(FrequencyTable::new(column.as_str()));
        }
    }
    debug!("Frequency columns resolved to indexes {:?}", targets);

    for (row_idx, record) in reader.byte_records().enumerate() {
        let record = record.with_context(|| format!("Reading row {}", row_idx + 2))?;
        let decoded = io_utils::decode_record(&record, encoding)
            .with_context(|| format!("Decoding row {}", row_idx + 2))?;
        for (table, &idx) in scan.tables.iter_mut().zip(&targets) {
            table.record(decoded.get(idx).map(String::as_str).unwrap_or(""));
        }
    }
    Ok(scan)
}
