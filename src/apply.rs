use std::{collections::HashMap, path::Path};

use anyhow::{Context, Result};
use encoding_rs::Encoding;
use log::info;

use crate::{canonical::RenameMap, io_utils, pipeline::ColumnOutcome};

/// Where and how the corrected copy is written.
#[derive(Debug, Clone, Copy)]
pub struct ApplyTarget<'a> {
    pub output: Option<&'a Path>,
    pub delimiter: u8,
}

/// Copies `input` to the target, replacing values in every rewritten column
/// through its rename map. Empty fields are never touched.
///
/// Returns the number of cells changed.
pub fn apply_corrections(
    input: &Path,
    delimiter: u8,
    encoding: &'static Encoding,
    outcomes: &[ColumnOutcome],
    target: ApplyTarget<'_>,
) -> Result<usize> {
    let mut reader = io_utils::open_csv_reader_from_path(input, delimiter)?;
    let headers = io_utils::reader_headers(&mut reader, encoding)
        .with_context(|| format!("Reading headers from {input:?}"))?;

    let maps = column_maps(&headers, outcomes);

    let mut writer = io_utils::open_csv_writer(target.output, target.delimiter)?;
    writer
        .write_record(headers.iter())
        .context("Writing output headers")?;

    let mut rows = 0usize;
    let mut changed = 0usize;
    for (idx, record) in reader.byte_records().enumerate() {
        let record = record.with_context(|| format!("Reading row {}", idx + 2))?;
        let mut values = io_utils::decode_record(&record, encoding)
            .with_context(|| format!("Decoding row {}", idx + 2))?;
        changed += rewrite_row(&mut values, &maps);
        writer
            .write_record(values.iter())
            .with_context(|| format!("Writing output row {}", idx + 2))?;
        rows += 1;
    }
    writer.flush().context("Flushing output writer")?;

    info!(
        "Corrected {} cell(s) across {} row(s) -> {}",
        changed,
        rows,
        io_utils::describe_output(target.output)
    );
    Ok(changed)
}

fn column_maps<'a>(
    headers: &[String],
    outcomes: &'a [ColumnOutcome],
) -> HashMap<usize, &'a RenameMap> {
    outcomes
        .iter()
        .filter_map(|outcome| {
            let renames = outcome.renames()?;
            let idx = headers.iter().position(|h| h == outcome.column())?;
            Some((idx, renames))
        })
        .collect()
}

fn rewrite_row(values: &mut [String], maps: &HashMap<usize, &RenameMap>) -> usize {
    let mut changed = 0;
    for (idx, renames) in maps {
        let Some(cell) = values.get_mut(*idx) else {
            continue;
        };
        if let Some(canonical) = renames.get(cell.as_str()) {
            *cell = canonical.to_string();
            changed += 1;
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cluster::TermRecord, config::Threshold, pipeline::clean_column,
        similarity::TokenSetScorer,
    };

    #[test]
    fn rows_are_rewritten_only_in_mapped_columns() {
        let terms = vec![
            TermRecord::observed("EAD", 2).expect("record"),
            TermRecord::observed("ead", 1).expect("record"),
        ];
        let outcome =
            clean_column("t", "modalidade", &terms, Threshold::default(), &TokenSetScorer);
        let outcomes = vec![outcome];
        let headers = vec!["nome".to_string(), "modalidade".to_string()];
        let maps = column_maps(&headers, &outcomes);

        let mut row = vec!["ead".to_string(), "ead".to_string()];
        assert_eq!(rewrite_row(&mut row, &maps), 1);
        assert_eq!(row, vec!["ead", "EAD"]);

        let mut row = vec!["x".to_string(), String::new()];
        assert_eq!(rewrite_row(&mut row, &maps), 0);
        assert_eq!(row, vec!["x", ""]);
    }
}
