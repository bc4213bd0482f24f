//! Per-column orchestration of the clustering core.
//!
//! For every configured column the frequency table is turned into term
//! records, clustered, resolved to a rename map and rendered into an update
//! statement. Each column yields a [`ColumnOutcome`]; a failing column never
//! stops the others.

use anyhow::{Error, anyhow};
use log::{debug, info, warn};

use crate::{
    canonical::{self, RenameMap},
    cluster::{self, TermRecord},
    config::{CleanConfig, Threshold},
    frequency::ColumnScan,
    rewrite::{self, RewriteStatement},
    similarity::Scorer,
};

/// Result of cleaning a single column.
#[derive(Debug)]
pub enum ColumnOutcome {
    /// Similar values were found; `statement` rewrites them.
    Rewritten {
        column: String,
        renames: RenameMap,
        statement: RewriteStatement,
    },
    /// Nothing to correct.
    Unchanged { column: String, distinct: usize },
    /// The column could not be processed.
    Failed { column: String, error: Error },
}

impl ColumnOutcome {
    pub fn column(&self) -> &str {
        match self {
            ColumnOutcome::Rewritten { column, .. }
            | ColumnOutcome::Unchanged { column, .. }
            | ColumnOutcome::Failed { column, .. } => column,
        }
    }

    pub fn renames(&self) -> Option<&RenameMap> {
        match self {
            ColumnOutcome::Rewritten { renames, .. } => Some(renames),
            _ => None,
        }
    }

    pub fn statement(&self) -> Option<&RewriteStatement> {
        match self {
            ColumnOutcome::Rewritten { statement, .. } => Some(statement),
            _ => None,
        }
    }
}

/// Clusters `terms` and resolves the rename map for them.
pub fn rename_map<S>(terms: &[TermRecord], threshold: Threshold, scorer: &S) -> RenameMap
where
    S: Scorer + ?Sized,
{
    let clusters = cluster::build_clusters(terms, threshold, scorer);
    debug!("{} cluster(s) at threshold {}", clusters.len(), threshold);
    canonical::resolve(&clusters, &canonical::count_lookup(terms))
}

/// Runs the full pipeline over one column's terms.
pub fn clean_column<S>(
    table: &str,
    column: &str,
    terms: &[TermRecord],
    threshold: Threshold,
    scorer: &S,
) -> ColumnOutcome
where
    S: Scorer + ?Sized,
{
    let renames = rename_map(terms, threshold, scorer);
    match rewrite::emit(table, column, &renames) {
        Some(statement) => ColumnOutcome::Rewritten {
            column: column.to_string(),
            renames,
            statement,
        },
        None => ColumnOutcome::Unchanged {
            column: column.to_string(),
            distinct: terms.iter().filter(|t| t.value().is_some()).count(),
        },
    }
}

/// Cleans every configured column of `scan`, in configuration order.
pub fn clean_columns<S>(config: &CleanConfig, scan: &ColumnScan, scorer: &S) -> Vec<ColumnOutcome>
where
    S: Scorer + ?Sized,
{
    let mut outcomes = Vec::with_capacity(config.columns.len());
    for column in &config.columns {
        info!("Processing column '{column}'");
        let outcome = match scan.table(column) {
            None => ColumnOutcome::Failed {
                column: column.clone(),
                error: anyhow!("Column '{column}' not found in input headers"),
            },
            Some(table) => match table.to_terms(config.order) {
                Err(err) => ColumnOutcome::Failed {
                    column: column.clone(),
                    error: Error::new(err),
                },
                Ok(terms) => {
                    info!(
                        "{} distinct value(s) across {} row(s) ({} null)",
                        table.distinct(),
                        table.rows(),
                        table.nulls()
                    );
                    clean_column(&config.table, column, &terms, config.threshold, scorer)
                }
            },
        };
        narrate(&outcome);
        outcomes.push(outcome);
    }
    outcomes
}

/// Combined update script for all rewritten columns, if any.
pub fn script(outcomes: &[ColumnOutcome]) -> Option<String> {
    let statements = outcomes
        .iter()
        .filter_map(ColumnOutcome::statement)
        .cloned()
        .collect::<Vec<_>>();
    rewrite::assemble_script(&statements)
}

fn narrate(outcome: &ColumnOutcome) {
    match outcome {
        ColumnOutcome::Rewritten { renames, .. } => {
            info!("{} correction(s) suggested", renames.len());
            for rename in renames {
                debug!("  '{}' -> '{}'", rename.from, rename.to);
            }
        }
        ColumnOutcome::Unchanged { distinct, .. } => {
            info!("No similar values among {distinct} distinct value(s)");
        }
        ColumnOutcome::Failed { column, error } => {
            warn!("Skipping column '{column}': {error:#}");
        }
    }
}
