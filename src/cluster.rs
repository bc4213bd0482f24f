//! Greedy single-pass clustering of distinct column values.
//!
//! Terms are visited in the order the caller supplies. The first unclaimed
//! term becomes a seed and claims every other unclaimed term in the input
//! scoring at or above the threshold against it. The
//! result depends on input order by contract: reorder the input and a
//! different, equally valid, partition may come out. Members are only
//! guaranteed to be similar to their seed, not to each other.
//!
//! Cost is quadratic in the number of distinct terms (every seed is
//! compared with every unclaimed term). This is comfortable for a few
//! thousand distinct values per column; larger inputs should be capped or
//! chunked by the caller.

use std::collections::HashSet;

use log::debug;
use serde::Serialize;

use crate::{config::Threshold, error::CanonError, similarity::Scorer};

/// One distinct observed value of a column and how often it occurs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermRecord {
    value: Option<String>,
    occurrences: u64,
}

impl TermRecord {
    /// Validates and builds a record. `None` stands for a null value.
    pub fn new(value: Option<String>, occurrences: i64) -> Result<Self, CanonError> {
        let display = value.as_deref().unwrap_or("<null>");
        if occurrences < 0 {
            return Err(CanonError::MalformedTermRecord {
                value: display.to_string(),
                reason: format!("occurrence count {occurrences} is negative"),
            });
        }
        if let Some(text) = value.as_deref()
            && text.contains('\0')
        {
            return Err(CanonError::MalformedTermRecord {
                value: text.replace('\0', "\\0"),
                reason: "value contains a NUL character".to_string(),
            });
        }
        Ok(Self {
            value,
            occurrences: occurrences as u64,
        })
    }

    /// Builds a record for a non-null value with an unsigned count.
    pub fn observed(value: impl Into<String>, occurrences: usize) -> Result<Self, CanonError> {
        let value = value.into();
        let occurrences = match i64::try_from(occurrences) {
            Ok(count) => count,
            Err(_) => {
                return Err(CanonError::MalformedTermRecord {
                    value,
                    reason: format!("occurrence count {occurrences} does not fit in i64"),
                });
            }
        };
        Self::new(Some(value), occurrences)
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn occurrences(&self) -> u64 {
        self.occurrences
    }
}

/// Values judged similar to a common seed, seed first.
///
/// Only [`build_clusters`] creates clusters and it keeps those with at least
/// two members, so a cluster is never empty and [`Cluster::seed`] always
/// exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cluster {
    members: Vec<String>,
}

impl Cluster {
    pub fn seed(&self) -> &str {
        &self.members[0]
    }

    /// Members in claim order: the seed, then claimed terms in scan order.
    pub fn members(&self) -> &[String] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, value: &str) -> bool {
        self.members.iter().any(|member| member == value)
    }
}

/// Partitions `terms` into clusters of at least two members.
pub fn build_clusters<S>(terms: &[TermRecord], threshold: Threshold, scorer: &S) -> Vec<Cluster>
where
    S: Scorer + ?Sized,
{
    let values = terms
        .iter()
        .filter_map(TermRecord::value)
        .collect::<Vec<_>>();
    let mut processed: HashSet<&str> = HashSet::with_capacity(values.len());
    let mut clusters = Vec::new();
    let mut comparisons = 0usize;

    for &seed in &values {
        if !processed.insert(seed) {
            continue;
        }
        let mut members = vec![seed.to_string()];
        for &candidate in &values {
            if processed.contains(candidate) {
                continue;
            }
            comparisons += 1;
            if scorer.score(seed, candidate) >= threshold.value() {
                processed.insert(candidate);
                members.push(candidate.to_string());
            }
        }
        if members.len() > 1 {
            debug!("Cluster seeded by '{}' claimed {} member(s)", seed, members.len());
            clusters.push(Cluster { members });
        }
    }

    debug!(
        "Compared {} pair(s) across {} distinct value(s); kept {} cluster(s)",
        comparisons,
        values.len(),
        clusters.len()
    );
    clusters
}
