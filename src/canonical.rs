//! Canonical value selection and the resulting rename mapping.

use std::collections::HashMap;

use serde::Serialize;

use crate::cluster::{Cluster, TermRecord};

/// A single correction: rows holding `from` should hold `to` instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rename {
    pub from: String,
    pub to: String,
}

/// Insertion-ordered mapping of non-canonical values to their canonical form.
///
/// Keys are never canonical values themselves and never map to themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RenameMap {
    entries: Vec<Rename>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl RenameMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `from -> to`. Self-mappings and repeated keys are ignored.
    fn insert(&mut self, from: &str, to: &str) {
        if from == to || self.index.contains_key(from) {
            return;
        }
        self.index.insert(from.to_string(), self.entries.len());
        self.entries.push(Rename {
            from: from.to_string(),
            to: to.to_string(),
        });
    }

    pub fn get(&self, value: &str) -> Option<&str> {
        self.index
            .get(value)
            .map(|&idx| self.entries[idx].to.as_str())
    }

    /// Corrections in the order they were resolved.
    pub fn iter(&self) -> impl Iterator<Item = &Rename> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a RenameMap {
    type Item = &'a Rename;
    type IntoIter = std::slice::Iter<'a, Rename>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Builds a `value -> occurrences` lookup, summing repeated values.
pub fn count_lookup(terms: &[TermRecord]) -> HashMap<String, u64> {
    let mut counts = HashMap::with_capacity(terms.len());
    for term in terms {
        if let Some(value) = term.value() {
            *counts.entry(value.to_string()).or_insert(0) += term.occurrences();
        }
    }
    counts
}

/// Picks the most frequent member of `cluster`; the earliest member wins ties.
///
/// Values missing from `counts` count as zero.
pub fn canonical_member<'a>(cluster: &'a Cluster, counts: &HashMap<String, u64>) -> &'a str {
    let occurrences = |value: &str| counts.get(value).copied().unwrap_or(0);
    let mut best = cluster.seed();
    let mut best_count = occurrences(best);
    for member in &cluster.members()[1..] {
        let count = occurrences(member);
        if count > best_count {
            best = member;
            best_count = count;
        }
    }
    best
}

/// Maps every non-canonical member of every cluster to its cluster's
/// canonical value.
pub fn resolve(clusters: &[Cluster], counts: &HashMap<String, u64>) -> RenameMap {
    let mut renames = RenameMap::new();
    for cluster in clusters {
        let canonical = canonical_member(cluster, counts);
        for member in cluster.members() {
            renames.insert(member, canonical);
        }
    }
    renames
}
