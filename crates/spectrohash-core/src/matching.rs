//! Catalog ranking
//!
//! Linear scan of a catalog against one query fingerprint set. Results are
//! ordered by descending aggregate score; equal scores keep catalog order.

use crate::distance::{compare, PerKind};
use crate::error::{Result, SpectroHashError};
use crate::fingerprint::FingerprintSet;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;


/// Fingerprint sets keyed by a unique id, iterated in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    entries: Vec<(String, FingerprintSet)>,
    /// id -> position in `entries`
    index: HashMap<String, usize>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry; an existing id keeps its position and gets the new set
    pub fn insert(&mut self, id: impl Into<String>, set: FingerprintSet) -> Option<FingerprintSet> {
        let id = id.into();
        match self.index.get(&id) {
            Some(&position) => Some(std::mem::replace(&mut self.entries[position].1, set)),
            None => {
                self.index.insert(id.clone(), self.entries.len());
                self.entries.push((id, set));
                None
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&FingerprintSet> {
        self.index.get(id).map(|&position| &self.entries[position].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FingerprintSet)> {
        self.entries.iter().map(|(id, set)| (id.as_str(), set))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, FingerprintSet)> for Catalog {
    fn from_iter<I: IntoIterator<Item = (String, FingerprintSet)>>(iter: I) -> Self {
        let mut catalog = Catalog::new();
        for (id, set) in iter {
            catalog.insert(id, set);
        }
        catalog
    }
}

/// Score of one catalog entry against the query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub id: String,
    /// Aggregate similarity percentage in `[0, 100]`
    pub score: f64,
    /// Similarity percentage per fingerprint kind
    pub kind_scores: PerKind<f64>,
    /// Raw Hamming distances per fingerprint kind
    pub distances: PerKind<u32>,
}

fn score_entry(query: &FingerprintSet, id: &str, entry: &FingerprintSet) -> Result<MatchResult> {
    let comparison = compare(query, entry).map_err(|e| match e {
        SpectroHashError::IncompatibleFingerprint(message) => {
            SpectroHashError::IncompatibleFingerprint(format!("catalog entry '{id}': {message}"))
        }
        other => other,
    })?;
    Ok(MatchResult {
        id: id.to_string(),
        score: comparison.score,
        kind_scores: comparison.kind_scores,
        distances: comparison.distances,
    })
}

fn sort_results(results: &mut [MatchResult]) {
    // stable: equal scores keep catalog order
    results.sort_by(|a, b| b.score.total_cmp(&a.score));
}

/// Rank every catalog entry against `query`, best first
///
/// Aborts on the first entry whose fingerprints differ in bit length from
/// the query's.
pub fn rank(query: &FingerprintSet, catalog: &Catalog) -> Result<Vec<MatchResult>> {
    query.bit_len()?;
    let mut results = catalog
        .iter()
        .map(|(id, entry)| score_entry(query, id, entry))
        .collect::<Result<Vec<_>>>()?;
    sort_results(&mut results);

    log::debug!("ranked {} catalog entries", results.len());
    Ok(results)
}

/// [`rank`] with entries scored on the rayon thread pool
///
/// Output is identical to [`rank`]: scores are collected in catalog order
/// before the stable sort.
pub fn rank_parallel(query: &FingerprintSet, catalog: &Catalog) -> Result<Vec<MatchResult>> {
    query.bit_len()?;
    let mut results = catalog
        .entries
        .par_iter()
        .map(|(id, entry)| score_entry(query, id, entry))
        .collect::<Result<Vec<_>>>()?;
    sort_results(&mut results);

    log::debug!("ranked {} catalog entries in parallel", results.len());
    Ok(results)
}
