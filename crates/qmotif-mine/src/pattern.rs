//! Pattern frequency tables.

use std::collections::BTreeMap;

use qmotif_graph::CircuitGraph;

use crate::canon::{CanonicalHash, CanonicalLabeler};

/// One pattern bucket.
#[derive(Debug, Clone)]
pub struct PatternEntry {
    /// Structural hash.
    pub hash: CanonicalHash,
    /// Index among structurally distinct patterns sharing `hash`; always 0
    /// unless collisions are verified.
    pub variant: usize,
    /// Number of occurrences.
    pub count: u64,
    /// First subgraph recorded under this bucket.
    pub exemplar: CircuitGraph,
}

/// Occurrence counts keyed by canonical hash.
///
/// Merging sums counts and keeps the receiving table's exemplar, so the
/// surviving exemplar depends on merge order.
#[derive(Debug, Clone)]
pub struct PatternTable {
    buckets: BTreeMap<CanonicalHash, Vec<PatternEntry>>,
    total_examined: u64,
    verifier: Option<CanonicalLabeler>,
}

impl PatternTable {
    /// Table that trusts hash equality.
    pub fn new() -> Self {
        Self {
            buckets: BTreeMap::new(),
            total_examined: 0,
            verifier: None,
        }
    }

    /// Table that splits colliding hashes with an exact isomorphism check.
    pub fn verified(labeler: CanonicalLabeler) -> Self {
        Self {
            verifier: Some(labeler),
            ..Self::new()
        }
    }

    /// Record one examined subgraph.
    pub fn record(&mut self, hash: CanonicalHash, subgraph: CircuitGraph) {
        self.add(hash, 1, subgraph);
        self.total_examined += 1;
    }

    fn add(&mut self, hash: CanonicalHash, count: u64, exemplar: CircuitGraph) {
        let variants = self.buckets.entry(hash).or_default();
        let existing = match &self.verifier {
            Some(labeler) => variants
                .iter_mut()
                .find(|e| labeler.structurally_equal(&e.exemplar, &exemplar)),
            None => variants.first_mut(),
        };
        match existing {
            Some(entry) => entry.count += count,
            None => {
                let variant = variants.len();
                variants.push(PatternEntry {
                    hash,
                    variant,
                    count,
                    exemplar,
                });
            }
        }
    }

    /// Fold `other` into this table.
    pub fn merge(&mut self, other: PatternTable) {
        self.total_examined += other.total_examined;
        for (hash, variants) in other.buckets {
            for entry in variants {
                self.add(hash, entry.count, entry.exemplar);
            }
        }
    }

    /// Number of subgraphs examined.
    pub fn total_examined(&self) -> u64 {
        self.total_examined
    }

    /// Number of distinct patterns.
    pub fn unique_patterns(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Check whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Entries by count descending, ties broken by hash then variant.
    pub fn ranked(&self) -> Vec<&PatternEntry> {
        let mut entries: Vec<&PatternEntry> = self.buckets.values().flatten().collect();
        entries.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.hash.cmp(&b.hash))
                .then_with(|| a.variant.cmp(&b.variant))
        });
        entries
    }

    /// Relative frequency of `count`; 0 when nothing was examined.
    #[allow(clippy::cast_precision_loss)]
    pub fn frequency(&self, count: u64) -> f64 {
        if self.total_examined == 0 {
            0.0
        } else {
            count as f64 / self.total_examined as f64
        }
    }
}

impl Default for PatternTable {
    fn default() -> Self {
        Self::new()
    }
}
