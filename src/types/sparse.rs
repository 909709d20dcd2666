//! Sparse term-weight vectors produced by the encoder.

use serde::{Deserialize, Serialize};

/// Hashed surrogate for a vocabulary term.
pub type TermId = u32;

/// A sparse vector of `(term id, weight)` pairs, sorted by term id with no
/// duplicate ids. Serializes as `[[id, weight], ...]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SparseVector {
    entries: Vec<(TermId, f32)>,
}

impl SparseVector {
    /// Build from pairs already sorted by term id and free of duplicates.
    pub(crate) fn from_sorted(entries: Vec<(TermId, f32)>) -> Self {
        debug_assert!(entries.windows(2).all(|w| w[0].0 < w[1].0));
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TermId, f32)> + '_ {
        self.entries.iter().copied()
    }

    /// Weight for a term id, if present.
    pub fn get(&self, term: TermId) -> Option<f32> {
        self.entries
            .binary_search_by_key(&term, |&(id, _)| id)
            .ok()
            .map(|pos| self.entries[pos].1)
    }

    pub fn indices(&self) -> Vec<TermId> {
        self.entries.iter().map(|&(id, _)| id).collect()
    }

    pub fn values(&self) -> Vec<f32> {
        self.entries.iter().map(|&(_, w)| w).collect()
    }

    /// Sum of all weights.
    pub fn total_weight(&self) -> f32 {
        self.entries.iter().map(|&(_, w)| w).sum()
    }

    /// Dot product with another sparse vector (merge over sorted ids).
    pub fn dot(&self, other: &SparseVector) -> f32 {
        let (mut i, mut j) = (0, 0);
        let mut acc = 0.0f32;
        while i < self.entries.len() && j < other.entries.len() {
            let (a, wa) = self.entries[i];
            let (b, wb) = other.entries[j];
            match a.cmp(&b) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    acc += wa * wb;
                    i += 1;
                    j += 1;
                }
            }
        }
        acc
    }

    pub fn into_pairs(self) -> Vec<(TermId, f32)> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a SparseVector {
    type Item = &'a (TermId, f32);
    type IntoIter = std::slice::Iter<'a, (TermId, f32)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
