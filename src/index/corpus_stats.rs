//! Corpus statistics for BM25 weighting.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{Bm25Error, Bm25Result, TermId};

/// Document frequencies, document count and average document length of every
/// corpus fitted so far. The persisted field names are part of the parameter
/// file format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorpusStats {
    /// term id → number of documents containing it.
    #[serde(default)]
    token_freq: BTreeMap<TermId, f64>,
    /// Number of non-empty documents fitted.
    #[serde(default)]
    doc_count: u64,
    /// Average document length in tokens.
    #[serde(default)]
    average_doc_length: f64,
}

impl CorpusStats {
    /// Create empty (unfit) statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build statistics from raw parts, rejecting negative or non-finite values.
    pub fn from_parts(
        token_freq: BTreeMap<TermId, f64>,
        doc_count: u64,
        average_doc_length: f64,
    ) -> Bm25Result<Self> {
        let stats = Self {
            token_freq,
            doc_count,
            average_doc_length,
        };
        stats.validate()?;
        Ok(stats)
    }

    /// Check the invariants a loaded snapshot must satisfy.
    pub fn validate(&self) -> Bm25Result<()> {
        if !self.average_doc_length.is_finite() || self.average_doc_length < 0.0 {
            return Err(Bm25Error::InvalidConfig(format!(
                "average_doc_length must be a non-negative number, got {}",
                self.average_doc_length
            )));
        }
        if (self.doc_count == 0) != (self.average_doc_length == 0.0) {
            return Err(Bm25Error::InvalidConfig(format!(
                "doc_count ({}) and average_doc_length ({}) must be fit together",
                self.doc_count, self.average_doc_length
            )));
        }
        if let Some((term, freq)) = self
            .token_freq
            .iter()
            .find(|(_, f)| !f.is_finite() || **f < 0.0)
        {
            return Err(Bm25Error::InvalidConfig(format!(
                "token_freq[{}] must be a non-negative number, got {}",
                term, freq
            )));
        }
        Ok(())
    }

    /// Build statistics for one batch of per-document term counts.
    /// Documents with no terms are skipped.
    pub fn from_documents<I>(documents: I) -> Self
    where
        I: IntoIterator<Item = BTreeMap<TermId, u32>>,
    {
        let mut stats = Self::new();
        let mut total_tokens: u64 = 0;

        for freqs in documents {
            let doc_len: u64 = freqs.values().map(|&c| c as u64).sum();
            if doc_len == 0 {
                continue;
            }
            total_tokens += doc_len;
            for term in freqs.into_keys() {
                *stats.token_freq.entry(term).or_insert(0.0) += 1.0;
            }
            stats.doc_count += 1;
        }

        if stats.doc_count > 0 {
            stats.average_doc_length = total_tokens as f64 / stats.doc_count as f64;
        }
        stats
    }

    /// Fold another set of statistics into this one. Average length is
    /// recombined as a document-count weighted mean.
    pub fn merge(&mut self, other: &CorpusStats) {
        if other.doc_count == 0 {
            return;
        }
        let old_count = self.doc_count as f64;
        let new_count = other.doc_count as f64;
        let total_len =
            self.average_doc_length * old_count + other.average_doc_length * new_count;

        self.doc_count += other.doc_count;
        self.average_doc_length = total_len / self.doc_count as f64;

        for (&term, &freq) in &other.token_freq {
            *self.token_freq.entry(term).or_insert(0.0) += freq;
        }
    }

    /// Number of fitted documents containing a term (0 if unseen).
    pub fn doc_frequency(&self, term: TermId) -> f64 {
        self.token_freq.get(&term).copied().unwrap_or(0.0)
    }

    /// Total number of fitted documents.
    pub fn doc_count(&self) -> u64 {
        self.doc_count
    }

    /// Average document length.
    pub fn average_doc_length(&self) -> f64 {
        self.average_doc_length
    }

    /// Number of unique terms.
    pub fn term_count(&self) -> usize {
        self.token_freq.len()
    }

    pub fn token_freq(&self) -> &BTreeMap<TermId, f64> {
        &self.token_freq
    }

    /// Whether these statistics can drive encoding.
    pub fn is_fitted(&self) -> bool {
        self.doc_count > 0 && self.average_doc_length > 0.0 && !self.token_freq.is_empty()
    }

    /// Clear all statistics.
    pub fn clear(&mut self) {
        self.token_freq.clear();
        self.doc_count = 0;
        self.average_doc_length = 0.0;
    }
}
