//! BM25 sparse encoder: corpus fitting, document and query encoding,
//! parameter persistence.
//!
//! Weighting is deliberately asymmetric. Document vectors carry only the
//! length-normalized term-frequency saturation; query vectors carry only
//! inverse document frequency, normalized to sum to 1. Their dot product is
//! the BM25 score up to a per-query constant.

use std::collections::BTreeMap;
use std::path::Path;

use log::{debug, info, warn};

use super::params::{validate_bm25, EncoderParams, Language};
use super::tokenizer::{Tokenizer, TokenizerParams, TokenizerParamsUpdate};
use crate::index::CorpusStats;
use crate::types::{Bm25Error, Bm25Result, SparseVector, TermId, DEFAULT_B, DEFAULT_K1};

/// Outcome of one `fit_corpus` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitSummary {
    /// Documents that contributed to the statistics.
    pub documents: u64,
    /// Documents skipped because they produced no tokens.
    pub skipped: u64,
}

/// Converts text into BM25-weighted sparse vectors.
#[derive(Debug, Clone)]
pub struct Bm25Encoder {
    b: f64,
    k1: f64,
    stats: CorpusStats,
    tokenizer: Tokenizer,
}

impl Bm25Encoder {
    /// Create an unfit encoder with default b, k1 and tokenizer.
    pub fn new() -> Self {
        Self {
            b: DEFAULT_B,
            k1: DEFAULT_K1,
            stats: CorpusStats::new(),
            tokenizer: Tokenizer::new(),
        }
    }

    /// Create an unfit encoder with explicit BM25 and tokenizer parameters.
    pub fn with_params(b: f64, k1: f64, tokenizer_params: TokenizerParams) -> Bm25Result<Self> {
        validate_bm25(b, k1)?;
        Ok(Self {
            b,
            k1,
            stats: CorpusStats::new(),
            tokenizer: Tokenizer::with_params(tokenizer_params)?,
        })
    }

    /// Create an encoder from a bundled language preset.
    pub fn default_for(language: Language) -> Bm25Result<Self> {
        let mut encoder = Self::new();
        encoder.apply_params(EncoderParams::preset(language)?)?;
        Ok(encoder)
    }

    pub fn b(&self) -> f64 {
        self.b
    }

    pub fn k1(&self) -> f64 {
        self.k1
    }

    /// Change b and k1 without touching the fitted statistics.
    pub fn set_bm25(&mut self, b: f64, k1: f64) -> Bm25Result<()> {
        validate_bm25(b, k1)?;
        self.b = b;
        self.k1 = k1;
        Ok(())
    }

    pub fn stats(&self) -> &CorpusStats {
        &self.stats
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    /// Whether the encoder has usable corpus statistics.
    pub fn is_fitted(&self) -> bool {
        self.stats.is_fitted()
    }

    /// Drop all fitted statistics.
    pub fn reset_stats(&mut self) {
        self.stats.clear();
    }

    fn ensure_fitted(&self) -> Bm25Result<()> {
        if self.stats.is_fitted() {
            Ok(())
        } else {
            Err(Bm25Error::NotFitted)
        }
    }

    // ---------------------------------------------------------------------
    // Fitting
    // ---------------------------------------------------------------------

    /// Fold a corpus into the statistics. Fits are cumulative: fitting A then
    /// B yields the same statistics as fitting A and B together.
    pub fn fit_corpus<T: AsRef<str>>(&mut self, documents: &[T]) -> Bm25Result<FitSummary> {
        if documents.is_empty() {
            return Err(Bm25Error::InvalidInput(
                "cannot fit an empty corpus".to_string(),
            ));
        }

        let batch = CorpusStats::from_documents(
            documents
                .iter()
                .map(|doc| self.tokenizer.term_frequencies(doc.as_ref())),
        );
        let summary = FitSummary {
            documents: batch.doc_count(),
            skipped: documents.len() as u64 - batch.doc_count(),
        };

        if batch.doc_count() == 0 {
            warn!(
                "fit_corpus: all {} documents produced no tokens, statistics unchanged",
                documents.len()
            );
            return Ok(summary);
        }

        self.stats.merge(&batch);
        debug!(
            "fit_corpus: {} documents ({} skipped), doc_count={} avgdl={:.3} terms={}",
            summary.documents,
            summary.skipped,
            self.stats.doc_count(),
            self.stats.average_doc_length(),
            self.stats.term_count()
        );
        Ok(summary)
    }

    // ---------------------------------------------------------------------
    // Document side
    // ---------------------------------------------------------------------

    /// Encode one document.
    pub fn encode_text(&self, text: &str) -> Bm25Result<SparseVector> {
        self.ensure_fitted()?;
        Ok(self.document_vector(self.tokenizer.term_frequencies(text)))
    }

    /// Encode a batch of documents.
    pub fn encode_texts<T: AsRef<str>>(&self, texts: &[T]) -> Bm25Result<Vec<SparseVector>> {
        self.ensure_fitted()?;
        let vectors: Vec<SparseVector> = texts
            .iter()
            .map(|text| self.document_vector(self.tokenizer.term_frequencies(text.as_ref())))
            .collect();
        debug!("encode_texts: {} documents", vectors.len());
        Ok(vectors)
    }

    fn document_vector(&self, freqs: BTreeMap<TermId, u32>) -> SparseVector {
        let doc_len: u64 = freqs.values().map(|&c| c as u64).sum();
        let avgdl = self.stats.average_doc_length();
        let norm = self.k1 * (1.0 - self.b + self.b * doc_len as f64 / avgdl);

        let entries = freqs
            .into_iter()
            .map(|(term, count)| {
                let tf = count as f64;
                (term, (tf / (norm + tf)) as f32)
            })
            .collect();
        SparseVector::from_sorted(entries)
    }

    // ---------------------------------------------------------------------
    // Query side
    // ---------------------------------------------------------------------

    /// Encode one query.
    pub fn encode_query(&self, text: &str) -> Bm25Result<SparseVector> {
        self.ensure_fitted()?;
        Ok(self.query_vector(self.tokenizer.term_frequencies(text)))
    }

    /// Encode a batch of queries.
    pub fn encode_queries<T: AsRef<str>>(&self, texts: &[T]) -> Bm25Result<Vec<SparseVector>> {
        self.ensure_fitted()?;
        let vectors: Vec<SparseVector> = texts
            .iter()
            .map(|text| self.query_vector(self.tokenizer.term_frequencies(text.as_ref())))
            .collect();
        debug!("encode_queries: {} queries", vectors.len());
        Ok(vectors)
    }

    /// Inverse document frequency with +1/+0.5 smoothing, so terms never seen
    /// in the corpus still get a large positive weight.
    fn idf(&self, term: TermId) -> f64 {
        let n = self.stats.doc_count() as f64;
        let df = self.stats.doc_frequency(term);
        ((n + 1.0) / (df + 0.5)).ln().max(0.0)
    }

    fn query_vector(&self, freqs: BTreeMap<TermId, u32>) -> SparseVector {
        let idfs: Vec<(TermId, f64)> = freqs
            .into_keys()
            .map(|term| (term, self.idf(term)))
            .filter(|&(_, idf)| idf > 0.0)
            .collect();

        let total: f64 = idfs.iter().map(|&(_, idf)| idf).sum();
        if total <= 0.0 {
            return SparseVector::default();
        }

        SparseVector::from_sorted(
            idfs.into_iter()
                .map(|(term, idf)| (term, (idf / total) as f32))
                .collect(),
        )
    }

    // ---------------------------------------------------------------------
    // Parameters
    // ---------------------------------------------------------------------

    /// Full snapshot of b, k1, tokenizer configuration and statistics.
    pub fn params(&self) -> EncoderParams {
        EncoderParams {
            b: self.b,
            k1: self.k1,
            tokenizer_params: self.tokenizer.parameters(),
            bm25_learned_params: self.stats.clone(),
        }
    }

    /// Replace b, k1 and statistics and reconfigure the tokenizer. Nothing is
    /// changed unless the whole snapshot applies cleanly.
    pub fn apply_params(&mut self, params: EncoderParams) -> Bm25Result<()> {
        params.validate()?;
        let mut tokenizer = self.tokenizer.clone();
        tokenizer.update_parameters(&TokenizerParamsUpdate::from(params.tokenizer_params))?;

        self.b = params.b;
        self.k1 = params.k1;
        self.stats = params.bm25_learned_params;
        self.tokenizer = tokenizer;
        Ok(())
    }

    /// Load parameters from a file written by [`download_params`](Self::download_params).
    pub fn set_params(&mut self, path: impl AsRef<Path>) -> Bm25Result<()> {
        let path = path.as_ref();
        self.apply_params(EncoderParams::load(path)?)?;
        info!(
            "loaded BM25 parameters from {} (doc_count={}, terms={})",
            path.display(),
            self.stats.doc_count(),
            self.stats.term_count()
        );
        Ok(())
    }

    /// Write the current parameters to a file.
    pub fn download_params(&self, path: impl AsRef<Path>) -> Bm25Result<()> {
        let path = path.as_ref();
        self.params().save(path)?;
        info!("saved BM25 parameters to {}", path.display());
        Ok(())
    }

    /// Load the bundled parameters for `"zh"` or `"en"`.
    pub fn set_default_params(&mut self, language: &str) -> Bm25Result<()> {
        let language: Language = language.parse()?;
        self.apply_params(EncoderParams::preset(language)?)?;
        info!("loaded bundled BM25 parameters for '{}'", language);
        Ok(())
    }

    /// Load a user dictionary into the tokenizer.
    pub fn set_dict(&mut self, path: impl AsRef<Path>) -> Bm25Result<()> {
        self.tokenizer.load_dict(path)
    }

    /// Apply a partial tokenizer configuration delta.
    pub fn update_tokenizer(&mut self, update: &TokenizerParamsUpdate) -> Bm25Result<()> {
        self.tokenizer.update_parameters(update)
    }
}

impl Default for Bm25Encoder {
    fn default() -> Self {
        Self::new()
    }
}
