//! Fitted corpus state used for term weighting.

pub mod corpus_stats;

pub use corpus_stats::CorpusStats;
