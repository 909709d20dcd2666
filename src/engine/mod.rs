//! Tokenization, hashing and BM25 weighting.

pub mod encoder;
pub mod hasher;
pub mod params;
pub mod tokenizer;

pub use encoder::{Bm25Encoder, FitSummary};
pub use hasher::{hasher_by_name, Murmur3Hasher, TermHasher};
pub use params::{EncoderParams, Language};
pub use tokenizer::{
    SegmentMode, StopWordsPolicy, Tokenizer, TokenizerParams, TokenizerParamsUpdate,
};
