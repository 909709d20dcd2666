//! Tokenizer and BM25 encoder producing hashed sparse term-weight vectors
//! for lexical and hybrid dense/sparse retrieval.
//!
//! ```no_run
//! use bm25_sparse::Bm25Encoder;
//!
//! let mut encoder = Bm25Encoder::new();
//! encoder.fit_corpus(&["向量数据库支持稀疏向量检索", "全文检索使用倒排索引"])?;
//! let doc = encoder.encode_text("向量数据库支持稀疏向量检索")?;
//! let query = encoder.encode_query("什么是向量数据库")?;
//! println!("score = {}", doc.dot(&query));
//! # Ok::<(), bm25_sparse::Bm25Error>(())
//! ```

pub mod config;
pub mod engine;
pub mod index;
pub mod types;

pub use config::EncoderConfig;
pub use engine::{
    hasher_by_name, Bm25Encoder, EncoderParams, FitSummary, Language, Murmur3Hasher,
    SegmentMode, StopWordsPolicy, TermHasher, Tokenizer, TokenizerParams, TokenizerParamsUpdate,
};
pub use index::CorpusStats;
pub use types::{Bm25Error, Bm25Result, FileKind, SparseVector, TermId};
