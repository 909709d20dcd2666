//! Core data types shared across the crate.

pub mod error;
pub mod sparse;

pub use error::{Bm25Error, Bm25Result, FileKind};
pub use sparse::{SparseVector, TermId};

/// Default length-normalization strength.
pub const DEFAULT_B: f64 = 0.75;

/// Default term-frequency saturation.
pub const DEFAULT_K1: f64 = 1.2;

/// Identifier of the default term hasher.
pub const DEFAULT_HASH_FUNCTION: &str = "mmh3";
