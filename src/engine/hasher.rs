//! Deterministic token hashing into the term-id space.

use crate::types::{Bm25Error, Bm25Result, TermId, DEFAULT_HASH_FUNCTION};

/// Maps a token to a term id. Implementations must be stable across runs and
/// processes; `name` is recorded in parameter snapshots.
pub trait TermHasher: Send + Sync + std::fmt::Debug {
    fn hash(&self, token: &str) -> TermId;

    fn name(&self) -> &'static str;
}

/// MurmurHash3 x86 32-bit, seed 0, unsigned output (matches `mmh3.hash(s, signed=False)`).
#[derive(Debug, Clone, Copy, Default)]
pub struct Murmur3Hasher;

impl TermHasher for Murmur3Hasher {
    #[inline]
    fn hash(&self, token: &str) -> TermId {
        murmur3_x86_32(token.as_bytes(), 0)
    }

    fn name(&self) -> &'static str {
        DEFAULT_HASH_FUNCTION
    }
}

/// Resolve a hash function identifier.
pub fn hasher_by_name(name: &str) -> Bm25Result<Box<dyn TermHasher>> {
    match name {
        DEFAULT_HASH_FUNCTION => Ok(Box::new(Murmur3Hasher)),
        other => Err(Bm25Error::UnsupportedHashFunction(other.to_string())),
    }
}

#[inline]
fn mix_k1(mut k1: u32) -> u32 {
    k1 = k1.wrapping_mul(0xcc9e_2d51);
    k1 = k1.rotate_left(15);
    k1.wrapping_mul(0x1b87_3593)
}

fn murmur3_x86_32(data: &[u8], seed: u32) -> u32 {
    let mut h1 = seed;

    let mut blocks = data.chunks_exact(4);
    for block in &mut blocks {
        let k = u32::from_le_bytes([block[0], block[1], block[2], block[3]]);
        h1 ^= mix_k1(k);
        h1 = h1.rotate_left(13);
        h1 = h1.wrapping_mul(5).wrapping_add(0xe654_6b64);
    }

    let tail = blocks.remainder();
    if !tail.is_empty() {
        let mut k1: u32 = 0;
        for (i, &byte) in tail.iter().enumerate() {
            k1 ^= (byte as u32) << (8 * i);
        }
        h1 ^= mix_k1(k1);
    }

    h1 ^= data.len() as u32;
    h1 ^= h1 >> 16;
    h1 = h1.wrapping_mul(0x85eb_ca6b);
    h1 ^= h1 >> 13;
    h1 = h1.wrapping_mul(0xc2b2_ae35);
    h1 ^= h1 >> 16;
    h1
}
