//! Keccak-256 hashing

use keel_primitives::H256;
use sha3::{Digest, Keccak256};

/// Compute Keccak-256 hash of the input data
pub fn keccak256(data: &[u8]) -> H256 {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    H256::from_bytes(hasher.finalize().into())
}

/// Keccak-256 over the concatenation of `parts`, without building the joined buffer.
///
/// Selectors hash `name ++ canonical_form`, and hashed topics hash a run of
/// padded words; both are fed here piecewise.
pub fn keccak256_concat<I, T>(parts: I) -> H256
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part.as_ref());
    }
    H256::from_bytes(hasher.finalize().into())
}
