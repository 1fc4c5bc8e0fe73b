//! # keel-primitives
//!
//! Fixed-size value types used by the Keel contract ABI toolkit.
//!
//! This crate provides the 20-byte account address, the 32-byte word used
//! for hashes and log topics, and the log entry shape handed over by an
//! RPC collaborator.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod address;
mod hash;
mod log;

pub use address::{Address, AddressError};
pub use hash::{HashError, H256};
pub use log::LogEntry;

// Re-export primitive-types for U256
pub use primitive_types::U256;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u256_word_roundtrip() {
        let value = U256::from(0x1234_5678u64);
        let mut word = [0u8; 32];
        value.to_big_endian(&mut word);
        assert_eq!(U256::from_big_endian(&word), value);
        assert_eq!(&word[28..], &[0x12, 0x34, 0x56, 0x78]);
    }
}
