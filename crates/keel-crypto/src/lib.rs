//! # keel-crypto
//!
//! Hashing used by the contract ABI: Keccak-256 for selectors, event
//! signature topics and hashed indexed values, plus `CREATE2` address
//! derivation.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod address;
mod hash;

pub use address::create2_address;
pub use hash::{keccak256, keccak256_concat};
