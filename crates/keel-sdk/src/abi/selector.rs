//! Method, error and event selectors

use std::fmt;

use keel_crypto::keccak256_concat;
use keel_primitives::H256;

/// 4-byte selector identifying a method or a custom error
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Selector([u8; 4]);

impl Selector {
    /// Size in bytes
    pub const LEN: usize = 4;

    /// Create from bytes
    pub const fn from_bytes(bytes: [u8; 4]) -> Self {
        Selector(bytes)
    }

    /// Take the selector from the start of a payload
    pub fn from_prefix(data: &[u8]) -> Option<Self> {
        let bytes: [u8; 4] = data.get(..Self::LEN)?.try_into().ok()?;
        Some(Selector(bytes))
    }

    /// Get as bytes
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Selector({})", self.to_hex())
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl AsRef<[u8]> for Selector {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// `keccak256(name ++ canonical)[..4]`, where `canonical` is the
/// parenthesized input list, e.g. `"(address,uint256)"`
pub fn selector(name: &str, canonical: &str) -> Selector {
    let hash = keccak256_concat([name.as_bytes(), canonical.as_bytes()]);
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&hash.as_bytes()[..4]);
    Selector(bytes)
}

/// Full `keccak256(name ++ canonical)`, used as the first topic of a
/// non-anonymous event
pub fn event_topic(name: &str, canonical: &str) -> H256 {
    keccak256_concat([name.as_bytes(), canonical.as_bytes()])
}
