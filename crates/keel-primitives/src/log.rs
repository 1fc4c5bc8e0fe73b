//! Event log entry as delivered by a node

use crate::{Address, H256};

/// A single log record emitted by a contract.
///
/// Only the fields needed to decode an event are kept: the emitting
/// address, the ordered topics and the opaque data payload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LogEntry {
    /// Emitting contract
    pub address: Address,
    /// Indexed topics, selector topic first for non-anonymous events
    pub topics: Vec<H256>,
    /// ABI-encoded non-indexed fields
    #[cfg_attr(feature = "serde", serde(with = "hex_data"))]
    pub data: Vec<u8>,
}

impl LogEntry {
    /// Create a log entry
    pub fn new(address: Address, topics: Vec<H256>, data: Vec<u8>) -> Self {
        Self {
            address,
            topics,
            data,
        }
    }
}

#[cfg(feature = "serde")]
mod hex_data {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(data)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s.strip_prefix("0x").unwrap_or(&s)).map_err(de::Error::custom)
    }
}
