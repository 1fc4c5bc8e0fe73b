//! # keel-sdk
//!
//! Ethereum contract ABI toolkit.
//!
//! ## Features
//!
//! - **abi**: ABI types, value validation, tuple encoding/decoding, event topics
//! - **interface**: Methods (with overloading), events, errors and JSON ABI loading
//! - **contract**: Contracts bound to bytecode or to a deployed address
//! - **revert**: Classification of revert data (panics, `require` messages, custom errors)
//! - **multicall**: Batching calls through Multicall3
//!
//! Nothing here performs I/O; payloads are handed to whatever provider the
//! application uses.
//!
//! ## Quick Start
//!
//! ```rust
//! use keel_sdk::abi::{Args, Value};
//! use keel_sdk::contract::DeployedContract;
//! use keel_sdk::interface::{ContractAbi, Output};
//! use keel_sdk::Address;
//!
//! let abi = ContractAbi::from_json_str(r#"[
//!     {"type": "function", "name": "transfer", "stateMutability": "nonpayable",
//!      "inputs": [{"name": "to", "type": "address"}, {"name": "amount", "type": "uint256"}],
//!      "outputs": [{"name": "", "type": "bool"}]}
//! ]"#)?;
//! let token = DeployedContract::new(abi, Address::ZERO);
//!
//! let call = token.method("transfer", &Args::new().arg(Address::ZERO).arg(1000u64))?;
//! assert_eq!(&call.data()[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
//! assert!(call.mutating());
//!
//! let mut returned = [0u8; 32];
//! returned[31] = 1;
//! assert_eq!(call.decode_output(&returned)?, Output::Value(Value::Bool(true)));
//! # Ok::<(), keel_sdk::AbiError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod abi;
pub mod contract;
mod error;
pub mod interface;
pub mod multicall;
pub mod revert;

pub use error::{AbiError, DecodeError};

// Re-export primitives for convenience
pub use keel_primitives::{Address, LogEntry, H256, U256};
