//! ABI type system and tuple codec
//!
//! This module provides functionality for:
//! - Declaring ABI types and parsing type strings
//! - Validating caller values against types (normalize/denormalize)
//! - Encoding and decoding ABI tuples
//! - Encoding indexed event fields as topics
//! - Computing method, error and event selectors
//!
//! # Example
//!
//! ```rust
//! use keel_sdk::abi::{Args, Fields, Type, Value};
//!
//! let inputs = Fields::named([
//!     ("to", Type::address()),
//!     ("amount", Type::uint(256).unwrap()),
//! ])
//! .unwrap();
//! assert_eq!(inputs.canonical_form(), "(address,uint256)");
//!
//! let args = Args::new()
//!     .kwarg("amount", 1000u64)
//!     .kwarg("to", keel_sdk::Address::ZERO);
//! let data = inputs.encode(&args).unwrap();
//! assert_eq!(data.len(), 64);
//!
//! let decoded = inputs.decode(&data).unwrap();
//! assert_eq!(decoded["amount"], Value::from(1000u64));
//! ```

mod decode;
mod encode;
mod fields;
mod parse;
mod selector;
mod topic;
mod types;
mod value;

pub use encode::encode;
pub use fields::{sanitize_identifier, Args, FieldValues, Fields, Param};
pub use parse::{parse_type, type_from_abi_string};
pub use selector::{event_topic, selector, Selector};
pub use types::{Type, TypeKind, MAX_BYTES_SIZE, MAX_INTEGER_BITS};
pub use value::{Integer, StructValue, Token, Value};

pub(crate) use parse::parse_type_with;
