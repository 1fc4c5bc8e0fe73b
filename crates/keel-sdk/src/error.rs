//! SDK error types

use thiserror::Error;

use crate::abi::Selector;

/// ABI error type
#[derive(Debug, Error)]
pub enum AbiError {
    /// Malformed or self-contradictory ABI declaration
    #[error("invalid ABI declaration: {0}")]
    Declaration(String),

    /// A caller-supplied value does not fit the declared type
    #[error("invalid value for `{canonical}`: {reason}")]
    Value {
        /// Canonical form of the type the value was checked against
        canonical: String,
        /// What was expected and what was given
        reason: String,
    },

    /// Arguments could not be bound to the declared parameters
    #[error("argument binding error: {0}")]
    Binding(String),

    /// A byte payload could not be unpacked
    #[error("could not decode the value with the expected signature {signature}: {source}")]
    Decode {
        /// Canonical form that decoding was attempted against
        signature: String,
        /// Underlying cause
        #[source]
        source: DecodeError,
    },

    /// None of the overloads accepted the arguments
    #[error("could not find a suitable overload of `{name}` among {}", .candidates.join(", "))]
    NoMatchingOverload {
        /// Method name
        name: String,
        /// Input signatures of every overload
        candidates: Vec<String>,
    },

    /// Error payload cannot hold a selector
    #[error("error data too short to contain a selector: {0} bytes")]
    ErrorDataTooShort(usize),

    /// Error payload selector is not registered
    #[error("could not find an error with selector {0} in the ABI")]
    UnknownErrorSelector(Selector),

    /// Decoded values keyed by name, but the field at this position has none
    #[error("field {0} is anonymous and cannot be looked up by name")]
    AnonymousField(usize),

    /// Lookup of an entry the ABI does not declare
    #[error("unknown {kind}: `{name}`")]
    UnknownEntry {
        /// Entry kind (method, event, error)
        kind: &'static str,
        /// Requested name
        name: String,
    },

    /// Malformed JSON input
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AbiError {
    pub(crate) fn declaration(message: impl Into<String>) -> Self {
        AbiError::Declaration(message.into())
    }

    pub(crate) fn value(canonical: &str, reason: impl Into<String>) -> Self {
        AbiError::Value {
            canonical: canonical.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn decode(signature: impl Into<String>, source: DecodeError) -> Self {
        AbiError::Decode {
            signature: signature.into(),
            source,
        }
    }
}

/// Cause of a decoding failure
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// Payload ends before a required word or byte run
    #[error("tried to read {need} bytes at offset {offset}, only got {have}")]
    InsufficientData {
        /// Position of the read
        offset: usize,
        /// Bytes required from `offset`
        need: usize,
        /// Total payload length
        have: usize,
    },

    /// An offset or length word does not fit in memory
    #[error("offset or length word out of range")]
    Overflow,

    /// Padding bytes of a word are not zero (or not a sign extension)
    #[error("non-empty padding bytes in `{0}` word")]
    InvalidPadding(String),

    /// A `bool` word other than 0 or 1
    #[error("invalid boolean word")]
    InvalidBool,

    /// A `string` payload that is not UTF-8
    #[error("invalid UTF-8 in string: {0}")]
    InvalidUtf8(String),

    /// Topic count of a log entry does not match the event declaration
    #[error(
        "the number of topics in the log entry ({got}) does not match \
         the number of indexed fields in the event ({expected})"
    )]
    TopicCount {
        /// Indexed fields declared
        expected: usize,
        /// Topics present after the selector topic
        got: usize,
    },

    /// The selector topic names another event
    #[error("this log entry belongs to a different event")]
    ForeignEvent,

    /// The log entry was emitted by another contract
    #[error("log entry originates from a different contract ({0})")]
    ForeignContract(String),
}
