//! Custom errors and the two built-in revert errors

use std::fmt;
use std::sync::OnceLock;

use crate::abi::{selector, Args, FieldValues, Fields, Param, Selector, Type};
use crate::error::AbiError;

/// A Solidity error (custom or built-in)
#[derive(Debug, Clone)]
pub struct Error {
    name: String,
    fields: Fields,
    selector: OnceLock<Selector>,
}

impl Error {
    /// Create an error declaration
    pub fn new(name: impl Into<String>, fields: Fields) -> Self {
        Self {
            name: name.into(),
            fields,
            selector: OnceLock::new(),
        }
    }

    /// Error name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared fields
    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// 4-byte selector of `name(canonical fields)`
    pub fn selector(&self) -> Selector {
        *self
            .selector
            .get_or_init(|| selector(&self.name, self.fields.canonical_form()))
    }

    /// Decode the payload following the selector
    pub fn decode_fields(&self, data: &[u8]) -> Result<FieldValues, AbiError> {
        self.fields.decode(data)
    }

    /// Build a revert payload: `selector ++ encoded fields`
    pub fn encode(&self, args: &Args) -> Result<Vec<u8>, AbiError> {
        let encoded = self.fields.encode(args)?;
        let mut data = Vec::with_capacity(Selector::LEN + encoded.len());
        data.extend_from_slice(self.selector().as_bytes());
        data.extend(encoded);
        Ok(data)
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.fields == other.fields
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error {}{}", self.name, self.fields)
    }
}

/// `Panic(uint256 code)`, raised by failed assertions and runtime checks
pub fn panic_error() -> &'static Error {
    static PANIC: OnceLock<Error> = OnceLock::new();
    PANIC.get_or_init(|| {
        Error::new("Panic", Fields::single(Param::named("code", Type::uint256())))
    })
}

/// `Error(string message)`, raised by `require` and `revert("...")`
pub fn legacy_error() -> &'static Error {
    static LEGACY: OnceLock<Error> = OnceLock::new();
    LEGACY.get_or_init(|| {
        Error::new("Error", Fields::single(Param::named("message", Type::string())))
    })
}
