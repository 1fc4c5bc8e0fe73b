//! Classification of revert payloads

use std::fmt;

use keel_primitives::U256;

use crate::abi::{FieldValues, Value};
use crate::error::AbiError;
use crate::interface::{legacy_error, panic_error, ContractAbi, Error};

/// Solidity panic codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanicReason {
    /// 0x00: generic compiler-inserted panic
    Generic,
    /// 0x01: failed `assert`
    Assertion,
    /// 0x11: arithmetic overflow or underflow outside `unchecked`
    ArithmeticOverflow,
    /// 0x12: division or modulo by zero
    DivisionByZero,
    /// 0x21: conversion of an out-of-range value into an enum
    InvalidEnumValue,
    /// 0x22: access to an incorrectly encoded storage byte array
    InvalidStorageEncoding,
    /// 0x31: `.pop()` on an empty array
    EmptyArrayPop,
    /// 0x32: out-of-bounds array or slice access
    OutOfBounds,
    /// 0x41: too much memory allocated, or an array that is too large
    OutOfMemory,
    /// 0x51: call of a zero-initialized internal function variable
    ZeroInitializedFunction,
    /// Any other code
    Unknown(U256),
}

impl PanicReason {
    /// Classify a panic code
    pub fn from_code(code: U256) -> Self {
        if code > U256::from(u8::MAX) {
            return PanicReason::Unknown(code);
        }
        match code.low_u32() {
            0x00 => PanicReason::Generic,
            0x01 => PanicReason::Assertion,
            0x11 => PanicReason::ArithmeticOverflow,
            0x12 => PanicReason::DivisionByZero,
            0x21 => PanicReason::InvalidEnumValue,
            0x22 => PanicReason::InvalidStorageEncoding,
            0x31 => PanicReason::EmptyArrayPop,
            0x32 => PanicReason::OutOfBounds,
            0x41 => PanicReason::OutOfMemory,
            0x51 => PanicReason::ZeroInitializedFunction,
            _ => PanicReason::Unknown(code),
        }
    }

    /// The numeric code
    pub fn code(&self) -> U256 {
        let code: u8 = match self {
            PanicReason::Generic => 0x00,
            PanicReason::Assertion => 0x01,
            PanicReason::ArithmeticOverflow => 0x11,
            PanicReason::DivisionByZero => 0x12,
            PanicReason::InvalidEnumValue => 0x21,
            PanicReason::InvalidStorageEncoding => 0x22,
            PanicReason::EmptyArrayPop => 0x31,
            PanicReason::OutOfBounds => 0x32,
            PanicReason::OutOfMemory => 0x41,
            PanicReason::ZeroInitializedFunction => 0x51,
            PanicReason::Unknown(code) => return *code,
        };
        U256::from(code)
    }
}

impl fmt::Display for PanicReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let description = match self {
            PanicReason::Generic => "generic panic",
            PanicReason::Assertion => "assertion failed",
            PanicReason::ArithmeticOverflow => "arithmetic overflow or underflow",
            PanicReason::DivisionByZero => "division or modulo by zero",
            PanicReason::InvalidEnumValue => "invalid enum value",
            PanicReason::InvalidStorageEncoding => "incorrectly encoded storage byte array",
            PanicReason::EmptyArrayPop => "pop on an empty array",
            PanicReason::OutOfBounds => "array index out of bounds",
            PanicReason::OutOfMemory => "out of memory",
            PanicReason::ZeroInitializedFunction => "call to a zero-initialized function",
            PanicReason::Unknown(code) => return write!(f, "unknown panic code {code:#x}"),
        };
        f.write_str(description)
    }
}

/// A decoded contract revert
#[derive(Debug, Clone, PartialEq)]
pub enum ContractRevert<'a> {
    /// `Panic(uint256)`
    Panic(PanicReason),
    /// `Error(string)`, or a revert without data
    Legacy(String),
    /// A custom error declared in the ABI
    Custom {
        /// The matching declaration
        error: &'a Error,
        /// Decoded fields
        data: FieldValues,
    },
}

impl fmt::Display for ContractRevert<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractRevert::Panic(reason) => write!(f, "panic: {reason}"),
            ContractRevert::Legacy(message) => write!(f, "reverted: {message}"),
            ContractRevert::Custom { error, data } => {
                write!(f, "{}(", error.name())?;
                for (i, (name, value)) in data.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    match name {
                        Some(name) => write!(f, "{name}={value:?}")?,
                        None => write!(f, "{value:?}")?,
                    }
                }
                f.write_str(")")
            }
        }
    }
}

/// Classify revert data returned by a call to a contract with this ABI.
///
/// Empty data is a legacy revert with an empty message.
pub fn decode_revert<'a>(abi: &'a ContractAbi, data: &[u8]) -> Result<ContractRevert<'a>, AbiError> {
    if data.is_empty() {
        return Ok(ContractRevert::Legacy(String::new()));
    }

    let (error, fields) = abi.resolve_error(data)?;
    if std::ptr::eq(error, panic_error()) {
        let code = fields
            .get("code")
            .and_then(Value::as_uint)
            .ok_or_else(|| AbiError::value("uint256", "missing panic code"))?;
        return Ok(ContractRevert::Panic(PanicReason::from_code(code)));
    }
    if std::ptr::eq(error, legacy_error()) {
        let message = fields
            .get("message")
            .and_then(Value::as_str)
            .ok_or_else(|| AbiError::value("string", "missing revert message"))?;
        return Ok(ContractRevert::Legacy(message.to_string()));
    }
    Ok(ContractRevert::Custom { error, data: fields })
}
