//! Caller-facing values and their normalized (codec-ready) form

use std::fmt;

use keel_primitives::{Address, U256};

/// An integer in the range covered by every `uint<N>` and `int<N>` type.
///
/// Stored as sign + 256-bit magnitude, so both `uint256::MAX` and
/// `int256::MIN` are representable. Negative zero does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Integer {
    abs: U256,
    negative: bool,
}

impl Integer {
    /// Zero
    pub const ZERO: Integer = Integer {
        abs: U256::zero(),
        negative: false,
    };

    /// Create from magnitude and sign
    pub fn new(abs: U256, negative: bool) -> Self {
        Self {
            abs,
            negative: negative && !abs.is_zero(),
        }
    }

    /// Magnitude
    pub fn abs(&self) -> U256 {
        self.abs
    }

    /// True for values below zero
    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// Check if zero
    pub fn is_zero(&self) -> bool {
        self.abs.is_zero()
    }

    /// The value as `U256`, if non-negative
    pub fn to_u256(&self) -> Option<U256> {
        (!self.negative).then_some(self.abs)
    }

    /// The value as `u64`, if non-negative and small enough
    pub fn to_u64(&self) -> Option<u64> {
        match self.to_u256() {
            Some(v) if v.bits() <= 64 => Some(v.low_u64()),
            _ => None,
        }
    }

    /// The value as `i128`, if it fits
    pub fn to_i128(&self) -> Option<i128> {
        if self.abs.bits() > 127 {
            // i128::MIN has a 128-bit magnitude
            if self.negative && self.abs == U256::one() << 127 {
                return Some(i128::MIN);
            }
            return None;
        }
        let magnitude = self.abs.low_u128() as i128;
        Some(if self.negative { -magnitude } else { magnitude })
    }

    /// Fits in `uint<bits>`
    pub(crate) fn fits_unsigned(&self, bits: u16) -> bool {
        !self.negative && (bits >= 256 || self.abs.bits() <= bits as usize)
    }

    /// Fits in `int<bits>`
    pub(crate) fn fits_signed(&self, bits: u16) -> bool {
        let limit = U256::one() << (bits as usize - 1);
        if self.negative {
            self.abs <= limit
        } else {
            self.abs < limit
        }
    }

    /// 32-byte two's complement word; only meaningful inside the `int256` range
    pub(crate) fn to_twos_complement(&self) -> [u8; 32] {
        let word = if self.negative {
            (!self.abs).overflowing_add(U256::one()).0
        } else {
            self.abs
        };
        let mut bytes = [0u8; 32];
        word.to_big_endian(&mut bytes);
        bytes
    }

    /// Read a 32-byte two's complement word
    pub(crate) fn from_twos_complement(word: &[u8]) -> Self {
        let raw = U256::from_big_endian(word);
        if word[0] & 0x80 != 0 {
            Self::new((!raw).overflowing_add(U256::one()).0, true)
        } else {
            Self::new(raw, false)
        }
    }
}

impl fmt::Display for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            write!(f, "-{}", self.abs)
        } else {
            write!(f, "{}", self.abs)
        }
    }
}

impl From<U256> for Integer {
    fn from(value: U256) -> Self {
        Integer::new(value, false)
    }
}

macro_rules! integer_from_unsigned {
    ($($t:ty),*) => {$(
        impl From<$t> for Integer {
            fn from(value: $t) -> Self {
                Integer::new(U256::from(value), false)
            }
        }
    )*};
}

macro_rules! integer_from_signed {
    ($($t:ty),*) => {$(
        impl From<$t> for Integer {
            fn from(value: $t) -> Self {
                Integer::new(U256::from(value.unsigned_abs()), value < 0)
            }
        }
    )*};
}

integer_from_unsigned!(u8, u16, u32, u64, u128, usize);
integer_from_signed!(i8, i16, i32, i64, i128, isize);

/// A struct value as supplied by a caller: by field name or by position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructValue {
    /// Field name → value; the key set must match the struct exactly
    ByName(Vec<(String, Value)>),
    /// Values in declaration order
    ByPosition(Vec<Value>),
}

/// A caller-facing ABI value.
///
/// Decoding always yields structs in the [`StructValue::ByName`] shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// `uint<N>` / `int<N>`
    Int(Integer),
    /// `bool`
    Bool(bool),
    /// `address`
    Address(Address),
    /// `bytes` / `bytes<N>`
    Bytes(Vec<u8>),
    /// `string`
    String(String),
    /// `T[]` / `T[N]`
    Array(Vec<Value>),
    /// `tuple`
    Struct(StructValue),
}

impl Value {
    /// Struct value by field name
    pub fn named<K: Into<String>>(fields: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Struct(StructValue::ByName(
            fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    /// Struct value by position
    pub fn tuple(values: impl IntoIterator<Item = Value>) -> Self {
        Value::Struct(StructValue::ByPosition(values.into_iter().collect()))
    }

    /// Array value
    pub fn array<T: Into<Value>>(values: impl IntoIterator<Item = T>) -> Self {
        Value::Array(values.into_iter().map(Into::into).collect())
    }

    /// Short name of the variant, used in mismatch messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "integer",
            Value::Bool(_) => "bool",
            Value::Address(_) => "address",
            Value::Bytes(_) => "bytes",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Struct(_) => "struct",
        }
    }

    /// Integer payload
    pub fn as_int(&self) -> Option<&Integer> {
        match self {
            Value::Int(v) => Some(v),
            _ => None,
        }
    }

    /// Non-negative integer payload as `U256`
    pub fn as_uint(&self) -> Option<U256> {
        self.as_int().and_then(Integer::to_u256)
    }

    /// Integer payload as `u64`
    pub fn as_u64(&self) -> Option<u64> {
        self.as_int().and_then(Integer::to_u64)
    }

    /// Boolean payload
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Address payload
    pub fn as_address(&self) -> Option<&Address> {
        match self {
            Value::Address(a) => Some(a),
            _ => None,
        }
    }

    /// Byte payload
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// String payload
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Array elements
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Field of a struct value decoded by name
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Struct(StructValue::ByName(fields)) => {
                fields.iter().find(|(k, _)| k == name).map(|(_, v)| v)
            }
            _ => None,
        }
    }
}

impl From<Integer> for Value {
    fn from(value: Integer) -> Self {
        Value::Int(value)
    }
}

macro_rules! value_from_integer {
    ($($t:ty),*) => {$(
        impl From<$t> for Value {
            fn from(value: $t) -> Self {
                Value::Int(Integer::from(value))
            }
        }
    )*};
}

value_from_integer!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, U256);

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<Address> for Value {
    fn from(value: Address) -> Self {
        Value::Address(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Bytes(value)
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Bytes(value.to_vec())
    }
}

impl<const N: usize> From<[u8; N]> for Value {
    fn from(value: [u8; N]) -> Self {
        Value::Bytes(value.to_vec())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(value)
    }
}

impl From<StructValue> for Value {
    fn from(value: StructValue) -> Self {
        Value::Struct(value)
    }
}

/// Normalized value, shaped exactly like the binary encoding.
///
/// Produced by `Type::normalize`, consumed by the tuple codec and by
/// topic encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Unsigned integer word
    Uint(U256),
    /// Signed integer word
    Int(Integer),
    /// Boolean word
    Bool(bool),
    /// Address, left-padded to a word
    Address(Address),
    /// Fixed-size bytes (1-32), right-padded to a word
    FixedBytes(Vec<u8>),
    /// Dynamic bytes
    Bytes(Vec<u8>),
    /// UTF-8 string
    String(String),
    /// Fixed-size array
    FixedArray(Vec<Token>),
    /// Dynamic array
    Array(Vec<Token>),
    /// Tuple (struct)
    Tuple(Vec<Token>),
}

impl Token {
    /// Check if this token is encoded out-of-line (tail section)
    pub fn is_dynamic(&self) -> bool {
        match self {
            Token::Bytes(_) | Token::String(_) | Token::Array(_) => true,
            Token::FixedArray(tokens) | Token::Tuple(tokens) => tokens.iter().any(Token::is_dynamic),
            _ => false,
        }
    }
}
