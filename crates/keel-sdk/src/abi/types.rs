//! ABI type definitions

use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

use keel_primitives::{Address, H256, U256};

use super::decode::{decode_tuple, decode_word};
use super::encode::encode;
use super::topic;
use super::value::{Integer, StructValue, Token, Value};
use crate::error::AbiError;

/// Maximum bits in an `int` or `uint` type
pub const MAX_INTEGER_BITS: u16 = 256;

/// Maximum size of a fixed `bytes` type
pub const MAX_BYTES_SIZE: u8 = 32;

/// The eight ABI type kinds
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// `uint<bits>`
    UInt(u16),
    /// `int<bits>`
    Int(u16),
    /// `bytes<size>`, or dynamic `bytes` when the size is `None`
    Bytes(Option<u8>),
    /// `address`
    Address,
    /// `string`
    String,
    /// `bool`
    Bool,
    /// `T[size]`, or `T[]` when the size is `None`
    Array(Box<Type>, Option<usize>),
    /// Struct with named, ordered fields
    Struct(Vec<(String, Type)>),
}

/// A Solidity ABI type.
///
/// Built through the validating constructors, so every `Type` satisfies the
/// bit-width and size invariants. The canonical form is computed on first
/// use and cached.
#[derive(Clone)]
pub struct Type {
    kind: TypeKind,
    canonical: OnceLock<String>,
}

impl Type {
    pub(crate) fn from_kind(kind: TypeKind) -> Self {
        Self {
            kind,
            canonical: OnceLock::new(),
        }
    }

    /// `uint<bits>`; `bits` must be a multiple of 8 in `8..=256`
    pub fn uint(bits: u16) -> Result<Self, AbiError> {
        if bits == 0 || bits > MAX_INTEGER_BITS || bits % 8 != 0 {
            return Err(AbiError::declaration(format!("Incorrect `uint` bit size: {bits}")));
        }
        Ok(Self::from_kind(TypeKind::UInt(bits)))
    }

    /// `int<bits>`; `bits` must be a multiple of 8 in `8..=256`
    pub fn int(bits: u16) -> Result<Self, AbiError> {
        if bits == 0 || bits > MAX_INTEGER_BITS || bits % 8 != 0 {
            return Err(AbiError::declaration(format!("Incorrect `int` bit size: {bits}")));
        }
        Ok(Self::from_kind(TypeKind::Int(bits)))
    }

    /// `uint256`
    pub fn uint256() -> Self {
        Self::from_kind(TypeKind::UInt(MAX_INTEGER_BITS))
    }

    /// `int256`
    pub fn int256() -> Self {
        Self::from_kind(TypeKind::Int(MAX_INTEGER_BITS))
    }

    /// `bytes<size>`; `size` must be in `1..=32`
    pub fn bytes(size: usize) -> Result<Self, AbiError> {
        if size == 0 || size > MAX_BYTES_SIZE as usize {
            return Err(AbiError::declaration(format!("Incorrect `bytes` size: {size}")));
        }
        Ok(Self::from_kind(TypeKind::Bytes(Some(size as u8))))
    }

    /// Dynamic `bytes`
    pub fn dynamic_bytes() -> Self {
        Self::from_kind(TypeKind::Bytes(None))
    }

    /// `address`
    pub fn address() -> Self {
        Self::from_kind(TypeKind::Address)
    }

    /// `string`
    pub fn string() -> Self {
        Self::from_kind(TypeKind::String)
    }

    /// `bool`
    pub fn bool() -> Self {
        Self::from_kind(TypeKind::Bool)
    }

    /// `element[size]`, or `element[]` for `None`; a fixed size of 0 is rejected
    pub fn array(element: Type, size: Option<usize>) -> Result<Self, AbiError> {
        if size == Some(0) {
            return Err(AbiError::declaration(format!(
                "Incorrect array size: 0 for `{}`",
                element.canonical_form()
            )));
        }
        Ok(Self::from_kind(TypeKind::Array(Box::new(element), size)))
    }

    /// `element[]`
    pub fn dynamic_array(element: Type) -> Self {
        Self::from_kind(TypeKind::Array(Box::new(element), None))
    }

    /// Struct with fields in declaration order; needs at least one field and
    /// names must be unique
    pub fn structure<S: Into<String>>(
        fields: impl IntoIterator<Item = (S, Type)>,
    ) -> Result<Self, AbiError> {
        let fields: Vec<(String, Type)> = fields.into_iter().map(|(n, t)| (n.into(), t)).collect();
        if fields.is_empty() {
            return Err(AbiError::declaration("Struct must have at least one field"));
        }
        let mut seen = HashSet::new();
        for (name, _) in &fields {
            if !seen.insert(name.as_str()) {
                return Err(AbiError::declaration(format!("Duplicate struct field name: `{name}`")));
            }
        }
        Ok(Self::from_kind(TypeKind::Struct(fields)))
    }

    /// The variant of this type
    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    /// Canonical form, e.g. `uint8[2][]` or `(uint8,bool)`
    pub fn canonical_form(&self) -> &str {
        self.canonical.get_or_init(|| match &self.kind {
            TypeKind::UInt(bits) => format!("uint{bits}"),
            TypeKind::Int(bits) => format!("int{bits}"),
            TypeKind::Bytes(Some(size)) => format!("bytes{size}"),
            TypeKind::Bytes(None) => "bytes".to_string(),
            TypeKind::Address => "address".to_string(),
            TypeKind::String => "string".to_string(),
            TypeKind::Bool => "bool".to_string(),
            TypeKind::Array(element, Some(size)) => format!("{}[{size}]", element.canonical_form()),
            TypeKind::Array(element, None) => format!("{}[]", element.canonical_form()),
            TypeKind::Struct(fields) => {
                let inner: Vec<&str> = fields.iter().map(|(_, t)| t.canonical_form()).collect();
                format!("({})", inner.join(","))
            }
        })
    }

    /// Check if values of this type are encoded out-of-line
    pub fn is_dynamic(&self) -> bool {
        match &self.kind {
            TypeKind::Bytes(None) | TypeKind::String => true,
            TypeKind::Array(_, None) => true,
            TypeKind::Array(element, Some(_)) => element.is_dynamic(),
            TypeKind::Struct(fields) => fields.iter().any(|(_, t)| t.is_dynamic()),
            _ => false,
        }
    }

    /// Value types are topic-encoded in place, reference types are hashed
    pub fn is_value_type(&self) -> bool {
        matches!(
            self.kind,
            TypeKind::UInt(_)
                | TypeKind::Int(_)
                | TypeKind::Bytes(Some(_))
                | TypeKind::Address
                | TypeKind::Bool
        )
    }

    fn mismatch(&self, reason: impl Into<String>) -> AbiError {
        AbiError::value(self.canonical_form(), reason)
    }

    /// Check a caller value and convert it to the codec form
    pub fn normalize(&self, value: &Value) -> Result<Token, AbiError> {
        match (&self.kind, value) {
            (TypeKind::UInt(bits), Value::Int(v)) => {
                if v.is_negative() {
                    return Err(self.mismatch(format!(
                        "must correspond to a non-negative integer, got {v}"
                    )));
                }
                if !v.fits_unsigned(*bits) {
                    return Err(self.mismatch(format!(
                        "must correspond to an unsigned integer under {bits} bits, got {v}"
                    )));
                }
                Ok(Token::Uint(v.abs()))
            }
            (TypeKind::Int(bits), Value::Int(v)) => {
                if !v.fits_signed(*bits) {
                    return Err(self.mismatch(format!(
                        "must correspond to a signed integer under {bits} bits, got {v}"
                    )));
                }
                Ok(Token::Int(*v))
            }
            (TypeKind::UInt(_) | TypeKind::Int(_), other) => Err(self.mismatch(format!(
                "must correspond to an integer, got {}",
                other.kind_name()
            ))),

            (TypeKind::Bytes(size), Value::Bytes(bytes)) => match size {
                Some(size) if bytes.len() != *size as usize => Err(self.mismatch(format!(
                    "expected {size} bytes, got {}",
                    bytes.len()
                ))),
                Some(_) => Ok(Token::FixedBytes(bytes.clone())),
                None => Ok(Token::Bytes(bytes.clone())),
            },
            (TypeKind::Bytes(_), other) => Err(self.mismatch(format!(
                "must correspond to a bytestring, got {}",
                other.kind_name()
            ))),

            (TypeKind::Address, Value::Address(address)) => Ok(Token::Address(*address)),
            (TypeKind::Address, other) => Err(self.mismatch(format!(
                "must correspond to an address, got {}",
                other.kind_name()
            ))),

            (TypeKind::String, Value::String(s)) => Ok(Token::String(s.clone())),
            (TypeKind::String, other) => Err(self.mismatch(format!(
                "must correspond to a string, got {}",
                other.kind_name()
            ))),

            (TypeKind::Bool, Value::Bool(b)) => Ok(Token::Bool(*b)),
            (TypeKind::Bool, other) => Err(self.mismatch(format!(
                "must correspond to a bool, got {}",
                other.kind_name()
            ))),

            (TypeKind::Array(element, size), Value::Array(items)) => {
                if let Some(size) = size {
                    if items.len() != *size {
                        return Err(self.mismatch(format!(
                            "expected {size} elements, got {}",
                            items.len()
                        )));
                    }
                }
                let tokens = items
                    .iter()
                    .map(|item| element.normalize(item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(match size {
                    Some(_) => Token::FixedArray(tokens),
                    None => Token::Array(tokens),
                })
            }
            (TypeKind::Array(..), other) => Err(self.mismatch(format!(
                "expected an array, got {}",
                other.kind_name()
            ))),

            (TypeKind::Struct(fields), Value::Struct(StructValue::ByName(given))) => {
                let names_match = given.len() == fields.len()
                    && fields
                        .iter()
                        .all(|(name, _)| given.iter().any(|(k, _)| k == name));
                if !names_match {
                    let expected: Vec<&str> = fields.iter().map(|(n, _)| n.as_str()).collect();
                    let got: Vec<&str> = given.iter().map(|(n, _)| n.as_str()).collect();
                    return Err(self.mismatch(format!(
                        "expected fields [{}], got [{}]",
                        expected.join(", "),
                        got.join(", ")
                    )));
                }
                let tokens = fields
                    .iter()
                    .map(|(name, ty)| {
                        let item = given
                            .iter()
                            .find(|(k, _)| k == name)
                            .map(|(_, v)| v)
                            .ok_or_else(|| self.mismatch(format!("missing field `{name}`")))?;
                        ty.normalize(item)
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Token::Tuple(tokens))
            }
            (TypeKind::Struct(fields), Value::Struct(StructValue::ByPosition(items))) => {
                if items.len() != fields.len() {
                    return Err(self.mismatch(format!(
                        "expected {} elements, got {}",
                        fields.len(),
                        items.len()
                    )));
                }
                let tokens = fields
                    .iter()
                    .zip(items)
                    .map(|((_, ty), item)| ty.normalize(item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Token::Tuple(tokens))
            }
            (TypeKind::Struct(_), other) => Err(self.mismatch(format!(
                "expected a struct, got {}",
                other.kind_name()
            ))),
        }
    }

    /// Convert a decoded token back into a caller value.
    ///
    /// Structs always come back in the by-name shape.
    pub fn denormalize(&self, token: &Token) -> Result<Value, AbiError> {
        match (&self.kind, token) {
            (TypeKind::UInt(bits), Token::Uint(v)) => {
                let v = Integer::from(*v);
                if !v.fits_unsigned(*bits) {
                    return Err(self.mismatch(format!(
                        "must correspond to an unsigned integer under {bits} bits, got {v}"
                    )));
                }
                Ok(Value::Int(v))
            }
            (TypeKind::Int(bits), Token::Int(v)) => {
                if !v.fits_signed(*bits) {
                    return Err(self.mismatch(format!(
                        "must correspond to a signed integer under {bits} bits, got {v}"
                    )));
                }
                Ok(Value::Int(*v))
            }
            (TypeKind::Bytes(Some(size)), Token::FixedBytes(bytes)) => {
                if bytes.len() != *size as usize {
                    return Err(self.mismatch(format!(
                        "expected {size} bytes, got {}",
                        bytes.len()
                    )));
                }
                Ok(Value::Bytes(bytes.clone()))
            }
            (TypeKind::Bytes(None), Token::Bytes(bytes)) => Ok(Value::Bytes(bytes.clone())),
            (TypeKind::Address, Token::Address(address)) => Ok(Value::Address(*address)),
            (TypeKind::String, Token::String(s)) => Ok(Value::String(s.clone())),
            (TypeKind::Bool, Token::Bool(b)) => Ok(Value::Bool(*b)),
            (TypeKind::Array(element, size), Token::FixedArray(items) | Token::Array(items)) => {
                let shape_ok = match size {
                    Some(size) => matches!(token, Token::FixedArray(_)) && items.len() == *size,
                    None => matches!(token, Token::Array(_)),
                };
                if !shape_ok {
                    return Err(self.mismatch(format!("cannot hold {} elements", items.len())));
                }
                let values = items
                    .iter()
                    .map(|item| element.denormalize(item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::Array(values))
            }
            (TypeKind::Struct(fields), Token::Tuple(items)) => {
                if items.len() != fields.len() {
                    return Err(self.mismatch(format!(
                        "expected {} elements, got {}",
                        fields.len(),
                        items.len()
                    )));
                }
                let named = fields
                    .iter()
                    .zip(items)
                    .map(|((name, ty), item)| Ok((name.clone(), ty.denormalize(item)?)))
                    .collect::<Result<Vec<_>, AbiError>>()?;
                Ok(Value::Struct(StructValue::ByName(named)))
            }
            (_, other) => Err(self.mismatch(format!("cannot be built from {other:?}"))),
        }
    }

    /// Encode a single value as a one-element ABI tuple
    pub fn encode(&self, value: &Value) -> Result<Vec<u8>, AbiError> {
        let token = self.normalize(value)?;
        Ok(encode(std::slice::from_ref(&token)))
    }

    /// Decode a single value encoded as a one-element ABI tuple
    pub fn decode(&self, data: &[u8]) -> Result<Value, AbiError> {
        let mut tokens = decode_tuple(std::iter::once(self), data)
            .map_err(|e| AbiError::decode(format!("({})", self.canonical_form()), e))?;
        match tokens.pop() {
            Some(token) => self.denormalize(&token),
            None => Err(self.mismatch("decoded to an empty tuple")),
        }
    }

    /// Encode a value as an event topic.
    ///
    /// Value types occupy the word directly; reference types are hashed.
    pub fn encode_to_topic(&self, value: &Value) -> Result<H256, AbiError> {
        let token = self.normalize(value)?;
        Ok(topic::encode_outer(&token))
    }

    /// Decode a topic; `Ok(None)` when the value was hashed and cannot be recovered
    pub fn decode_from_topic(&self, word: &H256) -> Result<Option<Value>, AbiError> {
        if !self.is_value_type() {
            return Ok(None);
        }
        let token = decode_word(self, word.as_bytes())
            .map_err(|e| AbiError::decode(self.canonical_form(), e))?;
        self.denormalize(&token).map(Some)
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Eq for Type {}

impl Hash for Type {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Type({})", self.canonical_form())
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypeKind::Struct(fields) => {
                f.write_str("(")?;
                for (i, (name, ty)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{ty} {name}")?;
                }
                f.write_str(")")
            }
            _ => f.write_str(self.canonical_form()),
        }
    }
}

// Word helpers shared by the codec modules

pub(crate) fn uint_word(value: &U256) -> [u8; 32] {
    let mut word = [0u8; 32];
    value.to_big_endian(&mut word);
    word
}

pub(crate) fn address_word(address: &Address) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address.as_bytes());
    word
}

pub(crate) fn fixed_bytes_word(data: &[u8]) -> [u8; 32] {
    let mut word = [0u8; 32];
    let len = data.len().min(32);
    word[..len].copy_from_slice(&data[..len]);
    word
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uint(bits: u16) -> Type {
        Type::uint(bits).unwrap()
    }

    // ==================== Construction ====================

    #[test]
    fn test_integer_bit_sizes() {
        assert!(Type::uint(8).is_ok());
        assert!(Type::int(256).is_ok());
        for bits in [0, 7, 264] {
            let err = Type::uint(bits).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("invalid ABI declaration: Incorrect `uint` bit size: {bits}")
            );
            assert!(Type::int(bits).is_err());
        }
    }

    #[test]
    fn test_bytes_sizes() {
        assert!(Type::bytes(1).is_ok());
        assert!(Type::bytes(32).is_ok());
        assert!(matches!(Type::bytes(0), Err(AbiError::Declaration(_))));
        assert!(matches!(Type::bytes(33), Err(AbiError::Declaration(_))));
    }

    #[test]
    fn test_zero_sized_array_rejected() {
        assert!(Type::array(Type::bool(), Some(0)).is_err());
        assert!(Type::array(Type::bool(), None).is_ok());
    }

    #[test]
    fn test_empty_struct_rejected() {
        let err = Type::structure(Vec::<(String, Type)>::new()).unwrap_err();
        assert!(matches!(err, AbiError::Declaration(_)));
    }

    #[test]
    fn test_struct_duplicate_fields() {
        let err = Type::structure([("a", Type::bool()), ("a", uint(8))]).unwrap_err();
        assert!(err.to_string().contains("Duplicate struct field name"));
    }

    // ==================== Canonical form ====================

    #[test]
    fn test_canonical_forms() {
        assert_eq!(uint(8).canonical_form(), "uint8");
        assert_eq!(Type::int(128).unwrap().canonical_form(), "int128");
        assert_eq!(Type::bytes(4).unwrap().canonical_form(), "bytes4");
        assert_eq!(Type::dynamic_bytes().canonical_form(), "bytes");
        assert_eq!(Type::address().canonical_form(), "address");

        let nested = Type::dynamic_array(Type::array(uint(8), Some(2)).unwrap());
        assert_eq!(nested.canonical_form(), "uint8[2][]");

        let s = Type::structure([("a", uint(8)), ("b", Type::bool())]).unwrap();
        assert_eq!(s.canonical_form(), "(uint8,bool)");
        assert_eq!(s.to_string(), "(uint8 a, bool b)");
    }

    #[test]
    fn test_struct_equality_respects_order() {
        let ab = Type::structure([("a", uint(8)), ("b", Type::bool())]).unwrap();
        let ab2 = Type::structure([("a", uint(8)), ("b", Type::bool())]).unwrap();
        let ba = Type::structure([("b", Type::bool()), ("a", uint(8))]).unwrap();
        assert_eq!(ab, ab2);
        assert_ne!(ab, ba);
    }

    #[test]
    fn test_is_dynamic() {
        assert!(!uint(256).is_dynamic());
        assert!(Type::string().is_dynamic());
        assert!(Type::dynamic_array(Type::bool()).is_dynamic());
        assert!(!Type::array(Type::bool(), Some(3)).unwrap().is_dynamic());
        assert!(Type::array(Type::string(), Some(3)).unwrap().is_dynamic());
        assert!(Type::structure([("s", Type::string())]).unwrap().is_dynamic());
    }

    // ==================== Normalize ====================

    #[test]
    fn test_uint_normalize_errors() {
        let err = uint(8).normalize(&Value::Bool(true)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid value for `uint8`: must correspond to an integer, got bool"
        );

        let err = uint(8).normalize(&Value::from(-1i32)).unwrap_err();
        assert!(err.to_string().contains("must correspond to a non-negative integer, got -1"));

        let err = uint(8).normalize(&Value::from(256u32)).unwrap_err();
        assert!(err
            .to_string()
            .contains("must correspond to an unsigned integer under 8 bits, got 256"));
    }

    #[test]
    fn test_int_normalize_range() {
        let int8 = Type::int(8).unwrap();
        assert_eq!(int8.normalize(&Value::from(-128i32)).unwrap(), Token::Int(Integer::from(-128)));
        let err = int8.normalize(&Value::from(128i32)).unwrap_err();
        assert!(err
            .to_string()
            .contains("must correspond to a signed integer under 8 bits, got 128"));
        assert!(int8.normalize(&Value::from(-129i32)).is_err());
    }

    #[test]
    fn test_bytes_normalize() {
        let bytes4 = Type::bytes(4).unwrap();
        assert_eq!(
            bytes4.normalize(&Value::from(vec![1u8, 2, 3, 4])).unwrap(),
            Token::FixedBytes(vec![1, 2, 3, 4])
        );
        let err = bytes4.normalize(&Value::from(vec![1u8, 2, 3])).unwrap_err();
        assert!(err.to_string().contains("expected 4 bytes, got 3"));
        let err = Type::dynamic_bytes().normalize(&Value::from("abc")).unwrap_err();
        assert!(err.to_string().contains("must correspond to a bytestring, got string"));
    }

    #[test]
    fn test_array_normalize() {
        let arr = Type::array(uint(8), Some(2)).unwrap();
        assert!(arr.normalize(&Value::array([1u8, 2])).is_ok());
        let err = arr.normalize(&Value::array([1u8, 2, 3])).unwrap_err();
        assert!(err.to_string().contains("expected 2 elements, got 3"));
        let err = arr.normalize(&Value::from(1u8)).unwrap_err();
        assert!(err.to_string().contains("expected an array, got integer"));
    }

    #[test]
    fn test_struct_normalize_shapes() {
        let s = Type::structure([("a", uint(8)), ("b", Type::bool())]).unwrap();
        let expected = Token::Tuple(vec![Token::Uint(U256::from(1)), Token::Bool(true)]);

        let by_name = Value::named([("b", Value::Bool(true)), ("a", Value::from(1u8))]);
        assert_eq!(s.normalize(&by_name).unwrap(), expected);

        let by_position = Value::tuple([Value::from(1u8), Value::Bool(true)]);
        assert_eq!(s.normalize(&by_position).unwrap(), expected);

        let wrong_keys = Value::named([("a", Value::from(1u8)), ("c", Value::Bool(true))]);
        let err = s.normalize(&wrong_keys).unwrap_err();
        assert!(err.to_string().contains("expected fields [a, b], got [a, c]"));

        let short = Value::tuple([Value::from(1u8)]);
        assert!(s.normalize(&short).unwrap_err().to_string().contains("expected 2 elements, got 1"));
    }

    #[test]
    fn test_nested_error_names_inner_type() {
        let arr = Type::dynamic_array(uint(8));
        let err = arr.normalize(&Value::array([1u32, 300])).unwrap_err();
        match err {
            AbiError::Value { canonical, .. } => assert_eq!(canonical, "uint8"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    // ==================== Denormalize ====================

    #[test]
    fn test_struct_denormalize_by_name() {
        let s = Type::structure([("a", uint(8)), ("b", Type::bool())]).unwrap();
        let token = Token::Tuple(vec![Token::Uint(U256::from(1)), Token::Bool(false)]);
        assert_eq!(
            s.denormalize(&token).unwrap(),
            Value::named([("a", Value::from(1u8)), ("b", Value::Bool(false))])
        );
    }

    #[test]
    fn test_denormalize_rejects_wrong_token() {
        assert!(Type::bool().denormalize(&Token::Uint(U256::one())).is_err());
        assert!(uint(8).denormalize(&Token::Uint(U256::from(256))).is_err());
    }

    // ==================== Single-value codec ====================

    #[test]
    fn test_single_value_encode_decode() {
        let ty = uint(256);
        let encoded = ty.encode(&Value::from(1u8)).unwrap();
        assert_eq!(encoded.len(), 32);
        assert_eq!(encoded[31], 1);
        assert_eq!(ty.decode(&encoded).unwrap(), Value::from(1u8));

        let s = Type::string();
        let encoded = s.encode(&Value::from("hi")).unwrap();
        assert_eq!(encoded.len(), 96);
        assert_eq!(s.decode(&encoded).unwrap(), Value::from("hi"));
    }

    #[test]
    fn test_decode_error_names_signature() {
        let err = uint(256).decode(&[0u8; 10]).unwrap_err();
        match err {
            AbiError::Decode { signature, .. } => assert_eq!(signature, "(uint256)"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    // ==================== Topics ====================

    #[test]
    fn test_value_type_topic_roundtrip() {
        let ty = Type::int(64).unwrap();
        let topic = ty.encode_to_topic(&Value::from(-5i64)).unwrap();
        assert_eq!(ty.decode_from_topic(&topic).unwrap(), Some(Value::from(-5i64)));

        let addr = Address::from_bytes([7; 20]);
        let topic = Type::address().encode_to_topic(&Value::from(addr)).unwrap();
        assert_eq!(Type::address().decode_from_topic(&topic).unwrap(), Some(Value::from(addr)));
    }

    #[test]
    fn test_reference_type_topic_unrecoverable() {
        let ty = Type::string();
        let topic = ty.encode_to_topic(&Value::from("hello")).unwrap();
        assert_eq!(topic, keel_crypto::keccak256(b"hello"));
        assert_eq!(ty.decode_from_topic(&topic).unwrap(), None);
        assert_eq!(Type::dynamic_bytes().decode_from_topic(&topic).unwrap(), None);
        assert_eq!(Type::dynamic_array(uint(8)).decode_from_topic(&topic).unwrap(), None);
    }
}
