//! ABI decoding
//!
//! Decoding is driven by the declared types. Offsets are relative to the
//! start of the enclosing tuple, every read is bounds-checked and padding
//! is validated.

use keel_primitives::{Address, U256};

use super::encode::padding;
use super::types::{Type, TypeKind};
use super::value::{Integer, Token};
use crate::error::DecodeError;

/// Decode an ABI tuple of the given types
pub(crate) fn decode_tuple<'a, I>(types: I, data: &[u8]) -> Result<Vec<Token>, DecodeError>
where
    I: Iterator<Item = &'a Type> + Clone,
{
    decode_sequence(types, data, 0)
}

/// Decode one 32-byte word of a value type
pub(crate) fn decode_word(ty: &Type, word: &[u8]) -> Result<Token, DecodeError> {
    decode_value(ty, word, 0)
}

fn decode_sequence<'a, I>(types: I, data: &[u8], base: usize) -> Result<Vec<Token>, DecodeError>
where
    I: Iterator<Item = &'a Type> + Clone,
{
    let mut tokens = Vec::new();
    let mut head = base;

    for ty in types {
        if ty.is_dynamic() {
            let offset = read_usize(data, head)?;
            let position = base.checked_add(offset).ok_or(DecodeError::Overflow)?;
            tokens.push(decode_value(ty, data, position)?);
            head += 32;
        } else {
            tokens.push(decode_value(ty, data, head)?);
            head = head.checked_add(head_length(ty)).ok_or(DecodeError::Overflow)?;
        }
    }

    Ok(tokens)
}

/// Bytes occupied in the head section
fn head_length(ty: &Type) -> usize {
    if ty.is_dynamic() {
        return 32;
    }
    match ty.kind() {
        TypeKind::Array(element, Some(size)) => head_length(element).saturating_mul(*size),
        TypeKind::Struct(fields) => fields.iter().map(|(_, t)| head_length(t)).sum(),
        _ => 32,
    }
}

fn decode_value(ty: &Type, data: &[u8], position: usize) -> Result<Token, DecodeError> {
    match ty.kind() {
        TypeKind::UInt(bits) => {
            let word = read_word(data, position)?;
            let value = U256::from_big_endian(word);
            if value.bits() > *bits as usize {
                return Err(invalid_padding(ty));
            }
            Ok(Token::Uint(value))
        }
        TypeKind::Int(bits) => {
            let word = read_word(data, position)?;
            let value = Integer::from_twos_complement(word);
            if !value.fits_signed(*bits) {
                return Err(invalid_padding(ty));
            }
            Ok(Token::Int(value))
        }
        TypeKind::Bool => {
            let word = read_word(data, position)?;
            match U256::from_big_endian(word) {
                v if v.is_zero() => Ok(Token::Bool(false)),
                v if v == U256::one() => Ok(Token::Bool(true)),
                _ => Err(DecodeError::InvalidBool),
            }
        }
        TypeKind::Address => {
            let word = read_word(data, position)?;
            if word[..12].iter().any(|b| *b != 0) {
                return Err(invalid_padding(ty));
            }
            let mut bytes = [0u8; 20];
            bytes.copy_from_slice(&word[12..]);
            Ok(Token::Address(Address::from_bytes(bytes)))
        }
        TypeKind::Bytes(Some(size)) => {
            let word = read_word(data, position)?;
            let size = *size as usize;
            if word[size..].iter().any(|b| *b != 0) {
                return Err(invalid_padding(ty));
            }
            Ok(Token::FixedBytes(word[..size].to_vec()))
        }
        TypeKind::Bytes(None) => Ok(Token::Bytes(read_bytes(ty, data, position)?.to_vec())),
        TypeKind::String => {
            let bytes = read_bytes(ty, data, position)?;
            let s = std::str::from_utf8(bytes).map_err(|e| DecodeError::InvalidUtf8(e.to_string()))?;
            Ok(Token::String(s.to_string()))
        }
        TypeKind::Array(element, None) => {
            let len = read_usize(data, position)?;
            let start = position + 32;
            // Every element takes at least one word in the head
            let element_size = head_length(element).max(32);
            let available = data.len().saturating_sub(start);
            if len.checked_mul(element_size).map_or(true, |need| need > available) {
                return Err(DecodeError::InsufficientData {
                    offset: start,
                    need: len.saturating_mul(element_size),
                    have: data.len(),
                });
            }
            let tokens = decode_sequence(std::iter::repeat(element.as_ref()).take(len), data, start)?;
            Ok(Token::Array(tokens))
        }
        TypeKind::Array(element, Some(size)) => {
            let tokens =
                decode_sequence(std::iter::repeat(element.as_ref()).take(*size), data, position)?;
            Ok(Token::FixedArray(tokens))
        }
        TypeKind::Struct(fields) => {
            let tokens = decode_sequence(fields.iter().map(|(_, t)| t), data, position)?;
            Ok(Token::Tuple(tokens))
        }
    }
}

fn read_word(data: &[u8], position: usize) -> Result<&[u8], DecodeError> {
    read_slice(data, position, 32)
}

fn read_slice(data: &[u8], position: usize, len: usize) -> Result<&[u8], DecodeError> {
    let end = position.checked_add(len).ok_or(DecodeError::Overflow)?;
    data.get(position..end).ok_or(DecodeError::InsufficientData {
        offset: position,
        need: len,
        have: data.len(),
    })
}

/// Offset or length word
fn read_usize(data: &[u8], position: usize) -> Result<usize, DecodeError> {
    let value = U256::from_big_endian(read_word(data, position)?);
    if value.bits() > usize::BITS as usize {
        return Err(DecodeError::Overflow);
    }
    Ok(value.low_u64() as usize)
}

/// Length-prefixed, zero-padded byte run
fn read_bytes<'d>(ty: &Type, data: &'d [u8], position: usize) -> Result<&'d [u8], DecodeError> {
    let len = read_usize(data, position)?;
    let start = position + 32;
    let padded = len.checked_add(padding(len)).ok_or(DecodeError::Overflow)?;
    let run = read_slice(data, start, padded)?;
    if run[len..].iter().any(|b| *b != 0) {
        return Err(invalid_padding(ty));
    }
    Ok(&run[..len])
}

fn invalid_padding(ty: &Type) -> DecodeError {
    DecodeError::InvalidPadding(ty.canonical_form().to_string())
}
