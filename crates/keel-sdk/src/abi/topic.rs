//! Event topic encoding
//!
//! Topics use a simpler scheme than the tuple codec: value types are a
//! single word, reference types are the keccak hash of their constituent
//! words concatenated without length prefixes.

use keel_crypto::keccak256;
use keel_primitives::{H256, U256};

use super::encode::padding;
use super::types::{address_word, fixed_bytes_word, uint_word};
use super::value::Token;

/// Topic word of an indexed field's normalized value
pub(crate) fn encode_outer(token: &Token) -> H256 {
    match token {
        Token::Bytes(data) => keccak256(data),
        Token::String(s) => keccak256(s.as_bytes()),
        Token::Array(_) | Token::FixedArray(_) | Token::Tuple(_) => {
            let mut inner = Vec::new();
            encode_inner(token, &mut inner);
            keccak256(&inner)
        }
        value => H256::from_bytes(value_word(value)),
    }
}

/// Representation of a value nested inside an indexed array or struct
fn encode_inner(token: &Token, out: &mut Vec<u8>) {
    match token {
        Token::Bytes(data) => pad_into(data, out),
        Token::String(s) => pad_into(s.as_bytes(), out),
        Token::Array(tokens) | Token::FixedArray(tokens) | Token::Tuple(tokens) => {
            for token in tokens {
                encode_inner(token, out);
            }
        }
        value => out.extend_from_slice(&value_word(value)),
    }
}

fn pad_into(data: &[u8], out: &mut Vec<u8>) {
    out.extend_from_slice(data);
    out.resize(out.len() + padding(data.len()), 0);
}

fn value_word(token: &Token) -> [u8; 32] {
    match token {
        Token::Uint(v) => uint_word(v),
        Token::Int(v) => v.to_twos_complement(),
        Token::Bool(b) => uint_word(&U256::from(*b as u8)),
        Token::Address(a) => address_word(a),
        Token::FixedBytes(data) => fixed_bytes_word(data),
        // reference types never reach here
        _ => [0u8; 32],
    }
}
