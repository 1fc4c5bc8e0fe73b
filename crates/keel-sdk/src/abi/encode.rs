//! ABI encoding

use keel_primitives::U256;

use super::types::{address_word, fixed_bytes_word, uint_word};
use super::value::Token;

/// Encode normalized tokens as an ABI tuple (head/tail layout)
pub fn encode(tokens: &[Token]) -> Vec<u8> {
    let head_size: usize = tokens.iter().map(head_length).sum();

    let mut head = Vec::with_capacity(head_size);
    let mut tail = Vec::new();

    for token in tokens {
        if token.is_dynamic() {
            // Offset into the tail, relative to the start of this tuple
            let offset = head_size + tail.len();
            head.extend_from_slice(&uint_word(&U256::from(offset)));
            encode_token(token, &mut tail);
        } else {
            encode_token(token, &mut head);
        }
    }

    head.extend(tail);
    head
}

/// Bytes occupied in the head section
fn head_length(token: &Token) -> usize {
    match token {
        Token::FixedArray(tokens) | Token::Tuple(tokens) if !token.is_dynamic() => {
            tokens.iter().map(head_length).sum()
        }
        _ => 32,
    }
}

fn encode_token(token: &Token, out: &mut Vec<u8>) {
    match token {
        Token::Uint(value) => out.extend_from_slice(&uint_word(value)),
        Token::Int(value) => out.extend_from_slice(&value.to_twos_complement()),
        Token::Bool(b) => out.extend_from_slice(&uint_word(&U256::from(*b as u8))),
        Token::Address(address) => out.extend_from_slice(&address_word(address)),
        Token::FixedBytes(data) => out.extend_from_slice(&fixed_bytes_word(data)),
        Token::Bytes(data) => encode_bytes(data, out),
        Token::String(s) => encode_bytes(s.as_bytes(), out),
        Token::Array(tokens) => {
            out.extend_from_slice(&uint_word(&U256::from(tokens.len())));
            out.extend(encode(tokens));
        }
        Token::FixedArray(tokens) | Token::Tuple(tokens) => out.extend(encode(tokens)),
    }
}

/// Length word followed by the data, right-padded to a word boundary
fn encode_bytes(data: &[u8], out: &mut Vec<u8>) {
    out.extend_from_slice(&uint_word(&U256::from(data.len())));
    out.extend_from_slice(data);
    out.resize(out.len() + padding(data.len()), 0);
}

/// Zero bytes needed after `len` bytes to reach a word boundary
pub(crate) fn padding(len: usize) -> usize {
    (32 - len % 32) % 32
}
