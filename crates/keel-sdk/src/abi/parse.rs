//! Type-string parsing (`uint256`, `bytes32[2][]`, `tuple[]`, ...)

use super::types::Type;
use crate::error::AbiError;

/// Parse an elementary ABI type string, without array suffixes
pub fn type_from_abi_string(s: &str) -> Result<Type, AbiError> {
    match s {
        "address" => return Ok(Type::address()),
        "string" => return Ok(Type::string()),
        "bool" => return Ok(Type::bool()),
        "bytes" => return Ok(Type::dynamic_bytes()),
        // Shorthands for the 256-bit widths
        "uint" => return Type::uint(256),
        "int" => return Type::int(256),
        _ => {}
    }

    if let Some(bits) = s.strip_prefix("uint").and_then(parse_digits) {
        return match u16::try_from(bits) {
            Ok(bits) => Type::uint(bits),
            Err(_) => Err(AbiError::declaration(format!("Incorrect `uint` bit size: {bits}"))),
        };
    }
    if let Some(bits) = s.strip_prefix("int").and_then(parse_digits) {
        return match u16::try_from(bits) {
            Ok(bits) => Type::int(bits),
            Err(_) => Err(AbiError::declaration(format!("Incorrect `int` bit size: {bits}"))),
        };
    }
    if let Some(size) = s.strip_prefix("bytes").and_then(parse_digits) {
        return Type::bytes(size);
    }

    Err(AbiError::declaration(format!("Unknown type: {s}")))
}

/// Parse a type string, including array suffixes.
///
/// `tuple` cannot be expressed without its components and is rejected;
/// JSON ABI entries go through the interface layer, which supplies them.
pub fn parse_type(s: &str) -> Result<Type, AbiError> {
    parse_type_with(s, &|| {
        Err(AbiError::declaration(format!("`tuple` requires components: {s}")))
    })
}

/// Parse a type string, building the `tuple` base type with `tuple`
pub(crate) fn parse_type_with<F>(s: &str, tuple: &F) -> Result<Type, AbiError>
where
    F: Fn() -> Result<Type, AbiError>,
{
    let s = s.trim();
    if s.is_empty()
        || !s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '[' | ']'))
    {
        return Err(incorrect_format(s));
    }

    if let Some((element, size)) = split_array_suffix(s)? {
        let element = parse_type_with(element, tuple)?;
        return Type::array(element, size);
    }

    if s == "tuple" {
        return tuple();
    }
    type_from_abi_string(s)
}

/// `"uint8[2][]"` → `("uint8[2]", None)`; `None` when there is no suffix
fn split_array_suffix(s: &str) -> Result<Option<(&str, Option<usize>)>, AbiError> {
    let Some(body) = s.strip_suffix(']') else {
        return Ok(None);
    };
    let open = body.rfind('[').ok_or_else(|| incorrect_format(s))?;
    let (element, size) = (&body[..open], &body[open + 1..]);
    if element.is_empty() {
        return Err(incorrect_format(s));
    }
    if size.is_empty() {
        return Ok(Some((element, None)));
    }
    let size = parse_digits(size).ok_or_else(|| incorrect_format(s))?;
    Ok(Some((element, Some(size))))
}

fn parse_digits(s: &str) -> Option<usize> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn incorrect_format(s: &str) -> AbiError {
    AbiError::declaration(format!("Incorrect type format: {s}"))
}
