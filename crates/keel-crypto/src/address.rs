//! Contract address derivation

use crate::hash::{keccak256, keccak256_concat};
use keel_primitives::{Address, H256};

/// Address of a contract deployed with `CREATE2` (EIP-1014).
///
/// `keccak256(0xff ++ sender ++ salt ++ keccak256(init_code))[12..]`
pub fn create2_address(sender: &Address, salt: &H256, init_code: &[u8]) -> Address {
    let code_hash = keccak256(init_code);
    let hash = keccak256_concat([
        &[0xffu8][..],
        &sender.as_bytes()[..],
        &salt.as_bytes()[..],
        &code_hash.as_bytes()[..],
    ]);

    let mut addr_bytes = [0u8; 20];
    addr_bytes.copy_from_slice(&hash.as_bytes()[12..]);
    Address::from_bytes(addr_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> Address {
        Address::from_hex(s).unwrap()
    }

    fn salt(s: &str) -> H256 {
        H256::from_hex(s).unwrap()
    }

    // ==================== EIP-1014 vectors ====================

    #[test]
    fn test_create2_zero_sender() {
        let address = create2_address(&Address::ZERO, &H256::ZERO, &[0x00]);
        assert_eq!(address.to_string(), "0x4D1A2e2bB4F88F0250f26Ffff098B0b30B26BF38");
    }

    #[test]
    fn test_create2_sender_and_salt() {
        let sender = addr("0xdeadbeef00000000000000000000000000000000");
        assert_eq!(
            create2_address(&sender, &H256::ZERO, &[0x00]).to_string(),
            "0xB928f69Bb1D91Cd65274e3c79d8986362984fDA3"
        );
        let feed = salt("0x000000000000000000000000feed000000000000000000000000000000000000");
        assert_eq!(
            create2_address(&sender, &feed, &[0x00]).to_string(),
            "0xD04116cDd17beBE565EB2422F2497E06cC1C9833"
        );
    }

    #[test]
    fn test_create2_init_code() {
        let sender = addr("0x00000000000000000000000000000000deadbeef");
        let cafebabe = salt("0x00000000000000000000000000000000000000000000000000000000cafebabe");
        assert_eq!(
            create2_address(&sender, &cafebabe, &[0xde, 0xad, 0xbe, 0xef]).to_string(),
            "0x60f3f640a8508fC6a86d45DF051962668E1e8AC7"
        );
    }

    #[test]
    fn test_create2_empty_init_code() {
        assert_eq!(
            create2_address(&Address::ZERO, &H256::ZERO, &[]).to_string(),
            "0xE33C0C7F7df4809055C3ebA6c09CFe4BaF1BD9e0"
        );
    }
}
