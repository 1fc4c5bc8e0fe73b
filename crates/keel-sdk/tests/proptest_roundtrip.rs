//! Property tests for value validation and the tuple codec

use keel_sdk::abi::{Fields, Integer, Type, Value};
use keel_sdk::{Address, U256};
use proptest::prelude::*;

fn any_u256() -> impl Strategy<Value = U256> {
    prop::array::uniform32(any::<u8>()).prop_map(|bytes| U256::from_big_endian(&bytes))
}

proptest! {
    #[test]
    fn uint256_round_trips(value in any_u256()) {
        let ty = Type::uint256();
        let value = Value::from(value);
        let encoded = ty.encode(&value).unwrap();
        prop_assert_eq!(encoded.len(), 32);
        prop_assert_eq!(ty.decode(&encoded).unwrap(), value);
    }

    #[test]
    fn signed_integers_round_trip(value in any::<i64>(), bits in prop::sample::select(vec![64u16, 128, 256])) {
        let ty = Type::int(bits).unwrap();
        let value = Value::from(value);
        let token = ty.normalize(&value).unwrap();
        prop_assert_eq!(ty.denormalize(&token).unwrap(), value.clone());
        prop_assert_eq!(ty.decode(&ty.encode(&value).unwrap()).unwrap(), value);
    }

    #[test]
    fn narrow_uint_range_is_enforced(value in any::<u16>()) {
        let ty = Type::uint(8).unwrap();
        let result = ty.encode(&Value::from(value));
        prop_assert_eq!(result.is_ok(), value <= u16::from(u8::MAX));
    }

    #[test]
    fn negative_values_rejected_by_uint(value in i64::MIN..0) {
        prop_assert!(Type::uint256().encode(&Value::from(value)).is_err());
        prop_assert!(Integer::from(value).is_negative());
    }

    #[test]
    fn dynamic_values_round_trip(
        data in prop::collection::vec(any::<u8>(), 0..100),
        text in ".{0,40}",
        flags in prop::collection::vec(any::<bool>(), 0..8),
        address in prop::array::uniform20(any::<u8>()),
    ) {
        let fields = Fields::named([
            ("data", Type::dynamic_bytes()),
            ("text", Type::string()),
            ("flags", Type::dynamic_array(Type::bool())),
            ("owner", Type::address()),
        ])
        .unwrap();
        let values = vec![
            Value::Bytes(data),
            Value::String(text),
            Value::array(flags),
            Value::Address(Address::from(address)),
        ];

        let encoded = fields.encode_values(&values).unwrap();
        prop_assert_eq!(encoded.len() % 32, 0);
        let decoded = fields.decode(&encoded).unwrap();
        prop_assert_eq!(decoded.into_tuple(), values);
    }

    #[test]
    fn fixed_bytes_round_trip(data in prop::collection::vec(any::<u8>(), 1..=32)) {
        let ty = Type::bytes(data.len()).unwrap();
        let value = Value::Bytes(data);
        prop_assert_eq!(ty.decode(&ty.encode(&value).unwrap()).unwrap(), value);
    }

    #[test]
    fn truncated_payloads_never_panic(data in prop::collection::vec(any::<u8>(), 0..160)) {
        let fields = Fields::anonymous([
            Type::string(),
            Type::dynamic_array(Type::uint256()),
        ]);
        let _ = fields.decode(&data);
    }
}
