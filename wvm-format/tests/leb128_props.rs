//! Property tests for the LEB128 codec.

use proptest::prelude::*;
use wvm_format::binary;

proptest! {
    #[test]
    fn unsigned_roundtrip(value in any::<u64>()) {
        let bytes = binary::write_leb128_u64(value);
        let (decoded, consumed) = binary::read_leb128_u64(&bytes, 0).unwrap();
        prop_assert_eq!(decoded, value);
        prop_assert_eq!(consumed, bytes.len());
    }

    #[test]
    fn unsigned_u32_roundtrip(value in any::<u32>()) {
        let bytes = binary::write_leb128_u32(value);
        let (decoded, consumed) = binary::read_leb128_u32(&bytes, 0).unwrap();
        prop_assert_eq!(decoded, value);
        prop_assert_eq!(consumed, bytes.len());
        // a 32-bit value never needs more than ceil(32/7) groups
        prop_assert!(bytes.len() <= 5);
    }

    #[test]
    fn signed_roundtrip(value in any::<i64>()) {
        let bytes = binary::write_leb128_i64(value);
        let (decoded, consumed) = binary::read_leb128_i64(&bytes, 0).unwrap();
        prop_assert_eq!(decoded, value);
        prop_assert_eq!(consumed, bytes.len());
    }

    #[test]
    fn signed_i32_roundtrip(value in any::<i32>()) {
        let bytes = binary::write_leb128_i32(value);
        let (decoded, consumed) = binary::read_leb128_i32(&bytes, 0).unwrap();
        prop_assert_eq!(decoded, value);
        prop_assert_eq!(consumed, bytes.len());
    }

    #[test]
    fn decoding_ignores_trailing_bytes(value in any::<u32>(), trailer in any::<Vec<u8>>()) {
        let mut bytes = binary::write_leb128_u32(value);
        let encoded_len = bytes.len();
        bytes.extend_from_slice(&trailer);
        let (decoded, consumed) = binary::read_leb128_u32(&bytes, 0).unwrap();
        prop_assert_eq!(decoded, value);
        prop_assert_eq!(consumed, encoded_len);
    }

    #[test]
    fn string_roundtrip(text in ".*") {
        let bytes = binary::write_string(&text);
        let (decoded, consumed) = binary::read_string(&bytes, 0).unwrap();
        prop_assert_eq!(decoded, text);
        prop_assert_eq!(consumed, bytes.len());
    }
}
