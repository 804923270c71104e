use proptest::prelude::*;

use sova_types::amount::{denormalize, mul_div, normalize, normalize_up, SHARE_DECIMALS};
use sova_types::{Address, RequestId, Timestamp};

proptest! {
    /// Assets with more than 8 decimals truncate toward zero when normalized.
    #[test]
    fn normalize_truncates_high_precision(amount in 0u128..u128::MAX / 2, decimals in 9u8..=30) {
        let scale = 10u128.pow(u32::from(decimals - SHARE_DECIMALS));
        let n = normalize(amount, decimals).unwrap();
        prop_assert_eq!(n, amount / scale);
        prop_assert!(n * scale <= amount);
        prop_assert!(amount - n * scale < scale);
    }

    /// Assets with at most 8 decimals normalize exactly and invert losslessly.
    #[test]
    fn normalize_is_exact_for_low_precision(amount in 0u128..1_000_000_000_000_000_000u128, decimals in 0u8..=8) {
        let n = normalize(amount, decimals).unwrap();
        prop_assert_eq!(denormalize(n, decimals).unwrap(), amount);
    }

    /// Rounding up never undershoots and is at most one unit above truncation.
    #[test]
    fn normalize_up_brackets_truncation(amount in 0u128..u128::MAX / 2, decimals in 8u8..=30) {
        let down = normalize(amount, decimals).unwrap();
        let up = normalize_up(amount, decimals).unwrap();
        prop_assert!(up >= down);
        prop_assert!(up - down <= 1);
    }

    /// One whole unit of any supported precision normalizes to 1e8.
    #[test]
    fn one_unit_is_one_share_unit(decimals in 0u8..=38) {
        let one = 10u128.pow(u32::from(decimals));
        prop_assert_eq!(normalize(one, decimals).unwrap(), 100_000_000);
    }

    #[test]
    fn mul_div_matches_wide_arithmetic(a in 0u128..u64::MAX as u128, b in 0u128..u64::MAX as u128, c in 1u128..u64::MAX as u128) {
        prop_assert_eq!(mul_div(a, b, c).unwrap(), a * b / c);
    }

    #[test]
    fn request_id_bincode_roundtrip(bytes in prop::array::uniform32(0u8..)) {
        let id = RequestId::new(bytes);
        let encoded = bincode::serialize(&id).unwrap();
        let decoded: RequestId = bincode::deserialize(&encoded).unwrap();
        prop_assert_eq!(decoded, id);
    }

    #[test]
    fn address_bincode_roundtrip(bytes in prop::array::uniform20(0u8..)) {
        let addr = Address::new(bytes);
        let encoded = bincode::serialize(&addr).unwrap();
        let decoded: Address = bincode::deserialize(&encoded).unwrap();
        prop_assert_eq!(decoded, addr);
    }

    #[test]
    fn timestamp_ordering_matches_seconds(a in 0u64..u64::MAX, b in 0u64..u64::MAX) {
        prop_assert_eq!(Timestamp::new(a) < Timestamp::new(b), a < b);
    }
}
