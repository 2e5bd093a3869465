use proptest::prelude::*;

use stakegov_types::{Address, Timestamp, VarType};

proptest! {
    /// Display output always parses back to the same address.
    #[test]
    fn address_display_parses_back(bytes in prop::array::uniform20(0u8..)) {
        let addr = Address::new(bytes);
        let parsed: Address = addr.to_string().parse().unwrap();
        prop_assert_eq!(parsed, addr);
    }

    /// Address::is_zero is true only for all-zero bytes.
    #[test]
    fn address_is_zero_correct(bytes in prop::array::uniform20(0u8..)) {
        prop_assert_eq!(Address::new(bytes).is_zero(), bytes == [0u8; 20]);
    }

    /// Unknown variable type codes never decode to a usable type.
    #[test]
    fn var_type_code_is_stable(code in 0u8..=255) {
        let ty = VarType::from_code(code);
        if (1..=6).contains(&code) {
            prop_assert_eq!(ty.code(), code);
            prop_assert!(ty.is_valid());
        } else {
            prop_assert_eq!(ty, VarType::Invalid);
        }
    }

    /// plus_secs never wraps around.
    #[test]
    fn timestamp_plus_secs_is_monotonic(start in 0u64.., delta in 0u64..) {
        let t = Timestamp::new(start);
        prop_assert!(t.plus_secs(delta) >= t);
    }
}
