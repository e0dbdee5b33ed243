//! Tests for the Tomans money type
//!
//! Tests cover construction, checked arithmetic, decimal conversion and
//! serialization.

use core_kernel::{MoneyError, Tomans};
use rust_decimal_macros::dec;

mod creation {
    use super::*;

    #[test]
    fn test_new_accepts_zero_and_positive() {
        assert_eq!(Tomans::new(0).unwrap(), Tomans::ZERO);
        assert_eq!(Tomans::new(2_000_000).unwrap().value(), 2_000_000);
    }

    #[test]
    fn test_new_rejects_negative() {
        let err = Tomans::new(-500).unwrap_err();
        assert!(matches!(err, MoneyError::InvalidAmount(ref msg) if msg.contains("-500")));
    }

    #[test]
    fn test_positive_rejects_zero() {
        assert!(Tomans::positive(0).is_err());
        assert!(Tomans::positive(-1).is_err());
        assert!(Tomans::positive(1).unwrap().is_positive());
    }

    #[test]
    fn test_default_is_zero() {
        assert!(Tomans::default().is_zero());
    }
}

mod decimal_conversion {
    use super::*;

    #[test]
    fn test_price_times_quantity() {
        // 0.0005 BTC at 2,000,000,000 TMN
        let total = Tomans::from_decimal(dec!(2000000000) * dec!(0.0005)).unwrap();
        assert_eq!(total.value(), 1_000_000);
    }

    #[test]
    fn test_midpoint_rounds_to_even() {
        assert_eq!(Tomans::from_decimal(dec!(0.5)).unwrap().value(), 0);
        assert_eq!(Tomans::from_decimal(dec!(1.5)).unwrap().value(), 2);
        assert_eq!(Tomans::from_decimal(dec!(2.5)).unwrap().value(), 2);
    }

    #[test]
    fn test_out_of_range_overflows() {
        let huge = rust_decimal::Decimal::MAX;
        assert_eq!(Tomans::from_decimal(huge), Err(MoneyError::Overflow));
    }

    #[test]
    fn test_to_decimal() {
        assert_eq!(Tomans::new(42).unwrap().to_decimal(), dec!(42));
    }
}

mod arithmetic {
    use super::*;

    #[test]
    fn test_checked_sub_to_zero() {
        let a = Tomans::new(1_000_000).unwrap();
        assert!(a.checked_sub(a).unwrap().is_zero());
    }

    #[test]
    fn test_checked_sub_underflow() {
        let small = Tomans::new(1).unwrap();
        let big = Tomans::new(2).unwrap();
        assert_eq!(small.checked_sub(big), Err(MoneyError::Underflow));
    }

    #[test]
    fn test_checked_sum_empty() {
        assert_eq!(Tomans::checked_sum(Vec::new()).unwrap(), Tomans::ZERO);
    }

    #[test]
    fn test_checked_sum_overflow() {
        let max = Tomans::new(i64::MAX).unwrap();
        let one = Tomans::new(1).unwrap();
        assert_eq!(Tomans::checked_sum([max, one]), Err(MoneyError::Overflow));
    }

    #[test]
    fn test_ordering() {
        assert!(Tomans::new(10).unwrap() > Tomans::new(9).unwrap());
    }
}

mod serialization {
    use super::*;

    #[test]
    fn test_serializes_as_plain_integer() {
        let json = serde_json::to_value(Tomans::new(1_500).unwrap()).unwrap();
        assert_eq!(json, serde_json::json!(1500));
    }

    #[test]
    fn test_deserialize_negative_fails() {
        assert!(serde_json::from_str::<Tomans>("-10").is_err());
    }
}
