//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating random test data
//! that maintains domain invariants.

use core_kernel::Tomans;
use domain_requests::OrderAmount;
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Strategy for positive toman amounts up to one billion
pub fn positive_tomans_strategy() -> impl Strategy<Value = Tomans> {
    (1i64..1_000_000_000i64).prop_map(|v| Tomans::new(v).unwrap())
}

/// Strategy for crypto quantities with up to eight decimal places
pub fn crypto_quantity_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000_000i64, 0u32..=8u32).prop_map(|(m, s)| Decimal::new(m, s))
}

/// Strategy for order amounts in either unit
pub fn order_amount_strategy() -> impl Strategy<Value = OrderAmount> {
    prop_oneof![
        crypto_quantity_strategy().prop_map(OrderAmount::Crypto),
        positive_tomans_strategy().prop_map(OrderAmount::Tomans),
    ]
}

/// Strategy for quoted prices between 1 and 10 billion tomans
pub fn price_strategy() -> impl Strategy<Value = Decimal> {
    (100i64..1_000_000_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy for national codes that pass the check digit
pub fn national_code_strategy() -> impl Strategy<Value = String> {
    proptest::collection::vec(0u32..10, 9)
        .prop_filter("all-identical digits are refused", |d| d.iter().any(|x| *x != d[0]))
        .prop_map(|digits| {
            let sum: u32 = digits
                .iter()
                .enumerate()
                .map(|(i, d)| d * (10 - i as u32))
                .sum();
            let remainder = sum % 11;
            let check = if remainder < 2 { remainder } else { 11 - remainder };
            digits
                .iter()
                .chain(std::iter::once(&check))
                .map(|d| char::from_digit(*d, 10).unwrap_or('0'))
                .collect()
        })
}

/// Strategy for 16-digit card numbers that pass the Luhn check
pub fn card_number_strategy() -> impl Strategy<Value = String> {
    proptest::collection::vec(0u32..10, 15).prop_map(|digits| {
        // positions counted from the right once the check digit is appended
        let sum: u32 = digits
            .iter()
            .rev()
            .enumerate()
            .map(|(i, d)| {
                if i % 2 == 0 {
                    let doubled = d * 2;
                    if doubled > 9 { doubled - 9 } else { doubled }
                } else {
                    *d
                }
            })
            .sum();
        let check = (10 - sum % 10) % 10;
        digits
            .iter()
            .chain(std::iter::once(&check))
            .map(|d| char::from_digit(*d, 10).unwrap_or('0'))
            .collect()
    })
}

/// One step of a random ledger workload
#[derive(Debug, Clone)]
pub enum LedgerOp {
    Credit(i64),
    Reserve(i64),
    /// Debit the live reservation at this index, modulo the live count
    Debit(usize),
    /// Release the live reservation at this index, modulo the live count
    Release(usize),
}

/// Strategy for a single ledger operation
pub fn ledger_op_strategy() -> impl Strategy<Value = LedgerOp> {
    prop_oneof![
        (1i64..5_000_000i64).prop_map(LedgerOp::Credit),
        (1i64..5_000_000i64).prop_map(LedgerOp::Reserve),
        any::<usize>().prop_map(LedgerOp::Debit),
        any::<usize>().prop_map(LedgerOp::Release),
    ]
}

/// Strategy for ledger workloads of up to `max_len` operations
pub fn ledger_ops_strategy(max_len: usize) -> impl Strategy<Value = Vec<LedgerOp>> {
    proptest::collection::vec(ledger_op_strategy(), 1..=max_len)
}
