//! Wallet address format table
//!
//! A match means the address is well-formed for the coin, not that it
//! exists or belongs to the user. Admins confirm the destination before
//! marking a transfer completed.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

const PATTERNS: &[(&str, &str)] = &[
    ("BTC", r"^(bc1|[13])[a-zA-HJ-NP-Z0-9]{25,62}$"),
    ("ETH", r"^0x[a-fA-F0-9]{40}$"),
    ("USDT", r"^(0x[a-fA-F0-9]{40}|T[1-9A-HJ-NP-Za-km-z]{33})$"),
    ("TRX", r"^T[1-9A-HJ-NP-Za-km-z]{33}$"),
    ("BNB", r"^(bnb1[0-9a-z]{38}|0x[a-fA-F0-9]{40})$"),
    ("LTC", r"^(ltc1|[LM3])[a-zA-HJ-NP-Z0-9]{26,62}$"),
    ("DOGE", r"^D[5-9A-HJ-NP-U][1-9A-HJ-NP-Za-km-z]{32}$"),
    ("XRP", r"^r[1-9A-HJ-NP-Za-km-z]{24,34}$"),
    ("SOL", r"^[1-9A-HJ-NP-Za-km-z]{32,44}$"),
    ("ADA", r"^addr1[0-9a-z]{53,98}$"),
];

static ADDRESS_PATTERNS: Lazy<HashMap<&'static str, Regex>> = Lazy::new(|| {
    PATTERNS
        .iter()
        .filter_map(|(symbol, pattern)| match Regex::new(pattern) {
            Ok(regex) => Some((*symbol, regex)),
            Err(error) => {
                tracing::error!(symbol, %error, "address pattern failed to compile");
                None
            }
        })
        .collect()
});

/// Returns true if the symbol has a dedicated pattern
pub fn has_pattern(symbol: &str) -> bool {
    ADDRESS_PATTERNS.contains_key(symbol.to_ascii_uppercase().as_str())
}

/// Checks an address against the coin's pattern
///
/// Symbols without a pattern accept 26 to 128 ASCII alphanumerics.
pub fn is_valid_address(symbol: &str, address: &str) -> bool {
    match ADDRESS_PATTERNS.get(symbol.to_ascii_uppercase().as_str()) {
        Some(pattern) => pattern.is_match(address),
        None => {
            (26..=128).contains(&address.len())
                && address.bytes().all(|b| b.is_ascii_alphanumeric())
        }
    }
}
