//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for the back office. Identity values pass
//! the national code and card checksums; addresses match their coin's
//! pattern.

use chrono::{Datelike, NaiveDate, Utc};
use core_kernel::{Principal, Tomans, UserId};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Fixture for identity data
pub struct IdentityFixtures;

impl IdentityFixtures {
    pub fn full_name() -> &'static str {
        "Reza Karimi"
    }

    /// A national code with a valid check digit
    pub fn national_code() -> &'static str {
        "0499370899"
    }

    /// A second valid national code
    pub fn other_national_code() -> &'static str {
        "1234567891"
    }

    /// Ten digits with a wrong check digit
    pub fn invalid_national_code() -> &'static str {
        "1234567890"
    }

    /// A Luhn-valid 16-digit card
    pub fn card_number() -> &'static str {
        "4111111111111111"
    }

    pub fn other_card_number() -> &'static str {
        "5555555555554444"
    }

    /// Fails the Luhn check
    pub fn invalid_card_number() -> &'static str {
        "4111111111111112"
    }

    /// Birth date of an adult
    pub fn adult_birth_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(1988, 6, 2).unwrap()
    }

    /// Birth date of someone who turned 17 this year
    pub fn minor_birth_date() -> NaiveDate {
        let today = Utc::now().date_naive();
        NaiveDate::from_ymd_opt(today.year() - 17, 1, 1).unwrap()
    }

    /// A birth date after today
    pub fn future_birth_date() -> NaiveDate {
        Utc::now().date_naive() + chrono::Duration::days(30)
    }
}

/// Fixture for wallet addresses that match their coin's pattern
pub struct AddressFixtures;

impl AddressFixtures {
    pub fn btc_legacy() -> &'static str {
        "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa"
    }

    pub fn btc_bech32() -> &'static str {
        "bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq"
    }

    pub fn eth() -> &'static str {
        "0x742d35Cc6634C0532925a3b844Bc454e4438f44e"
    }

    pub fn trx() -> &'static str {
        "TQn9Y2khEsLJW1ChVWFMSMeRDow5KcbLSE"
    }
}

/// Fixture for price data
pub struct PriceFixtures;

impl PriceFixtures {
    /// 0.0005 BTC costs exactly 1,000,000 TMN at this price
    pub fn btc() -> Decimal {
        dec!(2000000000)
    }

    pub fn eth() -> Decimal {
        dec!(150000000)
    }

    pub fn usdt() -> Decimal {
        dec!(60000)
    }

    /// The default quote table
    pub fn table() -> Vec<(&'static str, Decimal)> {
        vec![("BTC", Self::btc()), ("ETH", Self::eth()), ("USDT", Self::usdt())]
    }
}

/// Fixture for toman amounts
pub struct TomanFixtures;

impl TomanFixtures {
    pub fn one_million() -> Tomans {
        Tomans::new(1_000_000).unwrap()
    }

    pub fn two_million() -> Tomans {
        Tomans::new(2_000_000).unwrap()
    }

    pub fn tomans(value: i64) -> Tomans {
        Tomans::new(value).unwrap()
    }
}

/// Fixture for authenticated callers
pub struct PrincipalFixtures;

impl PrincipalFixtures {
    pub fn admin() -> Principal {
        Principal::admin("admin-1")
    }

    pub fn second_admin() -> Principal {
        Principal::admin("admin-2")
    }

    pub fn user(user_id: UserId) -> Principal {
        Principal::user(user_id)
    }
}
