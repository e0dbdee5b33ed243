//! API configuration

use std::str::FromStr;
use std::time::Duration;

use config::ConfigError;
use rust_decimal::Decimal;
use serde::Deserialize;

use core_kernel::Tomans;
use domain_requests::{IntakeConfig, WorkflowConfig};
use domain_verification::VerificationConfig;

/// API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// JWT secret for authentication
    pub jwt_secret: String,
    /// JWT expiration in seconds
    pub jwt_expiration_secs: u64,
    /// Log level
    pub log_level: String,
    /// Upper bound on a price feed call
    pub price_timeout_ms: u64,
    /// Upper bound on a notification delivery
    pub notification_timeout_ms: u64,
    /// Upper bound on a document store call
    pub document_timeout_ms: u64,
    /// Largest accepted document upload
    pub max_document_bytes: usize,
    /// Smallest accepted order total in tomans
    pub min_order_value_tmn: i64,
    /// Static quote table, `SYMBOL=PRICE` pairs separated by commas
    pub prices: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            jwt_secret: "change-me-in-production".to_string(),
            jwt_expiration_secs: 3600,
            log_level: "info".to_string(),
            price_timeout_ms: 3000,
            notification_timeout_ms: 2000,
            document_timeout_ms: 5000,
            max_document_bytes: 5 * 1024 * 1024,
            min_order_value_tmn: 0,
            prices: "BTC=3000000000,ETH=150000000,USDT=60000".to_string(),
        }
    }
}

impl ApiConfig {
    /// Loads configuration from `BACKOFFICE_*` environment variables
    ///
    /// Unset keys keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        config::Config::builder()
            .set_default("host", defaults.host)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("jwt_secret", defaults.jwt_secret)?
            .set_default("jwt_expiration_secs", defaults.jwt_expiration_secs as i64)?
            .set_default("log_level", defaults.log_level)?
            .set_default("price_timeout_ms", defaults.price_timeout_ms as i64)?
            .set_default("notification_timeout_ms", defaults.notification_timeout_ms as i64)?
            .set_default("document_timeout_ms", defaults.document_timeout_ms as i64)?
            .set_default("max_document_bytes", defaults.max_document_bytes as i64)?
            .set_default("min_order_value_tmn", defaults.min_order_value_tmn)?
            .set_default("prices", defaults.prices)?
            .add_source(config::Environment::with_prefix("BACKOFFICE"))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Parses the static quote table
    pub fn price_table(&self) -> Result<Vec<(String, Decimal)>, ConfigError> {
        parse_prices(&self.prices)
    }

    pub fn intake_config(&self) -> Result<IntakeConfig, ConfigError> {
        let min_order_value = Tomans::new(self.min_order_value_tmn)
            .map_err(|e| ConfigError::Message(format!("min_order_value_tmn: {e}")))?;
        Ok(IntakeConfig {
            price_timeout: Duration::from_millis(self.price_timeout_ms),
            min_order_value,
        })
    }

    pub fn workflow_config(&self) -> WorkflowConfig {
        WorkflowConfig {
            notification_timeout: Duration::from_millis(self.notification_timeout_ms),
        }
    }

    pub fn verification_config(&self) -> VerificationConfig {
        VerificationConfig {
            document_timeout: Duration::from_millis(self.document_timeout_ms),
            notification_timeout: Duration::from_millis(self.notification_timeout_ms),
        }
    }

    pub fn document_timeout(&self) -> Duration {
        Duration::from_millis(self.document_timeout_ms)
    }
}

/// Parses `BTC=3000000000,ETH=150000000` into upper-cased symbol/price pairs
pub fn parse_prices(raw: &str) -> Result<Vec<(String, Decimal)>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (symbol, price) = entry
                .split_once('=')
                .ok_or_else(|| ConfigError::Message(format!("price entry without '=': {entry}")))?;
            let symbol = symbol.trim().to_ascii_uppercase();
            if symbol.is_empty() {
                return Err(ConfigError::Message(format!("price entry without symbol: {entry}")));
            }
            let price = Decimal::from_str(price.trim())
                .map_err(|e| ConfigError::Message(format!("bad price for {symbol}: {e}")))?;
            if price <= Decimal::ZERO {
                return Err(ConfigError::Message(format!("price for {symbol} must be positive")));
            }
            Ok((symbol, price))
        })
        .collect()
}
