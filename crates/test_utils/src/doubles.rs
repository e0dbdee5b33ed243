//! Collaborator Doubles
//!
//! Stand-ins for the price feed, document store and notification sink that
//! fail, stall or record what they were given.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use core_kernel::{
    AdapterHealth, ApprovalStatus, DocumentRef, DocumentStore, DomainPort, HealthCheckResult, HealthCheckable,
    NotificationSink, NotificationSubject, PortError, PriceFeed, PriceQuote, StatusNotification,
};
use rust_decimal::Decimal;
use tokio::sync::Mutex;

/// Price feed quoting one price for every symbol and counting calls
#[derive(Debug)]
pub struct FixedPriceFeed {
    price: Decimal,
    calls: AtomicUsize,
}

impl FixedPriceFeed {
    pub fn new(price: Decimal) -> Self {
        Self {
            price,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of quotes served so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DomainPort for FixedPriceFeed {}

#[async_trait]
impl PriceFeed for FixedPriceFeed {
    async fn get_price(&self, symbol: &str) -> Result<PriceQuote, PortError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(PriceQuote {
            symbol: symbol.to_ascii_uppercase(),
            price_tmn: self.price,
            as_of: Utc::now(),
        })
    }
}

#[async_trait]
impl HealthCheckable for FixedPriceFeed {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult::healthy("fixed-price-feed")
    }
}

/// Price feed that is always down
#[derive(Debug, Default)]
pub struct FailingPriceFeed;

impl DomainPort for FailingPriceFeed {}

#[async_trait]
impl PriceFeed for FailingPriceFeed {
    async fn get_price(&self, _symbol: &str) -> Result<PriceQuote, PortError> {
        Err(PortError::unavailable("price-feed"))
    }
}

#[async_trait]
impl HealthCheckable for FailingPriceFeed {
    async fn health_check(&self) -> HealthCheckResult {
        let mut result = HealthCheckResult::healthy("failing-price-feed");
        result.status = AdapterHealth::Unhealthy;
        result
    }
}

/// Price feed that answers after a delay
#[derive(Debug)]
pub struct SlowPriceFeed {
    pub delay: Duration,
    pub price: Decimal,
}

impl SlowPriceFeed {
    pub fn new(delay: Duration, price: Decimal) -> Self {
        Self { delay, price }
    }
}

impl DomainPort for SlowPriceFeed {}

#[async_trait]
impl PriceFeed for SlowPriceFeed {
    async fn get_price(&self, symbol: &str) -> Result<PriceQuote, PortError> {
        tokio::time::sleep(self.delay).await;
        Ok(PriceQuote {
            symbol: symbol.to_ascii_uppercase(),
            price_tmn: self.price,
            as_of: Utc::now(),
        })
    }
}

#[async_trait]
impl HealthCheckable for SlowPriceFeed {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult::healthy("slow-price-feed")
    }
}

/// Document store that is always down
#[derive(Debug, Default)]
pub struct FailingDocumentStore;

impl DomainPort for FailingDocumentStore {}

#[async_trait]
impl DocumentStore for FailingDocumentStore {
    async fn store(&self, _bytes: Vec<u8>) -> Result<DocumentRef, PortError> {
        Err(PortError::unavailable("document-store"))
    }

    async fn fetch(&self, _reference: DocumentRef) -> Result<Vec<u8>, PortError> {
        Err(PortError::unavailable("document-store"))
    }
}

#[async_trait]
impl HealthCheckable for FailingDocumentStore {
    async fn health_check(&self) -> HealthCheckResult {
        let mut result = HealthCheckResult::healthy("failing-document-store");
        result.status = AdapterHealth::Unhealthy;
        result
    }
}

/// Sink that keeps every notification it receives
#[derive(Debug, Default)]
pub struct RecordingNotificationSink {
    seen: Mutex<Vec<StatusNotification>>,
}

impl RecordingNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn notifications(&self) -> Vec<StatusNotification> {
        self.seen.lock().await.clone()
    }

    /// Statuses sent for one subject, in delivery order
    pub async fn statuses_for(&self, subject: NotificationSubject) -> Vec<ApprovalStatus> {
        self.seen
            .lock()
            .await
            .iter()
            .filter(|n| n.subject == subject)
            .map(|n| n.new_status)
            .collect()
    }
}

impl DomainPort for RecordingNotificationSink {}

#[async_trait]
impl NotificationSink for RecordingNotificationSink {
    async fn notify(&self, notification: StatusNotification) -> Result<(), PortError> {
        self.seen.lock().await.push(notification);
        Ok(())
    }
}

/// Sink whose every delivery fails
#[derive(Debug, Default)]
pub struct FailingNotificationSink;

impl DomainPort for FailingNotificationSink {}

#[async_trait]
impl NotificationSink for FailingNotificationSink {
    async fn notify(&self, _notification: StatusNotification) -> Result<(), PortError> {
        Err(PortError::unavailable("sms-gateway"))
    }
}
