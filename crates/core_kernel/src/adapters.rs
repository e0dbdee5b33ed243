//! In-process reference adapters
//!
//! These back the collaborator ports when the server runs standalone. They
//! follow the same contract as a remote adapter would, including the error
//! variants, so swapping one in needs no change in the domain crates.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::collaborators::{
    DocumentStore, NotificationSink, PriceFeed, PriceQuote, StatusNotification,
};
use crate::identifiers::DocumentRef;
use crate::ports::{DomainPort, HealthCheckResult, HealthCheckable, PortError};

/// Price feed serving a fixed table of quotes
#[derive(Debug, Clone, Default)]
pub struct StaticPriceFeed {
    prices: Arc<RwLock<HashMap<String, Decimal>>>,
}

impl StaticPriceFeed {
    /// Creates a feed from `(symbol, price)` pairs; symbols are upper-cased
    pub fn new<I, S>(prices: I) -> Self
    where
        I: IntoIterator<Item = (S, Decimal)>,
        S: AsRef<str>,
    {
        let prices = prices
            .into_iter()
            .map(|(symbol, price)| (symbol.as_ref().to_ascii_uppercase(), price))
            .collect();
        Self {
            prices: Arc::new(RwLock::new(prices)),
        }
    }

    /// Replaces the quote for a symbol
    pub async fn set_price(&self, symbol: &str, price: Decimal) {
        self.prices
            .write()
            .await
            .insert(symbol.to_ascii_uppercase(), price);
    }
}

impl DomainPort for StaticPriceFeed {}

#[async_trait]
impl PriceFeed for StaticPriceFeed {
    async fn get_price(&self, symbol: &str) -> Result<PriceQuote, PortError> {
        let symbol = symbol.to_ascii_uppercase();
        let prices = self.prices.read().await;
        let price = prices
            .get(&symbol)
            .copied()
            .ok_or_else(|| PortError::not_found("Price", &symbol))?;
        Ok(PriceQuote {
            symbol,
            price_tmn: price,
            as_of: Utc::now(),
        })
    }
}

#[async_trait]
impl HealthCheckable for StaticPriceFeed {
    async fn health_check(&self) -> HealthCheckResult {
        let mut result = HealthCheckResult::healthy("static-price-feed");
        let quoted = self.prices.read().await.len();
        result.message = Some(format!("{quoted} symbols quoted"));
        result
    }
}

/// Document store keeping blobs in memory
#[derive(Debug, Clone)]
pub struct InMemoryDocumentStore {
    documents: Arc<RwLock<HashMap<DocumentRef, Vec<u8>>>>,
    max_bytes: usize,
}

impl InMemoryDocumentStore {
    pub fn new(max_bytes: usize) -> Self {
        Self {
            documents: Arc::new(RwLock::new(HashMap::new())),
            max_bytes,
        }
    }

    /// Number of stored documents
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

impl DomainPort for InMemoryDocumentStore {}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn store(&self, bytes: Vec<u8>) -> Result<DocumentRef, PortError> {
        if bytes.is_empty() {
            return Err(PortError::validation_field("document is empty", "document"));
        }
        if bytes.len() > self.max_bytes {
            return Err(PortError::validation_field(
                format!("document exceeds {} bytes", self.max_bytes),
                "document",
            ));
        }

        let reference = DocumentRef::new_v7();
        self.documents.write().await.insert(reference, bytes);
        Ok(reference)
    }

    async fn fetch(&self, reference: DocumentRef) -> Result<Vec<u8>, PortError> {
        self.documents
            .read()
            .await
            .get(&reference)
            .cloned()
            .ok_or_else(|| PortError::not_found("Document", reference))
    }
}

#[async_trait]
impl HealthCheckable for InMemoryDocumentStore {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult::healthy("in-memory-document-store")
    }
}

/// Notification sink that writes one structured log line per notification
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotificationSink;

impl DomainPort for TracingNotificationSink {}

#[async_trait]
impl NotificationSink for TracingNotificationSink {
    async fn notify(&self, notification: StatusNotification) -> Result<(), PortError> {
        tracing::info!(
            user_id = %notification.user_id,
            subject = ?notification.subject,
            status = %notification.new_status,
            note = notification.note.as_deref().unwrap_or(""),
            "status notification"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::approval::ApprovalStatus;
    use crate::collaborators::{notify_best_effort, NotificationSubject};
    use crate::identifiers::{RequestId, UserId};
    use rust_decimal_macros::dec;
    use std::time::Duration;

    #[tokio::test]
    async fn test_static_feed_is_case_insensitive() {
        let feed = StaticPriceFeed::new([("btc", dec!(3000000000))]);
        let quote = feed.get_price("BTC").await.unwrap();
        assert_eq!(quote.symbol, "BTC");
        assert_eq!(quote.price_tmn, dec!(3000000000));
    }

    #[tokio::test]
    async fn test_static_feed_unknown_symbol() {
        let feed = StaticPriceFeed::default();
        let err = feed.get_price("XYZ").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_static_feed_set_price() {
        let feed = StaticPriceFeed::default();
        feed.set_price("eth", dec!(150000000)).await;
        assert_eq!(feed.get_price("ETH").await.unwrap().price_tmn, dec!(150000000));
    }

    #[tokio::test]
    async fn test_document_store_round_trip() {
        let store = InMemoryDocumentStore::new(1024);
        let reference = store.store(b"passport scan".to_vec()).await.unwrap();
        assert_eq!(store.fetch(reference).await.unwrap(), b"passport scan");
        assert!(store.exists(reference).await.unwrap());
        assert!(!store.exists(DocumentRef::new()).await.unwrap());
    }

    #[tokio::test]
    async fn test_document_store_limits() {
        let store = InMemoryDocumentStore::new(4);
        assert!(matches!(
            store.store(Vec::new()).await,
            Err(PortError::Validation { .. })
        ));
        assert!(matches!(
            store.store(vec![0u8; 5]).await,
            Err(PortError::Validation { .. })
        ));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_tracing_sink_accepts_notifications() {
        let notification = StatusNotification::new(
            UserId::new(),
            NotificationSubject::Request(RequestId::new()),
            ApprovalStatus::Approved,
            None,
        );
        notify_best_effort(&TracingNotificationSink, notification, Duration::from_millis(50)).await;
    }
}
