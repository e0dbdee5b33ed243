//! External collaborator ports
//!
//! The back office reads quotes from a price feed, parks KYC documents in a
//! document store and tells users about status changes through a notification
//! sink. None of them are owned here; these traits are the whole contract.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::approval::ApprovalStatus;
use crate::identifiers::{DocumentRef, RequestId, SubmissionId, UserId};
use crate::ports::{bounded, DomainPort, HealthCheckable, PortError};

/// A price quote in tomans per unit of a coin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub symbol: String,
    pub price_tmn: Decimal,
    pub as_of: DateTime<Utc>,
}

/// Read-only quote source
#[async_trait]
pub trait PriceFeed: DomainPort + HealthCheckable {
    /// Returns the current quote for `symbol`
    ///
    /// # Errors
    ///
    /// * `PortError::NotFound` - The feed does not quote the symbol
    /// * `PortError::ServiceUnavailable` - The feed is down
    async fn get_price(&self, symbol: &str) -> Result<PriceQuote, PortError>;
}

/// Opaque blob storage for KYC documents
#[async_trait]
pub trait DocumentStore: DomainPort + HealthCheckable {
    /// Stores the bytes and returns a reference to them
    async fn store(&self, bytes: Vec<u8>) -> Result<DocumentRef, PortError>;

    /// Fetches previously stored bytes
    async fn fetch(&self, reference: DocumentRef) -> Result<Vec<u8>, PortError>;

    /// Returns true if the reference points to a stored document
    async fn exists(&self, reference: DocumentRef) -> Result<bool, PortError> {
        match self.fetch(reference).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// What a notification is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum NotificationSubject {
    Request(RequestId),
    Submission(SubmissionId),
}

/// A status change reported to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusNotification {
    pub user_id: UserId,
    pub subject: NotificationSubject,
    pub new_status: ApprovalStatus,
    pub note: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl StatusNotification {
    pub fn new(
        user_id: UserId,
        subject: NotificationSubject,
        new_status: ApprovalStatus,
        note: Option<String>,
    ) -> Self {
        Self {
            user_id,
            subject,
            new_status,
            note,
            occurred_at: Utc::now(),
        }
    }
}

/// Fire-and-forget user notifications
#[async_trait]
pub trait NotificationSink: DomainPort {
    async fn notify(&self, notification: StatusNotification) -> Result<(), PortError>;
}

/// Delivers a notification without letting a failure reach the caller
///
/// Transitions are already committed when this runs, so failures and
/// timeouts are only logged.
pub async fn notify_best_effort(
    sink: &dyn NotificationSink,
    notification: StatusNotification,
    limit: Duration,
) {
    let user_id = notification.user_id;
    let status = notification.new_status;
    if let Err(error) = bounded("notify", limit, sink.notify(notification)).await {
        tracing::warn!(%user_id, %status, %error, "status notification not delivered");
    }
}
