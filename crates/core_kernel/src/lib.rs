//! Core Kernel - Foundational types shared by the back office domains
//!
//! This crate provides the building blocks used across all domain modules:
//! - Strongly-typed identifiers for users, submissions, requests and reservations
//! - `Tomans`, the integer minor-unit currency every balance is kept in
//! - The generic approval status machine reused by KYC submissions and financial requests
//! - Authenticated principals handed to the core by the outer layers
//! - Ports for the external collaborators (price feed, document store, notification sink)

pub mod money;
pub mod identifiers;
pub mod approval;
pub mod principal;
pub mod ports;
pub mod collaborators;
pub mod adapters;
pub mod error;

pub use money::{Tomans, MoneyError};
pub use identifiers::{
    UserId, SubmissionId, RequestId, ReservationId, DocumentRef, JournalEntryId,
};
pub use approval::{ApprovalStatus, Decision};
pub use principal::{Principal, Role};
pub use ports::{
    PortError, DomainPort, AdapterHealth, HealthCheckResult, HealthCheckable, bounded,
};
pub use collaborators::{
    PriceFeed, PriceQuote, DocumentStore, NotificationSink, NotificationSubject,
    StatusNotification, notify_best_effort,
};
pub use adapters::{StaticPriceFeed, InMemoryDocumentStore, TracingNotificationSink};
pub use error::CoreError;
