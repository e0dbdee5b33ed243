//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! back office test suite.
//!
//! # Modules
//!
//! - `fixtures`: Known-good identity data, addresses, prices and principals
//! - `builders`: Builder patterns for submissions and orders
//! - `doubles`: Collaborator doubles that fail, stall or record
//! - `harness`: A fully wired back office over in-memory collaborators
//! - `assertions`: Custom assertion helpers for ledger and request state
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod doubles;
pub mod harness;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use doubles::*;
pub use harness::*;
pub use assertions::*;
pub use generators::*;
