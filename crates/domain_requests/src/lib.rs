//! Requests Domain - Deposits, Orders and Admin Approval
//!
//! This crate takes a financial request from the user's first click to its
//! final state:
//!
//! 1. [`RequestIntake`] validates the request, checks the user's tier and
//!    snapshots the price
//! 2. [`ApprovalWorkflow::open`] reserves funds for purchases and records the
//!    pending request
//! 3. An admin approves or rejects through [`ApprovalWorkflow::resolve`], which
//!    applies the wallet effect exactly once
//! 4. Purchases with a destination address are marked completed once the
//!    transfer has gone out
//!
//! # Status lifecycle
//!
//! ```text
//! Pending -> Approved -> Completed
//!    |  \______________/^
//!    +-> Rejected
//! ```

pub mod request;
pub mod address;
pub mod workflow;
pub mod intake;
pub mod error;

pub use request::{
    FinancialRequest, PriceSnapshot, RequestDraft, RequestKind, TOMAN_SYMBOL,
};
pub use address::{has_pattern, is_valid_address};
pub use workflow::{ApprovalWorkflow, WorkflowConfig, USER_CANCELLED_NOTE};
pub use intake::{
    normalize_symbol, price_order, IntakeConfig, OrderAmount, OrderRequest, RequestIntake,
};
pub use error::RequestError;
