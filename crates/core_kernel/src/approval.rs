//! Generic approval lifecycle
//!
//! Both KYC submissions and financial requests move through the same
//! admin-gated lifecycle:
//!
//! ```text
//! Pending -> Approved -> Completed
//!    |                      ^
//!    +----------------------+   (single-step settlement)
//!    |
//!    +-> Rejected
//! ```
//!
//! Submissions never reach `Completed`; that restriction lives with the
//! submission type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Status of an item awaiting or past admin review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
}

/// An admin's decision on a pending item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approve,
    Reject,
}

impl ApprovalStatus {
    /// Returns true once no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, ApprovalStatus::Rejected | ApprovalStatus::Completed)
    }

    /// Checks if a transition is legal
    pub fn can_transition_to(&self, target: ApprovalStatus) -> bool {
        use ApprovalStatus::*;
        matches!(
            (*self, target),
            (Pending, Approved) |
            (Pending, Rejected) |
            (Pending, Completed) |
            (Approved, Completed)
        )
    }

    /// Moves to `target`, failing on an illegal transition
    pub fn transition_to(&mut self, target: ApprovalStatus) -> Result<(), CoreError> {
        if !self.can_transition_to(target) {
            return Err(CoreError::illegal_transition(*self, target));
        }
        *self = target;
        Ok(())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
            ApprovalStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Decision {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "approve" | "approved" => Ok(Decision::Approve),
            "reject" | "rejected" => Ok(Decision::Reject),
            other => Err(CoreError::validation(format!("unknown decision: {other}"))),
        }
    }
}
