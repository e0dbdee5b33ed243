//! KYC levels and the permission table
//!
//! | Action     | Minimum level |
//! |------------|---------------|
//! | Deposit    | 1             |
//! | Trade      | 2             |
//! | Withdrawal | 2             |

use serde::{Deserialize, Serialize};
use std::fmt;

/// Verification tier of a user
///
/// Serialized as its number (0, 1, 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum KycLevel {
    /// Registered, nothing verified
    Unverified,
    /// Identity details verified
    Basic,
    /// Identity documents verified
    Advanced,
}

impl KycLevel {
    pub fn value(&self) -> u8 {
        match self {
            KycLevel::Unverified => 0,
            KycLevel::Basic => 1,
            KycLevel::Advanced => 2,
        }
    }

    /// The level directly above, if any
    pub fn next(&self) -> Option<KycLevel> {
        match self {
            KycLevel::Unverified => Some(KycLevel::Basic),
            KycLevel::Basic => Some(KycLevel::Advanced),
            KycLevel::Advanced => None,
        }
    }
}

impl TryFrom<u8> for KycLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(KycLevel::Unverified),
            1 => Ok(KycLevel::Basic),
            2 => Ok(KycLevel::Advanced),
            other => Err(format!("unknown KYC level: {other}")),
        }
    }
}

impl From<KycLevel> for u8 {
    fn from(level: KycLevel) -> u8 {
        level.value()
    }
}

impl fmt::Display for KycLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// Outcome of the user's latest verification attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KycStatus {
    None,
    Pending,
    Approved,
    Rejected,
}

/// Financial actions gated by verification tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatedAction {
    Deposit,
    Trade,
    Withdrawal,
}

const PERMISSION_TABLE: &[(GatedAction, KycLevel)] = &[
    (GatedAction::Deposit, KycLevel::Basic),
    (GatedAction::Trade, KycLevel::Advanced),
    (GatedAction::Withdrawal, KycLevel::Advanced),
];

impl GatedAction {
    /// Minimum level required for the action
    pub fn required_level(&self) -> KycLevel {
        PERMISSION_TABLE
            .iter()
            .find(|(action, _)| action == self)
            .map(|(_, level)| *level)
            .unwrap_or(KycLevel::Advanced)
    }

    /// Returns true if a user at `level` may perform the action
    pub fn permitted_at(&self, level: KycLevel) -> bool {
        level >= self.required_level()
    }
}

impl fmt::Display for GatedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GatedAction::Deposit => "deposit",
            GatedAction::Trade => "trade",
            GatedAction::Withdrawal => "withdrawal",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_table() {
        use GatedAction::*;
        use KycLevel::*;

        assert!(!Deposit.permitted_at(Unverified));
        assert!(Deposit.permitted_at(Basic));
        assert!(!Trade.permitted_at(Basic));
        assert!(Trade.permitted_at(Advanced));
        assert!(!Withdrawal.permitted_at(Basic));
        assert!(Withdrawal.permitted_at(Advanced));
    }

    #[test]
    fn test_next_level() {
        assert_eq!(KycLevel::Unverified.next(), Some(KycLevel::Basic));
        assert_eq!(KycLevel::Advanced.next(), None);
    }

    #[test]
    fn test_level_serializes_as_number() {
        assert_eq!(serde_json::to_string(&KycLevel::Basic).unwrap(), "1");
        assert_eq!(serde_json::from_str::<KycLevel>("2").unwrap(), KycLevel::Advanced);
        assert!(serde_json::from_str::<KycLevel>("3").is_err());
    }
}
