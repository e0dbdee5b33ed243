//! Verification Domain
//!
//! This crate manages user identity profiles and the KYC tier process that
//! gates financial actions.
//!
//! # Tiers
//!
//! - **Level 0**: registered, may only browse
//! - **Level 1**: identity verified (name, national code, birth date, bank card); may deposit
//! - **Level 2**: documents verified; may trade and withdraw
//!
//! A user climbs one level at a time by filing a submission that an admin
//! approves. [`VerificationTierEngine::permits`] is the single answer to
//! "may this user do that?" for the rest of the back office.

pub mod level;
pub mod submission;
pub mod profile;
pub mod validation;
pub mod engine;
pub mod error;

pub use level::{GatedAction, KycLevel, KycStatus};
pub use submission::{IdentityDetails, SubmissionPayload, VerificationSubmission};
pub use profile::UserProfile;
pub use validation::{
    is_valid_card_number, is_valid_national_code, SubmissionValidator, ValidationResult,
};
pub use engine::{VerificationConfig, VerificationTierEngine};
pub use error::VerificationError;
