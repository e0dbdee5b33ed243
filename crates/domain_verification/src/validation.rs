//! Submission validation rules
//!
//! # Level 1 (identity)
//! - Full name of 2 to 100 characters
//! - National code: 10 digits, not all the same, valid check digit
//! - Birth date in the past, user at least 18
//! - Bank card: 16 digits passing the Luhn check
//!
//! # Level 2 (documents)
//! - 1 to 10 document references, no duplicates
//!
//! Validation collects every failure instead of stopping at the first, so
//! the user sees everything that needs fixing in one round trip.

use chrono::NaiveDate;
use std::collections::HashSet;

use crate::level::KycLevel;
use crate::submission::{IdentityDetails, SubmissionPayload};

pub const MIN_AGE_YEARS: u32 = 18;
pub const MAX_DOCUMENTS: usize = 10;

/// Result of submission validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether the payload is valid
    pub is_valid: bool,
    /// List of validation errors
    pub errors: Vec<String>,
    /// List of validation warnings (non-fatal issues)
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Creates a successful validation result
    pub fn ok() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Adds an error to the result
    pub fn add_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
        self.is_valid = false;
    }

    /// Adds a warning to the result
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Merges another validation result into this one
    pub fn merge(&mut self, other: ValidationResult) {
        if !other.is_valid {
            self.is_valid = false;
        }
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::ok()
    }
}

/// Validator for KYC submissions
pub struct SubmissionValidator;

impl SubmissionValidator {
    /// Validates a payload against the level it is submitted for
    ///
    /// # Arguments
    ///
    /// * `target` - The level being applied for
    /// * `payload` - The submitted data
    /// * `today` - Reference date for the age check
    pub fn validate(target: KycLevel, payload: &SubmissionPayload, today: NaiveDate) -> ValidationResult {
        let mut result = ValidationResult::ok();

        if payload.level() != target {
            result.add_error(format!(
                "level {} submissions require {} payload",
                target,
                if target == KycLevel::Basic { "identity" } else { "documents" }
            ));
            return result;
        }

        match payload {
            SubmissionPayload::Identity(details) => {
                result.merge(Self::validate_identity(details, today));
            }
            SubmissionPayload::Documents { documents } => {
                if documents.is_empty() {
                    result.add_error("at least one document is required");
                }
                if documents.len() > MAX_DOCUMENTS {
                    result.add_error(format!("at most {MAX_DOCUMENTS} documents are allowed"));
                }
                let unique: HashSet<_> = documents.iter().collect();
                if unique.len() != documents.len() {
                    result.add_error("documents must not repeat");
                }
            }
        }

        result
    }

    /// Validates level 1 identity details
    pub fn validate_identity(details: &IdentityDetails, today: NaiveDate) -> ValidationResult {
        let mut result = ValidationResult::ok();

        let name_length = details.full_name.trim().chars().count();
        if !(2..=100).contains(&name_length) {
            result.add_error("full name must be 2 to 100 characters");
        }

        if !is_valid_national_code(&details.national_code) {
            result.add_error(format!("invalid national code: {}", details.national_code));
        }

        match today.years_since(details.birth_date) {
            None => result.add_error("birth date cannot be in the future"),
            Some(age) if age < MIN_AGE_YEARS => {
                result.add_error(format!("user must be at least {MIN_AGE_YEARS} years old"))
            }
            Some(age) if age > 120 => result.add_warning(format!("unusual age: {age} years")),
            Some(_) => {}
        }

        if !is_valid_card_number(&details.card_number) {
            result.add_error("bank card number must be 16 digits with a valid checksum");
        }

        result
    }
}

/// Checks a 10-digit national code and its check digit
///
/// The check digit is derived from the weighted sum of the first nine
/// digits (weights 10 down to 2) modulo 11.
pub fn is_valid_national_code(code: &str) -> bool {
    let digits: Vec<u32> = match code.chars().map(|c| c.to_digit(10)).collect::<Option<_>>() {
        Some(digits) => digits,
        None => return false,
    };
    if digits.len() != 10 || digits.iter().all(|d| *d == digits[0]) {
        return false;
    }

    let sum: u32 = digits[..9]
        .iter()
        .enumerate()
        .map(|(i, d)| d * (10 - i as u32))
        .sum();
    let remainder = sum % 11;
    let check = digits[9];

    if remainder < 2 {
        check == remainder
    } else {
        check == 11 - remainder
    }
}

/// Checks a 16-digit card number with the Luhn algorithm
pub fn is_valid_card_number(card: &str) -> bool {
    if card.len() != 16 || !card.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }

    let sum: u32 = card
        .bytes()
        .rev()
        .map(|b| u32::from(b - b'0'))
        .enumerate()
        .map(|(i, d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum();

    sum % 10 == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::DocumentRef;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn identity() -> IdentityDetails {
        IdentityDetails {
            full_name: "Sara Ahmadi".to_string(),
            national_code: "0499370899".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1990, 3, 21).unwrap(),
            card_number: "4111111111111111".to_string(),
        }
    }

    #[test]
    fn test_valid_national_codes() {
        assert!(is_valid_national_code("0499370899"));
        assert!(is_valid_national_code("1234567891"));
    }

    #[test]
    fn test_invalid_national_codes() {
        assert!(!is_valid_national_code("0499370898"));
        assert!(!is_valid_national_code("049937089"));
        assert!(!is_valid_national_code("04993708a9"));
        assert!(!is_valid_national_code("1111111111"));
    }

    #[test]
    fn test_card_luhn() {
        assert!(is_valid_card_number("4111111111111111"));
        assert!(is_valid_card_number("5555555555554444"));
        assert!(!is_valid_card_number("4111111111111112"));
        assert!(!is_valid_card_number("411111111111111"));
        assert!(!is_valid_card_number("4111-11111111111"));
    }

    #[test]
    fn test_valid_identity() {
        let result = SubmissionValidator::validate_identity(&identity(), today());
        assert!(result.is_valid, "{:?}", result.errors);
    }

    #[test]
    fn test_identity_collects_all_errors() {
        let details = IdentityDetails {
            full_name: " ".to_string(),
            national_code: "123".to_string(),
            birth_date: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            card_number: "1234".to_string(),
        };
        let result = SubmissionValidator::validate_identity(&details, today());
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 4);
    }

    #[test]
    fn test_underage_rejected() {
        let mut details = identity();
        details.birth_date = NaiveDate::from_ymd_opt(2008, 6, 2).unwrap();
        let result = SubmissionValidator::validate_identity(&details, today());
        assert!(result.errors.iter().any(|e| e.contains("18")));

        details.birth_date = NaiveDate::from_ymd_opt(2007, 6, 1).unwrap();
        assert!(SubmissionValidator::validate_identity(&details, today()).is_valid);
    }

    #[test]
    fn test_payload_must_match_level() {
        let payload = SubmissionPayload::Identity(identity());
        let result = SubmissionValidator::validate(KycLevel::Advanced, &payload, today());
        assert!(!result.is_valid);
    }

    #[test]
    fn test_document_rules() {
        let doc = DocumentRef::new();
        let empty = SubmissionPayload::Documents { documents: vec![] };
        let repeated = SubmissionPayload::Documents { documents: vec![doc, doc] };
        let too_many = SubmissionPayload::Documents {
            documents: (0..11).map(|_| DocumentRef::new()).collect(),
        };
        let fine = SubmissionPayload::Documents { documents: vec![doc] };

        assert!(!SubmissionValidator::validate(KycLevel::Advanced, &empty, today()).is_valid);
        assert!(!SubmissionValidator::validate(KycLevel::Advanced, &repeated, today()).is_valid);
        assert!(!SubmissionValidator::validate(KycLevel::Advanced, &too_many, today()).is_valid);
        assert!(SubmissionValidator::validate(KycLevel::Advanced, &fine, today()).is_valid);
    }
}
