//! Input validators for the onboarding boundary
//!
//! These return a [`ValidationResult`] record rather than an error type
//! because the consumer is an input form: it wants a flag and a message to
//! show inline, not a failure to propagate.

use serde::{Deserialize, Serialize};

use crate::seed::parse_backup_phrase;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

const WEAK_PASSWORD_ERROR: &str = "Password must be at least 8 characters";
const INVALID_BACKUP_PHRASE_ERROR: &str = "Backup phrase is not a valid set of words";

/// Outcome of a boundary validation, shaped for inline display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub error: Option<String>,
}

impl ValidationResult {
    fn valid() -> Self {
        Self {
            is_valid: true,
            error: None,
        }
    }

    fn invalid(error: &str) -> Self {
        Self {
            is_valid: false,
            error: Some(error.to_string()),
        }
    }
}

/// A password is accepted iff it has at least
/// [`MIN_PASSWORD_LENGTH`] characters.
pub fn is_password_valid(password: &str) -> ValidationResult {
    if password.chars().count() >= MIN_PASSWORD_LENGTH {
        ValidationResult::valid()
    } else {
        ValidationResult::invalid(WEAK_PASSWORD_ERROR)
    }
}

/// A backup phrase is accepted iff the mnemonic bridge accepts it
/// (word-list membership and checksum).
pub async fn is_backup_phrase_valid(backup_phrase: &str) -> ValidationResult {
    match parse_backup_phrase(backup_phrase) {
        Ok(_) => ValidationResult::valid(),
        Err(_) => ValidationResult::invalid(INVALID_BACKUP_PHRASE_ERROR),
    }
}

/// First-match linear scan: which identity owns this address?
pub fn find_address_index(address: &str, identity_addresses: &[String]) -> Option<usize> {
    identity_addresses.iter().position(|a| a == address)
}
