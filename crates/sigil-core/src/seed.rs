//! BIP-39 backup-phrase bridge
//!
//! Thin wrapper over the `bip39` crate: phrase generation, word-list and
//! checksum validation, and phrase-to-seed conversion. The word-list
//! algorithm itself lives entirely in `bip39`.

use bip39::{Language, Mnemonic};
use thiserror::Error;

/// Word count of generated backup phrases (24 words = 256-bit entropy).
const BACKUP_PHRASE_WORDS: usize = 24;

#[derive(Error, Debug)]
pub enum SeedError {
    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(String),
}

/// Generate a fresh 24-word backup phrase.
pub fn generate_backup_phrase() -> Result<Mnemonic, SeedError> {
    Mnemonic::generate_in(Language::English, BACKUP_PHRASE_WORDS)
        .map_err(|e| SeedError::InvalidMnemonic(e.to_string()))
}

/// Parse a backup phrase, validating word-list membership and checksum.
pub fn parse_backup_phrase(words: &str) -> Result<Mnemonic, SeedError> {
    Mnemonic::parse_in(Language::English, words)
        .map_err(|e| SeedError::InvalidMnemonic(e.to_string()))
}

/// Derive the 64-byte binary seed from a backup phrase.
///
/// Identity wallets always use an empty BIP-39 passphrase; the password
/// protects the phrase at rest instead (see [`crate::crypto`]).
pub fn backup_phrase_to_seed(mnemonic: &Mnemonic) -> [u8; 64] {
    mnemonic.to_seed("")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHRASE: &str = "sound idle panel often situate develop unit text design antenna \
                          vendor screen opinion balcony share trigger accuse scatter visa \
                          uniform brass update opinion media";

    #[test]
    fn test_parse_valid_phrase() {
        let mnemonic = parse_backup_phrase(PHRASE).unwrap();
        assert_eq!(mnemonic.word_count(), 24);
    }

    #[test]
    fn test_parse_rejects_bad_words() {
        let result = parse_backup_phrase("definitely not a valid backup phrase at all");
        assert!(matches!(result, Err(SeedError::InvalidMnemonic(_))));
    }

    #[test]
    fn test_parse_rejects_bad_checksum() {
        // 12 valid words, invalid checksum
        let result = parse_backup_phrase(
            "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon",
        );
        assert!(matches!(result, Err(SeedError::InvalidMnemonic(_))));
    }

    #[test]
    fn test_seed_is_deterministic() {
        let mnemonic = parse_backup_phrase(PHRASE).unwrap();
        assert_eq!(backup_phrase_to_seed(&mnemonic), backup_phrase_to_seed(&mnemonic));
    }

    #[test]
    fn test_generated_phrase_parses_back() {
        let mnemonic = generate_backup_phrase().unwrap();
        let reparsed = parse_backup_phrase(&mnemonic.to_string()).unwrap();
        assert_eq!(backup_phrase_to_seed(&mnemonic), backup_phrase_to_seed(&reparsed));
    }
}
