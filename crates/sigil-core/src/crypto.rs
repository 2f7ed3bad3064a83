//! Password-based encryption of the backup phrase
//!
//! The backup phrase is the root secret of the whole wallet; at rest it only
//! ever exists as a blob produced here. Argon2id binds the user's password to
//! a fresh 256-bit key, AES-256-GCM authenticates the payload.
//!
//! # Blob format
//!
//! `[salt (16 bytes)][nonce (12 bytes)][ciphertext + tag]`
//!
//! The format is self-describing: salt and nonce travel with the ciphertext,
//! so the password alone is enough to decrypt. The layout is stable across
//! versions of the same build.
//!
//! # Failure opacity
//!
//! [`decrypt`] reports every failure as the same [`DecryptionError`]. A wrong
//! password, a truncated blob and a tampered ciphertext are deliberately
//! indistinguishable to the caller.

use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Key, Nonce,
};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use thiserror::Error;
use zeroize::Zeroizing;

/// Argon2id parameters (OWASP recommendations for 2024+)
/// - m_cost: 64 MiB memory
/// - t_cost: 3 iterations
/// - p_cost: 4 parallel threads
const ARGON2_M_COST: u32 = 65536; // 64 MiB
const ARGON2_T_COST: u32 = 3;
const ARGON2_P_COST: u32 = 4;
const ARGON2_OUTPUT_LEN: usize = 32; // 256 bits for AES-256

/// Salt length for Argon2
const SALT_LEN: usize = 16;

/// Nonce length for AES-256-GCM
const NONCE_LEN: usize = 12;

/// GCM authentication tag length
const TAG_LEN: usize = 16;

#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),
    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),
    #[error("Cannot encrypt an empty payload")]
    EmptyPayload,
}

/// Opaque decryption failure.
///
/// Carries no cause on purpose: callers surface it as a generic
/// "Incorrect password" and must not be able to tell corruption from a
/// wrong password.
#[derive(Error, Debug, PartialEq, Eq)]
#[error("Decryption failed")]
pub struct DecryptionError;

/// Encrypted backup-phrase blob: salt || nonce || ciphertext+tag.
pub struct EncryptedBlob {
    /// Salt used for Argon2id key derivation
    salt: [u8; SALT_LEN],
    /// Nonce used for AES-256-GCM
    nonce: [u8; NONCE_LEN],
    /// Encrypted payload + authentication tag
    ciphertext: Vec<u8>,
}

impl EncryptedBlob {
    /// Encrypt an arbitrary non-empty payload under a password.
    ///
    /// Each call draws a fresh random salt and nonce, so encrypting the same
    /// payload twice yields different blobs.
    pub fn seal(plaintext: &[u8], password: &str) -> Result<Self, CryptoError> {
        if plaintext.is_empty() {
            return Err(CryptoError::EmptyPayload);
        }

        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);

        let nonce_arr = Aes256Gcm::generate_nonce(&mut OsRng);
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&nonce_arr);

        let key = derive_key(password, &salt)
            .map_err(|e| CryptoError::KeyDerivationFailed(e.to_string()))?;

        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_ref()));
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext)
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

        Ok(Self {
            salt,
            nonce,
            ciphertext,
        })
    }

    /// Decrypt the payload with the password used to seal it.
    ///
    /// Fails closed: a failed authentication check never yields plaintext.
    pub fn open(&self, password: &str) -> Result<Zeroizing<Vec<u8>>, DecryptionError> {
        let key = derive_key(password, &self.salt).map_err(|_| DecryptionError)?;

        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_ref()));
        let plaintext = cipher
            .decrypt(Nonce::from_slice(&self.nonce), self.ciphertext.as_slice())
            .map_err(|_| DecryptionError)?;

        Ok(Zeroizing::new(plaintext))
    }

    /// Serialize to bytes: salt || nonce || ciphertext
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(SALT_LEN + NONCE_LEN + self.ciphertext.len());
        bytes.extend_from_slice(&self.salt);
        bytes.extend_from_slice(&self.nonce);
        bytes.extend_from_slice(&self.ciphertext);
        bytes
    }

    /// Deserialize from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecryptionError> {
        // Minimum size: salt + nonce + at least 1 payload byte + tag
        if bytes.len() < SALT_LEN + NONCE_LEN + TAG_LEN + 1 {
            return Err(DecryptionError);
        }

        let mut salt = [0u8; SALT_LEN];
        let mut nonce = [0u8; NONCE_LEN];

        salt.copy_from_slice(&bytes[0..SALT_LEN]);
        nonce.copy_from_slice(&bytes[SALT_LEN..SALT_LEN + NONCE_LEN]);
        let ciphertext = bytes[SALT_LEN + NONCE_LEN..].to_vec();

        Ok(Self {
            salt,
            nonce,
            ciphertext,
        })
    }
}

/// Derive an encryption key from a password using Argon2id
fn derive_key(
    password: &str,
    salt: &[u8; SALT_LEN],
) -> Result<Zeroizing<[u8; ARGON2_OUTPUT_LEN]>, argon2::Error> {
    let params = Params::new(
        ARGON2_M_COST,
        ARGON2_T_COST,
        ARGON2_P_COST,
        Some(ARGON2_OUTPUT_LEN),
    )?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = Zeroizing::new([0u8; ARGON2_OUTPUT_LEN]);
    argon2.hash_password_into(password.as_bytes(), salt, key.as_mut())?;

    Ok(key)
}

/// Encrypt a payload under a password, returning the serialized blob.
pub fn encrypt(plaintext: &[u8], password: &str) -> Result<Vec<u8>, CryptoError> {
    EncryptedBlob::seal(plaintext, password).map(|blob| blob.to_bytes())
}

/// Decrypt a serialized blob with a password.
///
/// Malformed and tampered blobs fail the same way as a wrong password.
pub fn decrypt(blob: &[u8], password: &str) -> Result<Zeroizing<Vec<u8>>, DecryptionError> {
    EncryptedBlob::from_bytes(blob)?.open(password)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let phrase = b"sound idle panel often situate develop unit";
        let password = "correct horse battery staple";

        let blob = encrypt(phrase, password).unwrap();
        let decrypted = decrypt(&blob, password).unwrap();

        assert_eq!(phrase.as_slice(), decrypted.as_slice());
    }

    #[test]
    fn test_wrong_password_fails() {
        let phrase = b"some backup phrase";

        let blob = encrypt(phrase, "correct password").unwrap();
        let result = decrypt(&blob, "wrong password");

        assert_eq!(result.unwrap_err(), DecryptionError);
    }

    #[test]
    fn test_different_encryptions_different_blobs() {
        let phrase = b"same payload";
        let password = "same password";

        let blob1 = encrypt(phrase, password).unwrap();
        let blob2 = encrypt(phrase, password).unwrap();

        // Random salt and nonce per call
        assert_ne!(blob1, blob2);

        assert_eq!(decrypt(&blob1, password).unwrap().as_slice(), phrase);
        assert_eq!(decrypt(&blob2, password).unwrap().as_slice(), phrase);
    }

    #[test]
    fn test_tampering_detected_in_every_region() {
        let phrase = b"tamper target payload";
        let password = "test password";

        let blob = encrypt(phrase, password).unwrap();

        // One position in the salt, the nonce, the ciphertext body and the
        // auth tag each; flipping any single byte must fail the decrypt.
        let positions = [
            0,              // salt
            SALT_LEN,       // nonce
            SALT_LEN + NONCE_LEN + 2, // ciphertext
            blob.len() - 1, // tag
        ];
        for &pos in &positions {
            let mut tampered = blob.clone();
            tampered[pos] ^= 0x01;
            assert_eq!(
                decrypt(&tampered, password).unwrap_err(),
                DecryptionError,
                "flipped byte at {} went undetected",
                pos
            );
        }
    }

    #[test]
    fn test_truncated_blob_fails_like_wrong_password() {
        let blob = encrypt(b"payload", "pw").unwrap();
        assert_eq!(decrypt(&blob[..20], "pw").unwrap_err(), DecryptionError);
        assert_eq!(decrypt(&[], "pw").unwrap_err(), DecryptionError);
    }

    #[test]
    fn test_empty_payload_rejected() {
        assert!(matches!(
            encrypt(b"", "pw"),
            Err(CryptoError::EmptyPayload)
        ));
    }

    #[test]
    fn test_serialization_roundtrip() {
        let phrase = b"serialize me";
        let password = "test password";

        let blob = EncryptedBlob::seal(phrase, password).unwrap();
        let bytes = blob.to_bytes();
        let restored = EncryptedBlob::from_bytes(&bytes).unwrap();

        assert_eq!(restored.open(password).unwrap().as_slice(), phrase);
    }
}
