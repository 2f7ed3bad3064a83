//! Sigil Core
//!
//! Key derivation and seed vault for the Sigil self-sovereign identity wallet.
//!
//! # Key Derivation
//!
//! A single BIP-39 backup phrase yields, deterministically:
//! - the Bitcoin payment keychain at m/44'/0'/0'
//! - the identity keychain at m/888'/0', with one hardened child per identity
//! - per-application keys under each identity's apps node, indexed by a
//!   salted hash of the application domain
//!
//! # Encrypted Storage
//!
//! The backup phrase is the only secret that is ever persisted, and only
//! encrypted under the user's password with Argon2id + AES-256-GCM.

pub mod account;
pub mod crypto;
pub mod identity;
pub mod keys;
pub mod profile;
pub mod seed;
pub mod validate;

pub use account::{
    decrypt_bitcoin_private_key, decrypt_master_keychain, encrypt_backup_phrase,
    generate_identities, AccountError, IdentityBatch,
};
pub use crypto::{decrypt, encrypt, CryptoError, DecryptionError, EncryptedBlob};
pub use identity::{
    derive_identity_key_pair, derive_identity_owner_node, AppNode, AppsNode, IdentityKeyPair,
    IdentityOwnerNode,
};
pub use keys::{
    derive_bitcoin_address_node, derive_bitcoin_private_keychain, derive_bitcoin_public_keychain,
    derive_identity_private_keychain, derive_identity_public_keychain, ChainType, KeyError,
    Keychain,
};
pub use profile::{
    calculate_profile_completeness, calculate_trust_level, Profile, Verification, MAX_TRUST_LEVEL,
};
pub use seed::{backup_phrase_to_seed, generate_backup_phrase, parse_backup_phrase, SeedError};
pub use validate::{
    find_address_index, is_backup_phrase_valid, is_password_valid, ValidationResult,
};
