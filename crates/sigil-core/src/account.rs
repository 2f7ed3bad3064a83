//! Account unlock and identity bootstrapping
//!
//! The unlock path runs the whole chain in one scope: encrypted blob →
//! backup phrase → seed → master keychain. The seed and phrase are dropped
//! (and zeroized) before the call returns; only the keychain leaves.
//!
//! Every unlock failure collapses into [`AccountError::IncorrectPassword`];
//! the caller must not be able to tell a corrupt blob from a wrong password.
//! The underlying cause goes to the log and nowhere else.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::Zeroizing;

use crate::crypto;
use crate::identity::{derive_identity_key_pair, derive_identity_owner_node, IdentityKeyPair};
use crate::keys::{self, ChainType, KeyError, Keychain};
use crate::seed;

#[derive(Error, Debug)]
pub enum AccountError {
    #[error("Incorrect password")]
    IncorrectPassword,
    #[error(transparent)]
    Key(#[from] KeyError),
}

/// Encrypt a backup phrase for storage, returning the hex blob that is the
/// phrase's only at-rest representation.
pub fn encrypt_backup_phrase(
    backup_phrase: &str,
    password: &str,
) -> Result<String, crate::crypto::CryptoError> {
    crypto::encrypt(backup_phrase.as_bytes(), password).map(hex::encode)
}

/// Decrypt the master keychain from an encrypted backup phrase (hex blob).
///
/// This is the blocking form; the Argon2id step makes it deliberately slow.
/// Async callers should use [`decrypt_master_keychain`] instead of running
/// this on an executor thread.
pub fn decrypt_master_keychain_blocking(
    password: &str,
    encrypted_backup_phrase: &str,
) -> Result<Keychain, AccountError> {
    unlock(password, encrypted_backup_phrase).map_err(|cause| {
        log::error!("decrypt_master_keychain: {cause}");
        AccountError::IncorrectPassword
    })
}

fn unlock(password: &str, encrypted_backup_phrase: &str) -> Result<Keychain, String> {
    let blob = hex::decode(encrypted_backup_phrase).map_err(|e| e.to_string())?;
    let plaintext = crypto::decrypt(&blob, password).map_err(|e| e.to_string())?;
    let phrase = std::str::from_utf8(&plaintext).map_err(|e| e.to_string())?;
    let mnemonic = seed::parse_backup_phrase(phrase).map_err(|e| e.to_string())?;
    let seed_bytes = Zeroizing::new(seed::backup_phrase_to_seed(&mnemonic));
    let master = Keychain::from_seed(seed_bytes.as_slice()).map_err(|e| e.to_string())?;
    log::info!("decrypt_master_keychain: decrypted");
    Ok(master)
}

/// Async form of [`decrypt_master_keychain_blocking`]: the CPU-bound work is
/// dispatched to the blocking pool and the future only delivers the result.
pub async fn decrypt_master_keychain(
    password: impl Into<String>,
    encrypted_backup_phrase: impl Into<String>,
) -> Result<Keychain, AccountError> {
    let password = Zeroizing::new(password.into());
    let blob = encrypted_backup_phrase.into();
    let task =
        tokio::task::spawn_blocking(move || decrypt_master_keychain_blocking(&password, &blob));
    match task.await {
        Ok(result) => result,
        // A lost worker is reported no differently than a failed decrypt.
        Err(join_err) => {
            log::error!("decrypt_master_keychain: worker task failed: {join_err}");
            Err(AccountError::IncorrectPassword)
        }
    }
}

/// Decrypt the private key of the first external-chain Bitcoin address.
pub fn decrypt_bitcoin_private_key_blocking(
    password: &str,
    encrypted_backup_phrase: &str,
) -> Result<String, AccountError> {
    let master = decrypt_master_keychain_blocking(password, encrypted_backup_phrase)?;
    let bitcoin_keychain = keys::derive_bitcoin_private_keychain(&master)?;
    let address_node = keys::derive_bitcoin_address_node(&bitcoin_keychain, 0, ChainType::External)?;
    Ok(address_node.private_key_hex()?)
}

/// Async form of [`decrypt_bitcoin_private_key_blocking`].
pub async fn decrypt_bitcoin_private_key(
    password: impl Into<String>,
    encrypted_backup_phrase: impl Into<String>,
) -> Result<String, AccountError> {
    let password = Zeroizing::new(password.into());
    let blob = encrypted_backup_phrase.into();
    let task = tokio::task::spawn_blocking(move || {
        decrypt_bitcoin_private_key_blocking(&password, &blob)
    });
    match task.await {
        Ok(result) => result,
        Err(join_err) => {
            log::error!("decrypt_bitcoin_private_key: worker task failed: {join_err}");
            Err(AccountError::IncorrectPassword)
        }
    }
}

/// Everything the store needs after bootstrapping a wallet: shareable public
/// keychains plus the pre-generated identities.
///
/// `identity_addresses[i]` always belongs to `identity_keypairs[i]`;
/// consumers rely on the positional correspondence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityBatch {
    pub identity_public_keychain: String,
    pub bitcoin_public_keychain: String,
    pub first_bitcoin_address: String,
    pub identity_addresses: Vec<String>,
    pub identity_keypairs: Vec<IdentityKeyPair>,
}

/// Pre-generate `identities_to_generate` identities from one master
/// keychain in a single pass, so the user is not re-prompted for the
/// password on each new profile.
///
/// All-or-nothing: a failure at any index aborts the whole batch, so the
/// two parallel sequences can never be observed with mismatched lengths.
pub fn generate_identities(
    master_keychain: &Keychain,
    identities_to_generate: u32,
) -> Result<IdentityBatch, KeyError> {
    let identity_private_keychain = keys::derive_identity_private_keychain(master_keychain)?;
    let bitcoin_private_keychain = keys::derive_bitcoin_private_keychain(master_keychain)?;

    let identity_public_keychain = identity_private_keychain.neutered();
    let bitcoin_public_keychain = bitcoin_private_keychain.neutered();

    // No private key needed for the first receive address: derive it from
    // the neutered keychain so the value is safe to hand to less-trusted
    // code paths.
    let first_bitcoin_address =
        keys::derive_bitcoin_address_node(&bitcoin_public_keychain, 0, ChainType::External)?
            .address();

    let mut identity_addresses = Vec::with_capacity(identities_to_generate as usize);
    let mut identity_keypairs = Vec::with_capacity(identities_to_generate as usize);

    for identity_index in 0..identities_to_generate {
        let owner = derive_identity_owner_node(&identity_private_keychain, identity_index)?;
        let keypair = derive_identity_key_pair(&owner)?;
        identity_addresses.push(keypair.address.clone());
        identity_keypairs.push(keypair);
        log::debug!("generate_identities: identity index {identity_index}");
    }

    Ok(IdentityBatch {
        identity_public_keychain: identity_public_keychain.to_base58(),
        bitcoin_public_keychain: bitcoin_public_keychain.to_base58(),
        first_bitcoin_address,
        identity_addresses,
        identity_keypairs,
    })
}
