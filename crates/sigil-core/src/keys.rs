//! HD keychain derivation
//!
//! One master seed yields two independent keychains along fixed paths:
//! the Bitcoin payment keychain (m/44'/0'/0') and the identity keychain
//! (m/888'/0'). Every implementation must agree on these constants exactly,
//! or wallets stop being portable.
//!
//! [`Keychain`] wraps either a private or a neutered (public-only) extended
//! key behind one node type, because the two sides of the tree need
//! different capabilities at runtime: payment addresses derive along
//! non-hardened paths from a neutered keychain, while identity derivation is
//! hardened and must fail on a keychain without its private key.

use std::str::FromStr;

use bitcoin::bip32::{ChildNumber, DerivationPath, Xpriv, Xpub};
use bitcoin::secp256k1::Secp256k1;
use bitcoin::{Address, CompressedPublicKey, Network};
use thiserror::Error;

/// BIP-44 Bitcoin account keychain path
pub const BITCOIN_KEYCHAIN_PATH: &str = "m/44'/0'/0'";

/// Identity keychain path
pub const IDENTITY_KEYCHAIN_PATH: &str = "m/888'/0'";

/// Hardened child of an identity owner node holding per-application keys
pub const APPS_NODE_INDEX: u32 = 0;

/// Hardened child of an identity owner node used for signing
pub const SIGNING_NODE_INDEX: u32 = 1;

/// Hardened child of an identity owner node used for encryption
pub const ENCRYPTION_NODE_INDEX: u32 = 2;

/// Hardened child of an apps node whose bare private key seeds the
/// cross-identity shared-apps tree
pub const PUBLIC_SHARED_APPS_NODE_INDEX: u32 = 0;

#[derive(Error, Debug)]
pub enum KeyError {
    #[error("Derivation failed: {0}")]
    DerivationFailed(String),
    #[error("Invalid path: {0}")]
    InvalidPath(String),
    #[error("Invalid extended key: {0}")]
    InvalidExtendedKey(String),
    #[error("Hardened derivation requires the private key")]
    MissingPrivateKey,
    #[error("Invalid chain type: {0}")]
    InvalidChainType(String),
}

/// Which side of a BIP-44 account the address lives on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChainType {
    /// Receive addresses (chain 0)
    #[default]
    External,
    /// Change addresses (chain 1)
    Change,
}

impl ChainType {
    fn chain_index(self) -> u32 {
        match self {
            ChainType::External => 0,
            ChainType::Change => 1,
        }
    }
}

impl FromStr for ChainType {
    type Err = KeyError;

    /// Parse the boundary token; anything but the two recognized tokens is
    /// an [`KeyError::InvalidChainType`].
    fn from_str(s: &str) -> Result<Self, KeyError> {
        match s {
            "EXTERNAL_ADDRESS" => Ok(ChainType::External),
            "CHANGE_ADDRESS" => Ok(ChainType::Change),
            other => Err(KeyError::InvalidChainType(other.to_string())),
        }
    }
}

/// An HD keychain node: a private extended key, or its neutered public form.
///
/// Derivation is purely functional; a node is never mutated after creation.
#[derive(Debug, Clone)]
pub enum Keychain {
    Private(Xpriv),
    Public(Xpub),
}

impl Keychain {
    /// Build the master keychain from a binary seed.
    pub fn from_seed(seed: &[u8]) -> Result<Self, KeyError> {
        Xpriv::new_master(Network::Bitcoin, seed)
            .map(Keychain::Private)
            .map_err(|e| KeyError::DerivationFailed(e.to_string()))
    }

    /// Parse a standard extended-key string (xprv or xpub).
    pub fn from_base58(s: &str) -> Result<Self, KeyError> {
        if let Ok(xpriv) = Xpriv::from_str(s) {
            return Ok(Keychain::Private(xpriv));
        }
        Xpub::from_str(s)
            .map(Keychain::Public)
            .map_err(|e| KeyError::InvalidExtendedKey(e.to_string()))
    }

    /// Whether this node has been stripped of its private key.
    pub fn is_neutered(&self) -> bool {
        matches!(self, Keychain::Public(_))
    }

    /// The public-only form of this node.
    pub fn neutered(&self) -> Keychain {
        match self {
            Keychain::Private(xpriv) => {
                let secp = Secp256k1::new();
                Keychain::Public(Xpub::from_priv(&secp, xpriv))
            }
            Keychain::Public(xpub) => Keychain::Public(*xpub),
        }
    }

    /// Derive the non-hardened child at `index`. Works on private and
    /// neutered nodes alike.
    pub fn derive(&self, index: u32) -> Result<Keychain, KeyError> {
        let child = ChildNumber::from_normal_idx(index)
            .map_err(|e| KeyError::DerivationFailed(e.to_string()))?;
        self.derive_child(child)
    }

    /// Derive the hardened child at `index`.
    ///
    /// Fails with [`KeyError::MissingPrivateKey`] on a neutered node.
    pub fn derive_hardened(&self, index: u32) -> Result<Keychain, KeyError> {
        let child = ChildNumber::from_hardened_idx(index)
            .map_err(|e| KeyError::DerivationFailed(e.to_string()))?;
        self.derive_child(child)
    }

    fn derive_child(&self, child: ChildNumber) -> Result<Keychain, KeyError> {
        let secp = Secp256k1::new();
        match self {
            Keychain::Private(xpriv) => xpriv
                .derive_priv(&secp, &[child])
                .map(Keychain::Private)
                .map_err(|e| KeyError::DerivationFailed(e.to_string())),
            Keychain::Public(xpub) => {
                if child.is_hardened() {
                    return Err(KeyError::MissingPrivateKey);
                }
                xpub.derive_pub(&secp, &[child])
                    .map(Keychain::Public)
                    .map_err(|e| KeyError::DerivationFailed(e.to_string()))
            }
        }
    }

    /// Derive along a whole path string such as `"m/44'/0'/0'"`.
    pub fn derive_path(&self, path: &str) -> Result<Keychain, KeyError> {
        let path: DerivationPath = path
            .parse()
            .map_err(|e: bitcoin::bip32::Error| KeyError::InvalidPath(e.to_string()))?;
        let secp = Secp256k1::new();
        match self {
            Keychain::Private(xpriv) => xpriv
                .derive_priv(&secp, &path)
                .map(Keychain::Private)
                .map_err(|e| KeyError::DerivationFailed(e.to_string())),
            Keychain::Public(xpub) => {
                if path.as_ref().iter().any(|c| c.is_hardened()) {
                    return Err(KeyError::MissingPrivateKey);
                }
                xpub.derive_pub(&secp, &path)
                    .map(Keychain::Public)
                    .map_err(|e| KeyError::DerivationFailed(e.to_string()))
            }
        }
    }

    /// The node's compressed public key.
    pub fn public_key(&self) -> bitcoin::secp256k1::PublicKey {
        match self {
            Keychain::Private(xpriv) => {
                let secp = Secp256k1::new();
                xpriv.private_key.public_key(&secp)
            }
            Keychain::Public(xpub) => xpub.public_key,
        }
    }

    /// The node's compressed public key, hex-encoded.
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key().serialize())
    }

    /// The node's private key, if it has one.
    pub fn private_key(&self) -> Result<&bitcoin::secp256k1::SecretKey, KeyError> {
        match self {
            Keychain::Private(xpriv) => Ok(&xpriv.private_key),
            Keychain::Public(_) => Err(KeyError::MissingPrivateKey),
        }
    }

    /// The node's private key, hex-encoded.
    pub fn private_key_hex(&self) -> Result<String, KeyError> {
        self.private_key().map(|sk| hex::encode(sk.secret_bytes()))
    }

    /// The P2PKH address of the node's public key (mainnet).
    pub fn address(&self) -> String {
        let compressed = CompressedPublicKey(self.public_key());
        Address::p2pkh(&compressed, Network::Bitcoin).to_string()
    }

    /// The standard extended-key string encoding of this node.
    pub fn to_base58(&self) -> String {
        match self {
            Keychain::Private(xpriv) => xpriv.to_string(),
            Keychain::Public(xpub) => xpub.to_string(),
        }
    }
}

/// Derive the Bitcoin payment keychain (m/44'/0'/0') from the master node.
pub fn derive_bitcoin_private_keychain(master: &Keychain) -> Result<Keychain, KeyError> {
    master.derive_path(BITCOIN_KEYCHAIN_PATH)
}

/// Neutered counterpart of [`derive_bitcoin_private_keychain`].
pub fn derive_bitcoin_public_keychain(master: &Keychain) -> Result<Keychain, KeyError> {
    Ok(derive_bitcoin_private_keychain(master)?.neutered())
}

/// Derive the identity keychain (m/888'/0') from the master node.
pub fn derive_identity_private_keychain(master: &Keychain) -> Result<Keychain, KeyError> {
    master.derive_path(IDENTITY_KEYCHAIN_PATH)
}

/// Neutered counterpart of [`derive_identity_private_keychain`].
pub fn derive_identity_public_keychain(master: &Keychain) -> Result<Keychain, KeyError> {
    Ok(derive_identity_private_keychain(master)?.neutered())
}

/// Derive a payment address node: `chain/index` below the Bitcoin keychain,
/// non-hardened, so a neutered keychain works too.
pub fn derive_bitcoin_address_node(
    bitcoin_keychain: &Keychain,
    address_index: u32,
    chain_type: ChainType,
) -> Result<Keychain, KeyError> {
    bitcoin_keychain
        .derive(chain_type.chain_index())?
        .derive(address_index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::{backup_phrase_to_seed, parse_backup_phrase};

    const PHRASE: &str = "sound idle panel often situate develop unit text design antenna \
                          vendor screen opinion balcony share trigger accuse scatter visa \
                          uniform brass update opinion media";

    fn master() -> Keychain {
        let mnemonic = parse_backup_phrase(PHRASE).unwrap();
        Keychain::from_seed(&backup_phrase_to_seed(&mnemonic)).unwrap()
    }

    #[test]
    fn test_keychain_paths_are_isolated() {
        let master = master();
        let bitcoin = derive_bitcoin_private_keychain(&master).unwrap();
        let identity = derive_identity_private_keychain(&master).unwrap();

        assert_ne!(
            bitcoin.private_key_hex().unwrap(),
            identity.private_key_hex().unwrap()
        );
        assert_ne!(bitcoin.public_key(), identity.public_key());
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let a = derive_bitcoin_private_keychain(&master()).unwrap();
        let b = derive_bitcoin_private_keychain(&master()).unwrap();
        assert_eq!(a.to_base58(), b.to_base58());
    }

    #[test]
    fn test_first_bitcoin_address_from_public_keychain() {
        let public_keychain = derive_bitcoin_public_keychain(&master()).unwrap();
        let node =
            derive_bitcoin_address_node(&public_keychain, 0, ChainType::External).unwrap();
        assert_eq!(node.address(), "112FogMTesWmLzkWbtKrSg3p9LK6Lucn4s");
    }

    #[test]
    fn test_external_and_change_chains_differ() {
        let keychain = derive_bitcoin_private_keychain(&master()).unwrap();
        let external = derive_bitcoin_address_node(&keychain, 0, ChainType::External).unwrap();
        let change = derive_bitcoin_address_node(&keychain, 0, ChainType::Change).unwrap();
        assert_ne!(external.address(), change.address());
    }

    #[test]
    fn test_public_derivation_matches_private_then_neuter() {
        let private_keychain = derive_bitcoin_private_keychain(&master()).unwrap();
        let public_keychain = private_keychain.neutered();

        let via_private = derive_bitcoin_address_node(&private_keychain, 3, ChainType::External)
            .unwrap()
            .neutered();
        let via_public =
            derive_bitcoin_address_node(&public_keychain, 3, ChainType::External).unwrap();

        assert_eq!(via_private.to_base58(), via_public.to_base58());
    }

    #[test]
    fn test_hardened_derivation_from_public_fails() {
        let public_master = master().neutered();
        assert!(matches!(
            public_master.derive_hardened(0),
            Err(KeyError::MissingPrivateKey)
        ));
        assert!(matches!(
            derive_identity_private_keychain(&public_master),
            Err(KeyError::MissingPrivateKey)
        ));
    }

    #[test]
    fn test_neutered_node_has_no_private_key() {
        let public_master = master().neutered();
        assert!(public_master.is_neutered());
        assert!(matches!(
            public_master.private_key_hex(),
            Err(KeyError::MissingPrivateKey)
        ));
    }

    #[test]
    fn test_chain_type_tokens() {
        assert_eq!(
            "EXTERNAL_ADDRESS".parse::<ChainType>().unwrap(),
            ChainType::External
        );
        assert_eq!(
            "CHANGE_ADDRESS".parse::<ChainType>().unwrap(),
            ChainType::Change
        );
        assert!(matches!(
            "SIDE_ADDRESS".parse::<ChainType>(),
            Err(KeyError::InvalidChainType(_))
        ));
    }

    #[test]
    fn test_base58_roundtrip() {
        let keychain = derive_bitcoin_private_keychain(&master()).unwrap();

        let reparsed = Keychain::from_base58(&keychain.to_base58()).unwrap();
        assert!(!reparsed.is_neutered());
        assert_eq!(reparsed.to_base58(), keychain.to_base58());

        let public = keychain.neutered();
        let reparsed_pub = Keychain::from_base58(&public.to_base58()).unwrap();
        assert!(reparsed_pub.is_neutered());
        assert_eq!(reparsed_pub.to_base58(), public.to_base58());

        assert!(Keychain::from_base58("not a keychain").is_err());
    }
}
