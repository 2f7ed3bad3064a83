//! Identity owner nodes and per-application key namespacing
//!
//! Each identity is a hardened child of the identity keychain. An identity
//! owner node carries a salt (the hash of the identity keychain's public
//! key) and derives its sub-tree on demand: an apps node, a signing node and
//! an encryption node. Per-application keys hang off the apps node at an
//! index computed from `sha256(domain || salt)`, so two identities never map
//! the same domain to the same key.
//!
//! Nothing here is cached: every node is a pure function of its parent and
//! index, and callers may memoize by `(identity_index, domain)` if they want.

use bitcoin::hashes::{sha256, Hash};
use serde::{Deserialize, Serialize};

use crate::keys::{
    KeyError, Keychain, APPS_NODE_INDEX, ENCRYPTION_NODE_INDEX, PUBLIC_SHARED_APPS_NODE_INDEX,
    SIGNING_NODE_INDEX,
};

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256::Hash::hash(data).to_byte_array())
}

/// 31-multiplier string fold over the characters of `s`, masked to a
/// non-negative 31-bit value.
///
/// The fold runs over the *hex digest string*, not the raw digest bytes, and
/// distinct domains can collide in the 31-bit index space; both quirks are
/// wallet-portable behavior and must not change without a protocol version
/// bump.
fn hash_code(s: &str) -> u32 {
    let mut hash: u32 = 0;
    for ch in s.chars() {
        hash = hash.wrapping_mul(31).wrapping_add(ch as u32);
    }
    hash & 0x7fff_ffff
}

/// An identity's root node: the hardened child of the identity keychain at
/// the identity's index, plus the namespacing salt.
pub struct IdentityOwnerNode {
    node: Keychain,
    salt: String,
}

/// The hardened child of an owner node that parents all of the identity's
/// per-application keys.
pub struct AppsNode {
    node: Keychain,
    salt: String,
}

/// A single application's key node.
pub struct AppNode {
    node: Keychain,
    domain: String,
}

/// Derive the identity owner node at `identity_index`.
///
/// The salt is computed here, once, from the identity keychain's public key;
/// its stability across a session is what keeps a domain mapped to the same
/// per-identity app key.
pub fn derive_identity_owner_node(
    identity_keychain: &Keychain,
    identity_index: u32,
) -> Result<IdentityOwnerNode, KeyError> {
    if identity_keychain.is_neutered() {
        return Err(KeyError::MissingPrivateKey);
    }

    let salt = sha256_hex(identity_keychain.public_key_hex().as_bytes());
    let node = identity_keychain.derive_hardened(identity_index)?;

    Ok(IdentityOwnerNode { node, salt })
}

impl IdentityOwnerNode {
    /// The per-identity namespacing salt, hex-encoded.
    pub fn salt(&self) -> &str {
        &self.salt
    }

    /// The underlying keychain node.
    pub fn node(&self) -> &Keychain {
        &self.node
    }

    /// The identity's private key, hex-encoded.
    pub fn identity_key(&self) -> Result<String, KeyError> {
        self.node.private_key_hex()
    }

    /// The identity's key ID: its public key, hex-encoded.
    pub fn identity_key_id(&self) -> String {
        self.node.public_key_hex()
    }

    /// The identity's P2PKH address.
    pub fn address(&self) -> String {
        self.node.address()
    }

    /// Derive the apps node for this identity.
    pub fn apps_node(&self) -> Result<AppsNode, KeyError> {
        Ok(AppsNode {
            node: self.node.derive_hardened(APPS_NODE_INDEX)?,
            salt: self.salt.clone(),
        })
    }

    /// Derive this identity's signing node.
    pub fn signing_node(&self) -> Result<Keychain, KeyError> {
        self.node.derive_hardened(SIGNING_NODE_INDEX)
    }

    /// Derive this identity's encryption node.
    pub fn encryption_node(&self) -> Result<Keychain, KeyError> {
        self.node.derive_hardened(ENCRYPTION_NODE_INDEX)
    }

    /// The shared-apps private key for this identity; see
    /// [`AppsNode::shared_apps_private_key`].
    pub fn shared_apps_private_key(&self) -> Result<[u8; 32], KeyError> {
        self.apps_node()?.shared_apps_private_key()
    }
}

impl AppsNode {
    /// The underlying keychain node.
    pub fn node(&self) -> &Keychain {
        &self.node
    }

    /// The identity's namespacing salt.
    pub fn salt(&self) -> &str {
        &self.salt
    }

    /// The extended-key string encoding of this node.
    pub fn to_base58(&self) -> String {
        self.node.to_base58()
    }

    /// Derive the key node for an application domain.
    ///
    /// The hardened child index is `hash_code(hex(sha256(domain || salt)))`;
    /// concatenation order is significant for portability.
    pub fn app_node(&self, app_domain: &str) -> Result<AppNode, KeyError> {
        let digest = sha256_hex(format!("{}{}", app_domain, self.salt).as_bytes());
        let app_index = hash_code(&digest);
        let node = self.node.derive_hardened(app_index)?;
        Ok(AppNode {
            node,
            domain: app_domain.to_string(),
        })
    }

    /// The private key of the hardened child at the shared-apps index.
    ///
    /// Only the bare key leaves this function: the BIP32 chain is halted
    /// here, and relying applications import the key as a fresh master seed
    /// for namespaces shared across identities.
    pub fn shared_apps_private_key(&self) -> Result<[u8; 32], KeyError> {
        let intermediate = self.node.derive_hardened(PUBLIC_SHARED_APPS_NODE_INDEX)?;
        Ok(intermediate.private_key()?.secret_bytes())
    }
}

impl AppNode {
    /// The domain this key was derived for. Reference only: the domain is
    /// not key material once the index is computed.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// The application's private key, hex-encoded.
    pub fn app_private_key(&self) -> Result<String, KeyError> {
        self.node.private_key_hex()
    }

    /// The application's P2PKH address.
    pub fn address(&self) -> String {
        self.node.address()
    }
}

/// Flattened, serializable snapshot of an identity owner node.
///
/// This record is the only form that crosses the UI/store boundary; raw
/// nodes never do. Field names are part of the external contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityKeyPair {
    /// Identity private key (hex)
    pub key: String,
    /// Identity public key (hex)
    #[serde(rename = "keyID")]
    pub key_id: String,
    /// Identity P2PKH address
    pub address: String,
    /// Shared-apps private key (hex)
    #[serde(rename = "sharedAppsKey")]
    pub shared_apps_key: String,
    /// Apps node as an extended-key string
    #[serde(rename = "appsNodeKey")]
    pub apps_node_key: String,
    /// Namespacing salt (hex)
    pub salt: String,
}

/// Flatten an identity owner node into its serializable snapshot.
pub fn derive_identity_key_pair(owner: &IdentityOwnerNode) -> Result<IdentityKeyPair, KeyError> {
    let apps_node = owner.apps_node()?;
    Ok(IdentityKeyPair {
        key: owner.identity_key()?,
        key_id: owner.identity_key_id(),
        address: owner.address(),
        shared_apps_key: hex::encode(owner.shared_apps_private_key()?),
        apps_node_key: apps_node.to_base58(),
        salt: apps_node.salt().to_string(),
    })
}
