use serde::{Deserialize, Serialize};

use crate::core::models::key::{KeyId, PublicKey, SecretKey};

/// A primary public key, its subkeys and the user ids bound to it.
///
/// `keys[0]` is the primary key; subkeys follow in their packet order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKeyRing {
    pub keys: Vec<PublicKey>,
    pub user_ids: Vec<String>,
}

impl PublicKeyRing {
    pub fn primary(&self) -> Option<&PublicKey> {
        self.keys.first()
    }

    pub fn primary_key_id(&self) -> Option<KeyId> {
        self.primary().map(|k| k.key_id)
    }

    pub fn key(&self, key_id: KeyId) -> Option<&PublicKey> {
        self.keys.iter().find(|k| k.key_id == key_id)
    }
}

/// Ordered collection of public key-rings.
///
/// Never edited in place by the store: imports build a new bundle and
/// swap it in wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKeyRingBundle {
    pub rings: Vec<PublicKeyRing>,
}

impl PublicKeyRingBundle {
    pub fn new(rings: Vec<PublicKeyRing>) -> Self {
        Self { rings }
    }

    pub fn len(&self) -> usize {
        self.rings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }

    /// Find a public key by exact key id across every ring.
    pub fn key(&self, key_id: KeyId) -> Option<&PublicKey> {
        self.rings.iter().find_map(|ring| ring.key(key_id))
    }
}

/// Secret counterpart of [`PublicKeyRing`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretKeyRing {
    pub keys: Vec<SecretKey>,
    pub user_ids: Vec<String>,
}

impl SecretKeyRing {
    pub fn key(&self, key_id: KeyId) -> Option<&SecretKey> {
        self.keys.iter().find(|k| k.key_id() == key_id)
    }
}

/// Ordered collection of secret key-rings. Read-only in this crate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretKeyRingBundle {
    pub rings: Vec<SecretKeyRing>,
}

impl SecretKeyRingBundle {
    pub fn new(rings: Vec<SecretKeyRing>) -> Self {
        Self { rings }
    }

    pub fn len(&self) -> usize {
        self.rings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }

    /// Find a secret key by exact key id across every ring.
    pub fn key(&self, key_id: KeyId) -> Option<&SecretKey> {
        self.rings.iter().find_map(|ring| ring.key(key_id))
    }

    /// The first user id of the ring holding `key_id`.
    pub fn user_id_for(&self, key_id: KeyId) -> Option<&str> {
        self.rings
            .iter()
            .find(|ring| ring.key(key_id).is_some())
            .and_then(|ring| ring.user_ids.first())
            .map(String::as_str)
    }
}
