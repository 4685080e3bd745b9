use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// A 64-bit OpenPGP key identifier.
///
/// Displayed as 16 upper-case hex digits, the way key ids are usually
/// shown to users (`00000000ABCD1234`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyId(pub u64);

impl std::fmt::Display for KeyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016X}", self.0)
    }
}

impl std::str::FromStr for KeyId {
    type Err = std::num::ParseIntError;

    /// Accepts hex with or without a `0x` prefix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .trim()
            .trim_start_matches("0x")
            .trim_start_matches("0X");
        u64::from_str_radix(hex, 16).map(KeyId)
    }
}

/// Public half of an OpenPGP key (primary key or subkey).
///
/// `material` is opaque to this crate; only the engine interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey {
    pub key_id: KeyId,
    /// Public-key algorithm wire tag.
    pub algorithm: u8,
    pub encryption_capable: bool,
    pub revoked: bool,
    pub created_at: DateTime<Utc>,
    /// Seconds after `created_at` the key stays valid; 0 means no expiry.
    pub validity_seconds: u64,
    pub material: Vec<u8>,
}

impl PublicKey {
    /// The instant this key expires, or `None` for keys without expiry.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        if self.validity_seconds == 0 {
            return None;
        }
        let secs = i64::try_from(self.validity_seconds).unwrap_or(i64::MAX);
        Some(
            Duration::try_seconds(secs)
                .and_then(|validity| self.created_at.checked_add_signed(validity))
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        )
    }
}

/// A secret key: its public half plus passphrase-protected private material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretKey {
    pub public: PublicKey,
    pub signing_capable: bool,
    pub encrypted_material: Vec<u8>,
}

impl SecretKey {
    pub fn key_id(&self) -> KeyId {
        self.public.key_id
    }
}

/// An unlocked secret key, ready for signing or session-key decryption.
///
/// The private material is wiped when the value is dropped.
pub struct PrivateKey {
    pub key_id: KeyId,
    pub algorithm: u8,
    material: Zeroizing<Vec<u8>>,
}

impl PrivateKey {
    pub fn new(key_id: KeyId, algorithm: u8, material: Vec<u8>) -> Self {
        Self {
            key_id,
            algorithm,
            material: Zeroizing::new(material),
        }
    }

    pub fn material(&self) -> &[u8] {
        &self.material
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey")
            .field("key_id", &self.key_id)
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}
