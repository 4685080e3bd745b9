use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::models::algorithm::{DigestAlgorithm, PublicKeyAlgorithm};
use crate::core::models::key::{KeyId, PublicKey};

/// Why a signature could not be evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureError {
    NoPublicKey,
}

/// Verdict for one signature packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureStatus {
    Good,
    Bad,
    Error(SignatureError),
}

/// Outcome of verifying a single signature.
///
/// Results are created once by the verifier and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignatureResult {
    pub key_id: KeyId,
    pub public_key_algorithm: PublicKeyAlgorithm,
    pub digest_algorithm: DigestAlgorithm,
    pub created_at: DateTime<Utc>,
    /// The signer's key, when it is present in the public key-ring.
    #[serde(skip)]
    pub public_key: Option<PublicKey>,
    pub status: SignatureStatus,
}

impl SignatureResult {
    pub fn is_good(&self) -> bool {
        self.status == SignatureStatus::Good
    }
}
