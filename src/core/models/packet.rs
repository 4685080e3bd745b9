use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::models::algorithm::{CompressionAlgorithm, SignatureType};
use crate::core::models::key::KeyId;

/// One object read from an OpenPGP packet stream.
///
/// The engine groups consecutive packets of the same kind the way
/// OpenPGP readers usually do: a run of session-key packets followed by
/// the encrypted body becomes one `EncryptedDataList`, consecutive
/// signatures become one `SignatureList`.
#[derive(Debug, Clone, PartialEq)]
pub enum PacketObject {
    Marker,
    EncryptedDataList(EncryptedDataList),
    CompressedData(CompressedData),
    OnePassSignatureList(Vec<OnePassSignature>),
    SignatureList(Vec<Signature>),
    LiteralData(LiteralData),
}

impl PacketObject {
    /// Short name used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Marker => "marker",
            Self::EncryptedDataList(_) => "encrypted data list",
            Self::CompressedData(_) => "compressed data",
            Self::OnePassSignatureList(_) => "one-pass signature list",
            Self::SignatureList(_) => "signature list",
            Self::LiteralData(_) => "literal data",
        }
    }
}

/// Session-key packets plus the encrypted body they unlock.
#[derive(Debug, Clone, PartialEq)]
pub struct EncryptedDataList {
    pub entries: Vec<EncryptedData>,
    pub integrity_protected: bool,
    pub body: Vec<u8>,
}

impl EncryptedDataList {
    /// The first entry addressed to a public key, if any.
    pub fn first_public_key_entry(&self) -> Option<&PublicKeyEncryptedData> {
        self.entries.iter().find_map(|entry| match entry {
            EncryptedData::PublicKey(pk) => Some(pk),
            EncryptedData::Password(_) => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EncryptedData {
    PublicKey(PublicKeyEncryptedData),
    /// Symmetric (passphrase) session key; never used by this crate.
    Password(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PublicKeyEncryptedData {
    pub key_id: KeyId,
    pub algorithm: u8,
    pub encrypted_session_key: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompressedData {
    pub algorithm: CompressionAlgorithm,
    pub body: Vec<u8>,
}

/// Literal data format marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiteralFormat {
    Binary,
    Text,
    Utf8,
}

/// Header of a literal data packet. The length is implied by the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralHeader {
    pub format: LiteralFormat,
    pub file_name: String,
    pub modified: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiteralData {
    pub header: LiteralHeader,
    pub body: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnePassSignature {
    pub key_id: KeyId,
    pub signature_type: SignatureType,
    pub digest_algorithm: u8,
    pub public_key_algorithm: u8,
    /// Set when this one-pass signature is followed by another that
    /// covers the same data.
    pub nested: bool,
}

/// A finalized signature packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub key_id: KeyId,
    pub signature_type: SignatureType,
    pub public_key_algorithm: u8,
    pub digest_algorithm: u8,
    pub created_at: DateTime<Utc>,
    /// Signer's user id carried as a hashed sub-packet.
    pub signer_user_id: Option<String>,
    pub material: Vec<u8>,
}

/// Parameters fed to the engine when a signature is generated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureParams {
    pub signature_type: SignatureType,
    pub digest_algorithm: u8,
    pub created_at: DateTime<Utc>,
    pub signer_user_id: Option<String>,
}

/// ASCII armor block types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmorKind {
    Message,
    Signature,
    PublicKeyBlock,
}

impl ArmorKind {
    /// The label between `-----BEGIN ` and `-----`.
    pub fn label(self) -> &'static str {
        match self {
            Self::Message => "PGP MESSAGE",
            Self::Signature => "PGP SIGNATURE",
            Self::PublicKeyBlock => "PGP PUBLIC KEY BLOCK",
        }
    }
}
