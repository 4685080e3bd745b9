use std::path::PathBuf;

use crate::core::models::key::KeyId;

/// All domain errors for mailpgp.
///
/// Each variant provides enough context to diagnose the issue
/// without needing a debugger.
#[derive(Debug, thiserror::Error)]
pub enum PgpError {
    /// Caller bug: absent input, key used in the wrong role, empty recipient set.
    #[error("Invalid argument: {detail}")]
    InvalidArgument { detail: String },

    #[error(
        "No usable certificate found for '{identity}'\n\n  \
         The key is missing, revoked, expired or lacks the required capability.\n\n  \
         Solutions:\n    \
         → Import the correspondent's public key\n    \
         → Pick a different identity"
    )]
    CertificateNotFound { identity: String },

    #[error("Unexpected packet in message: expected an encrypted data list, found {found}")]
    UnexpectedPacket { found: String },

    #[error("Message contains no public-key encrypted data")]
    NoEncryptedData,

    #[error("Message nests more than one compressed data layer")]
    RecursiveCompression,

    #[error("Packet out of order: {found} after {after}")]
    OutOfOrderPacket { found: String, after: String },

    #[error("Unsupported {kind} algorithm (wire tag {tag})")]
    UnsupportedAlgorithm { kind: &'static str, tag: u8 },

    #[error("Cannot unlock secret key {key_id}: {reason}")]
    Passphrase { key_id: KeyId, reason: String },

    #[error("OpenPGP engine failure: {reason}")]
    Engine { reason: String },

    #[error("Decrypted content could not be parsed: {reason}")]
    Document { reason: String },

    #[error("Invalid configuration: {detail}")]
    InvalidConfig { detail: String },

    #[error(
        "Failed to persist key ring to {path}: {reason}\n\n  \
         The in-memory key ring was updated but the file on disk was not.\n  \
         The previous file (or its .bak copy) is still intact."
    )]
    Persistence { path: PathBuf, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PgpError {
    /// Shorthand for [`PgpError::InvalidArgument`].
    pub fn invalid(detail: impl Into<String>) -> Self {
        Self::InvalidArgument {
            detail: detail.into(),
        }
    }

    /// Shorthand for [`PgpError::Engine`].
    pub fn engine(reason: impl std::fmt::Display) -> Self {
        Self::Engine {
            reason: reason.to_string(),
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PgpError>;
