use chrono::{SubsecRound, Utc};

use crate::core::errors::{PgpError, Result};
use crate::core::models::algorithm::{CompressionAlgorithm, DigestAlgorithm, SignatureType};
use crate::core::models::key::SecretKey;
use crate::core::models::packet::{ArmorKind, SignatureParams};
use crate::core::services::algorithm_map;
use crate::core::services::key_selector::unlock_secret_key;
use crate::core::services::layers::{Layer, LayeredWriter};
use crate::core::traits::engine::PgpEngine;
use crate::core::traits::passphrase::PassphraseProvider;

/// A secret key prepared for signing, together with how to unlock it.
pub struct SigningKey<'a> {
    pub key: &'a SecretKey,
    /// Carried as a hashed sub-packet so readers can name the signer.
    pub user_id: Option<&'a str>,
    pub digest: DigestAlgorithm,
    pub passphrase: &'a dyn PassphraseProvider,
}

impl SigningKey<'_> {
    /// Check the key role and algorithms before any cryptographic work.
    pub(crate) fn validate(&self) -> Result<u8> {
        if !self.key.signing_capable {
            return Err(PgpError::invalid(format!(
                "key {} is not a signing key",
                self.key.key_id()
            )));
        }
        algorithm_map::public_key_from_tag(self.key.public.algorithm)?;
        Ok(algorithm_map::digest_to_tag(self.digest))
    }

    pub(crate) fn params(&self, digest_tag: u8, signature_type: SignatureType) -> SignatureParams {
        SignatureParams {
            signature_type,
            digest_algorithm: digest_tag,
            created_at: Utc::now().trunc_subsecs(0),
            signer_user_id: self.user_id.map(str::to_string),
        }
    }
}

/// Produces armored detached signatures.
pub struct Signer<'e, E: PgpEngine + ?Sized> {
    engine: &'e E,
    compression: CompressionAlgorithm,
}

impl<'e, E: PgpEngine + ?Sized> Signer<'e, E> {
    pub fn new(engine: &'e E) -> Self {
        Self {
            engine,
            compression: CompressionAlgorithm::Zip,
        }
    }

    pub fn with_compression(mut self, compression: CompressionAlgorithm) -> Self {
        self.compression = compression;
        self
    }

    /// Sign `payload` in canonical-text mode.
    ///
    /// Output layout: armor ⊃ compressed data ⊃ signature packet.
    pub fn sign(&self, signer: &SigningKey<'_>, payload: &[u8]) -> Result<Vec<u8>> {
        let digest_tag = signer.validate()?;
        let private = unlock_secret_key(self.engine, signer.key, signer.passphrase)?;

        let params = signer.params(digest_tag, SignatureType::CanonicalText);
        let mut generator = self.engine.signature_generator(&private, &params)?;
        generator.update(payload);
        let signature = generator.finish()?;
        let packet = self.engine.encode_signature(&signature)?;

        let mut writer = LayeredWriter::new(self.engine);
        writer
            .open(Layer::Armor(ArmorKind::Signature))
            .open(Layer::Compressed(self.compression));
        writer.emit(&packet);
        let armored = writer.finish()?;

        tracing::debug!(
            key_id = %signer.key.key_id(),
            digest = %signer.digest,
            bytes = payload.len(),
            "created detached signature"
        );
        Ok(armored)
    }
}
