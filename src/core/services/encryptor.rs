use std::io::Write;

use chrono::{SubsecRound, Utc};

use crate::core::errors::{PgpError, Result};
use crate::core::models::algorithm::{CompressionAlgorithm, SignatureType, SymmetricAlgorithm};
use crate::core::models::key::PublicKey;
use crate::core::models::packet::{ArmorKind, LiteralFormat, LiteralHeader, OnePassSignature};
use crate::core::services::key_selector::unlock_secret_key;
use crate::core::services::layers::{Layer, LayeredWriter};
use crate::core::services::signer::SigningKey;
use crate::core::traits::engine::PgpEngine;

/// Settings for the encrypted, compressed and literal layers.
#[derive(Debug, Clone)]
pub struct EncryptOptions {
    pub cipher: SymmetricAlgorithm,
    pub integrity_protected: bool,
    pub compression: CompressionAlgorithm,
    pub format: LiteralFormat,
    pub file_name: String,
}

impl Default for EncryptOptions {
    fn default() -> Self {
        Self {
            cipher: SymmetricAlgorithm::Aes256,
            integrity_protected: true,
            compression: CompressionAlgorithm::Zip,
            format: LiteralFormat::Binary,
            file_name: String::new(),
        }
    }
}

/// Builds encrypted (and optionally signed) OpenPGP messages.
pub struct Encryptor<'e, E: PgpEngine + ?Sized> {
    engine: &'e E,
    options: EncryptOptions,
}

impl<'e, E: PgpEngine + ?Sized> Encryptor<'e, E> {
    pub fn new(engine: &'e E) -> Self {
        Self::with_options(engine, EncryptOptions::default())
    }

    pub fn with_options(engine: &'e E, options: EncryptOptions) -> Self {
        Self { engine, options }
    }

    /// Encrypt `payload` for every recipient.
    ///
    /// Output layout: armor ⊃ encrypted ⊃ compressed ⊃ literal data.
    pub fn encrypt(&self, recipients: &[PublicKey], payload: &[u8]) -> Result<Vec<u8>> {
        validate_recipients(recipients)?;

        let mut writer = self.open_envelope(recipients);
        writer.open(Layer::Literal(self.literal_header()));
        writer.write_all(payload)?;
        let armored = writer.finish()?;

        tracing::debug!(
            recipients = recipients.len(),
            bytes = payload.len(),
            "encrypted message"
        );
        Ok(armored)
    }

    /// Sign and encrypt `payload` in one pass.
    ///
    /// Inside the compressed layer the packets are: one-pass signature,
    /// literal data, signature. A streaming reader can then hash the
    /// literal data as it goes and check the trailing signature at the end.
    pub fn sign_and_encrypt(
        &self,
        signer: &SigningKey<'_>,
        recipients: &[PublicKey],
        payload: &[u8],
    ) -> Result<Vec<u8>> {
        let digest_tag = signer.validate()?;
        validate_recipients(recipients)?;

        let private = unlock_secret_key(self.engine, signer.key, signer.passphrase)?;
        let signature_type = match self.options.format {
            LiteralFormat::Binary => SignatureType::Binary,
            LiteralFormat::Text | LiteralFormat::Utf8 => SignatureType::CanonicalText,
        };
        let params = signer.params(digest_tag, signature_type);
        let mut generator = self.engine.signature_generator(&private, &params)?;

        let one_pass = OnePassSignature {
            key_id: signer.key.key_id(),
            signature_type,
            digest_algorithm: digest_tag,
            public_key_algorithm: signer.key.public.algorithm,
            nested: false,
        };
        let one_pass_packet = self.engine.encode_one_pass_signature(&one_pass)?;

        let mut writer = self.open_envelope(recipients);
        writer.emit(&one_pass_packet);

        writer.open(Layer::Literal(self.literal_header()));
        writer.write_all(payload)?;
        generator.update(payload);
        writer.close()?;

        let signature = generator.finish()?;
        writer.emit(&self.engine.encode_signature(&signature)?);
        let armored = writer.finish()?;

        tracing::debug!(
            key_id = %signer.key.key_id(),
            recipients = recipients.len(),
            bytes = payload.len(),
            "signed and encrypted message"
        );
        Ok(armored)
    }

    /// Open armor ⊃ encrypted ⊃ compressed and leave the compressed layer innermost.
    fn open_envelope(&self, recipients: &[PublicKey]) -> LayeredWriter<'e, E> {
        let mut writer = LayeredWriter::new(self.engine);
        writer
            .open(Layer::Armor(ArmorKind::Message))
            .open(Layer::Encrypted {
                cipher: self.options.cipher,
                integrity_protected: self.options.integrity_protected,
                recipients: recipients.to_vec(),
            })
            .open(Layer::Compressed(self.options.compression));
        writer
    }

    fn literal_header(&self) -> LiteralHeader {
        LiteralHeader {
            format: self.options.format,
            file_name: self.options.file_name.clone(),
            modified: Utc::now().trunc_subsecs(0),
        }
    }
}

/// At least one recipient, and every recipient must be able to encrypt.
pub fn validate_recipients(recipients: &[PublicKey]) -> Result<()> {
    if recipients.is_empty() {
        return Err(PgpError::invalid("no recipients"));
    }
    if let Some(key) = recipients.iter().find(|k| !k.encryption_capable) {
        return Err(PgpError::invalid(format!(
            "key {} is not an encryption key",
            key.key_id
        )));
    }
    Ok(())
}
