use crate::core::errors::{PgpError, Result};
use crate::core::models::keyring::PublicKeyRingBundle;
use crate::core::models::packet::{PacketObject, Signature};
use crate::core::models::signature_result::{SignatureError, SignatureResult, SignatureStatus};
use crate::core::services::algorithm_map;
use crate::core::traits::engine::PgpEngine;

/// Checks signatures against the public key-ring.
pub struct Verifier<'a, E: PgpEngine + ?Sized> {
    engine: &'a E,
    public: &'a PublicKeyRingBundle,
}

impl<'a, E: PgpEngine + ?Sized> Verifier<'a, E> {
    pub fn new(engine: &'a E, public: &'a PublicKeyRingBundle) -> Self {
        Self { engine, public }
    }

    /// Verify every signature over `content`, in input order.
    ///
    /// A signature whose issuer is not in the key-ring yields an
    /// `Error(NoPublicKey)` result; the rest of the batch is still checked.
    pub fn verify_signatures(
        &self,
        signatures: &[Signature],
        content: &[u8],
    ) -> Result<Vec<SignatureResult>> {
        signatures
            .iter()
            .map(|signature| self.verify_one(signature, content))
            .collect()
    }

    /// Verify an armored detached signature (as produced by the signer)
    /// over `content`.
    pub fn verify_detached(&self, armored: &[u8], content: &[u8]) -> Result<Vec<SignatureResult>> {
        let binary = self.engine.dearmor(armored)?;
        let mut stream = self.engine.read_packets(binary)?;
        let mut decompressed = false;
        let mut signatures = Vec::new();

        while let Some(object) = stream.next().transpose()? {
            match object {
                PacketObject::Marker => {}
                PacketObject::CompressedData(data) => {
                    if decompressed {
                        return Err(PgpError::RecursiveCompression);
                    }
                    decompressed = true;
                    stream = self.engine.read_packets(self.engine.decompress(&data)?)?;
                }
                PacketObject::SignatureList(list) => signatures.extend(list),
                other => {
                    return Err(PgpError::UnexpectedPacket {
                        found: other.kind().to_string(),
                    });
                }
            }
        }

        if signatures.is_empty() {
            return Err(PgpError::UnexpectedPacket {
                found: "end of stream".into(),
            });
        }
        self.verify_signatures(&signatures, content)
    }

    fn verify_one(&self, signature: &Signature, content: &[u8]) -> Result<SignatureResult> {
        let public_key_algorithm = algorithm_map::public_key_from_tag(signature.public_key_algorithm)?;
        let digest_algorithm = algorithm_map::digest_from_tag(signature.digest_algorithm)?;

        let Some(key) = self.public.key(signature.key_id) else {
            tracing::warn!(key_id = %signature.key_id, "no public key for signature");
            return Ok(SignatureResult {
                key_id: signature.key_id,
                public_key_algorithm,
                digest_algorithm,
                created_at: signature.created_at,
                public_key: None,
                status: SignatureStatus::Error(SignatureError::NoPublicKey),
            });
        };

        let mut verifier = self.engine.signature_verifier(signature, key)?;
        verifier.update(content);
        let status = if verifier.verify()? {
            SignatureStatus::Good
        } else {
            tracing::warn!(key_id = %signature.key_id, "bad signature");
            SignatureStatus::Bad
        };

        Ok(SignatureResult {
            key_id: signature.key_id,
            public_key_algorithm,
            digest_algorithm,
            created_at: signature.created_at,
            public_key: Some(key.clone()),
            status,
        })
    }
}
