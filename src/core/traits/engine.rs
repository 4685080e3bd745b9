use secrecy::SecretString;

use crate::core::errors::Result;
use crate::core::models::algorithm::{CompressionAlgorithm, SymmetricAlgorithm};
use crate::core::models::key::{PrivateKey, PublicKey, SecretKey};
use crate::core::models::keyring::{PublicKeyRingBundle, SecretKeyRingBundle};
use crate::core::models::packet::{
    ArmorKind, CompressedData, EncryptedDataList, LiteralHeader, OnePassSignature, PacketObject,
    PublicKeyEncryptedData, Signature, SignatureParams,
};

/// Sequential reader over the objects of a packet stream.
pub type PacketStream = Box<dyn Iterator<Item = Result<PacketObject>>>;

/// Port for the low-level OpenPGP primitive engine.
///
/// The engine owns everything that touches the wire format or key math:
/// armor, packet encoding, session-key handling, compression and the
/// signature primitives. This crate only decides which packets go where
/// and which keys answer a request; it never depends on a concrete engine.
pub trait PgpEngine: Send + Sync {
    /// Wrap binary data in an ASCII armor block.
    fn armor(&self, kind: ArmorKind, data: &[u8]) -> Result<Vec<u8>>;

    /// Strip ASCII armor. Input that is not armored is returned unchanged.
    fn dearmor(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Parse a (binary) public key-ring bundle. Empty input is an empty bundle.
    fn parse_public_bundle(&self, data: &[u8]) -> Result<PublicKeyRingBundle>;

    /// Parse a (binary) secret key-ring bundle. Empty input is an empty bundle.
    fn parse_secret_bundle(&self, data: &[u8]) -> Result<SecretKeyRingBundle>;

    /// Encode a public key-ring bundle in the engine's native binary format.
    fn encode_public_bundle(&self, bundle: &PublicKeyRingBundle) -> Result<Vec<u8>>;

    /// Combine two encodings of the same certificate into one that carries
    /// every key, user id and signature (revocations included) of both.
    fn merge_certificates(&self, stored: &[u8], incoming: &[u8]) -> Result<Vec<u8>>;

    /// Decrypt the private material of a secret key.
    fn unlock(&self, key: &SecretKey, passphrase: &SecretString) -> Result<PrivateKey>;

    fn encode_literal(&self, header: &LiteralHeader, body: &[u8]) -> Result<Vec<u8>>;

    fn encode_compressed(&self, algorithm: CompressionAlgorithm, body: &[u8]) -> Result<Vec<u8>>;

    /// Encrypt `body` under a fresh session key addressed to every recipient.
    fn encode_encrypted(
        &self,
        cipher: SymmetricAlgorithm,
        integrity_protected: bool,
        recipients: &[PublicKey],
        body: &[u8],
    ) -> Result<Vec<u8>>;

    fn encode_one_pass_signature(&self, one_pass: &OnePassSignature) -> Result<Vec<u8>>;

    fn encode_signature(&self, signature: &Signature) -> Result<Vec<u8>>;

    /// Open an object stream over binary packet data.
    fn read_packets(&self, data: Vec<u8>) -> Result<PacketStream>;

    /// Recover the session key with `key` and return the decrypted inner packets.
    fn decrypt_data(
        &self,
        list: &EncryptedDataList,
        entry: &PublicKeyEncryptedData,
        key: &PrivateKey,
    ) -> Result<Vec<u8>>;

    /// Return the inner packets of a compressed data object.
    fn decompress(&self, data: &CompressedData) -> Result<Vec<u8>>;

    fn signature_generator(
        &self,
        key: &PrivateKey,
        params: &SignatureParams,
    ) -> Result<Box<dyn SignatureGenerator>>;

    fn signature_verifier(
        &self,
        signature: &Signature,
        key: &PublicKey,
    ) -> Result<Box<dyn SignatureVerifier>>;
}

/// Incremental signature computation.
pub trait SignatureGenerator {
    fn update(&mut self, data: &[u8]);

    fn finish(self: Box<Self>) -> Result<Signature>;
}

/// Incremental signature check.
pub trait SignatureVerifier {
    fn update(&mut self, data: &[u8]);

    /// `Ok(false)` means the signature does not match the data.
    fn verify(self: Box<Self>) -> Result<bool>;
}
