//! Deterministic in-memory engine and fixtures for unit tests.
//!
//! `MemoryEngine` speaks a toy wire format: one JSON object per packet,
//! newline separated. Key material is derived from the key id, "encryption"
//! is a hash keystream and signatures are keyed hashes. None of it is
//! secure; it only has to be reversible and tamper-evident.

#![cfg(test)]

use std::cell::RefCell;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::adapters::passphrase::static_passphrase::StaticPassphrase;
use crate::core::errors::{PgpError, Result};
use crate::core::models::algorithm::{CompressionAlgorithm, SignatureType, SymmetricAlgorithm};
use crate::core::models::key::{KeyId, PrivateKey, PublicKey, SecretKey};
use crate::core::models::keyring::{
    PublicKeyRing, PublicKeyRingBundle, SecretKeyRing, SecretKeyRingBundle,
};
use crate::core::models::packet::{
    ArmorKind, CompressedData, EncryptedData, EncryptedDataList, LiteralData, LiteralFormat,
    LiteralHeader, OnePassSignature, PacketObject, PublicKeyEncryptedData, Signature,
    SignatureParams,
};
use crate::core::traits::engine::{PacketStream, PgpEngine, SignatureGenerator, SignatureVerifier};
use crate::core::traits::key_store::KeyRingStore;

/// RSA (encrypt or sign).
const RSA: u8 = 1;

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "packet", rename_all = "kebab-case")]
enum WirePacket {
    Marker,
    Literal {
        format: LiteralFormat,
        file_name: String,
        modified: DateTime<Utc>,
        body: Vec<u8>,
    },
    Compressed {
        algorithm: u8,
        body: Vec<u8>,
    },
    Encrypted {
        integrity_protected: bool,
        recipients: Vec<WireRecipient>,
        passwords: Vec<Vec<u8>>,
        body: Vec<u8>,
    },
    OnePass {
        key_id: KeyId,
        signature_type: SignatureType,
        digest_algorithm: u8,
        public_key_algorithm: u8,
        nested: bool,
    },
    Signature {
        key_id: KeyId,
        signature_type: SignatureType,
        public_key_algorithm: u8,
        digest_algorithm: u8,
        created_at: DateTime<Utc>,
        signer_user_id: Option<String>,
        material: Vec<u8>,
    },
}

#[derive(Debug, Serialize, Deserialize)]
struct WireRecipient {
    key_id: KeyId,
    algorithm: u8,
    session_key: Vec<u8>,
}

impl WirePacket {
    fn encode(&self) -> Result<Vec<u8>> {
        let mut bytes = serde_json::to_vec(self).map_err(PgpError::engine)?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}

fn compression_tag(algorithm: CompressionAlgorithm) -> u8 {
    match algorithm {
        CompressionAlgorithm::Uncompressed => 0,
        CompressionAlgorithm::Zip => 1,
        CompressionAlgorithm::Zlib => 2,
        CompressionAlgorithm::Bzip2 => 3,
    }
}

fn compression_from_tag(tag: u8) -> Result<CompressionAlgorithm> {
    match tag {
        0 => Ok(CompressionAlgorithm::Uncompressed),
        1 => Ok(CompressionAlgorithm::Zip),
        2 => Ok(CompressionAlgorithm::Zlib),
        3 => Ok(CompressionAlgorithm::Bzip2),
        _ => Err(PgpError::UnsupportedAlgorithm {
            kind: "compression",
            tag,
        }),
    }
}

fn sha256(parts: &[&[u8]]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().to_vec()
}

fn xor(data: &[u8], pad: &[u8]) -> Vec<u8> {
    data.iter().zip(pad.iter().cycle()).map(|(a, b)| a ^ b).collect()
}

fn keystream_xor(session: &[u8], data: &[u8]) -> Vec<u8> {
    data.chunks(32)
        .enumerate()
        .flat_map(|(i, chunk)| {
            let block = sha256(&[session, &(i as u64).to_be_bytes()[..]]);
            xor(chunk, &block)
        })
        .collect()
}

/// Key material for a key id. Public and private halves are the same bytes.
pub fn material(key_id: KeyId) -> Vec<u8> {
    sha256(&[&key_id.0.to_be_bytes()[..]])
}

fn signature_material(key_material: &[u8], params: &SignatureParams, key_id: KeyId, data: &[u8]) -> Vec<u8> {
    let kind = match params.signature_type {
        SignatureType::Binary => 0u8,
        SignatureType::CanonicalText => 1u8,
    };
    sha256(&[
        key_material,
        &key_id.0.to_be_bytes()[..],
        &[kind, params.digest_algorithm][..],
        &params.created_at.timestamp().to_be_bytes()[..],
        params.signer_user_id.as_deref().unwrap_or_default().as_bytes(),
        data,
    ])
}

fn hex(data: &[u8]) -> String {
    data.iter().map(|b| format!("{b:02x}")).collect()
}

fn unhex(text: &str) -> Result<Vec<u8>> {
    let text: String = text.split_whitespace().collect();
    if text.len() % 2 != 0 {
        return Err(PgpError::engine("odd-length armor body"));
    }
    (0..text.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&text[i..i + 2], 16).map_err(PgpError::engine))
        .collect()
}

fn decode(data: &[u8]) -> Result<Vec<WirePacket>> {
    data.split(|b| *b == b'\n')
        .filter(|line| !line.is_empty())
        .map(|line| serde_json::from_slice(line).map_err(PgpError::engine))
        .collect()
}

fn to_object(packet: WirePacket) -> Result<PacketObject> {
    Ok(match packet {
        WirePacket::Marker => PacketObject::Marker,
        WirePacket::Literal {
            format,
            file_name,
            modified,
            body,
        } => PacketObject::LiteralData(LiteralData {
            header: LiteralHeader {
                format,
                file_name,
                modified,
            },
            body,
        }),
        WirePacket::Compressed { algorithm, body } => PacketObject::CompressedData(CompressedData {
            algorithm: compression_from_tag(algorithm)?,
            body,
        }),
        WirePacket::Encrypted {
            integrity_protected,
            recipients,
            passwords,
            body,
        } => {
            let entries = recipients
                .into_iter()
                .map(|r| {
                    EncryptedData::PublicKey(PublicKeyEncryptedData {
                        key_id: r.key_id,
                        algorithm: r.algorithm,
                        encrypted_session_key: r.session_key,
                    })
                })
                .chain(passwords.into_iter().map(EncryptedData::Password))
                .collect();
            PacketObject::EncryptedDataList(EncryptedDataList {
                entries,
                integrity_protected,
                body,
            })
        }
        WirePacket::OnePass {
            key_id,
            signature_type,
            digest_algorithm,
            public_key_algorithm,
            nested,
        } => PacketObject::OnePassSignatureList(vec![OnePassSignature {
            key_id,
            signature_type,
            digest_algorithm,
            public_key_algorithm,
            nested,
        }]),
        WirePacket::Signature {
            key_id,
            signature_type,
            public_key_algorithm,
            digest_algorithm,
            created_at,
            signer_user_id,
            material,
        } => PacketObject::SignatureList(vec![Signature {
            key_id,
            signature_type,
            public_key_algorithm,
            digest_algorithm,
            created_at,
            signer_user_id,
            material,
        }]),
    })
}

/// Fold consecutive one-pass and signature packets into single lists.
fn group(objects: Vec<PacketObject>) -> Vec<PacketObject> {
    let mut grouped: Vec<PacketObject> = Vec::new();
    for object in objects {
        match (grouped.last_mut(), object) {
            (Some(PacketObject::SignatureList(list)), PacketObject::SignatureList(more)) => {
                list.extend(more)
            }
            (
                Some(PacketObject::OnePassSignatureList(list)),
                PacketObject::OnePassSignatureList(more),
            ) => list.extend(more),
            (_, object) => grouped.push(object),
        }
    }
    grouped
}

/// Deterministic engine for tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryEngine;

impl PgpEngine for MemoryEngine {
    fn armor(&self, kind: ArmorKind, data: &[u8]) -> Result<Vec<u8>> {
        let label = kind.label();
        Ok(format!("-----BEGIN {label}-----\n{}\n-----END {label}-----\n", hex(data)).into_bytes())
    }

    fn dearmor(&self, data: &[u8]) -> Result<Vec<u8>> {
        let Ok(text) = std::str::from_utf8(data) else {
            return Ok(data.to_vec());
        };
        if !text.starts_with("-----BEGIN ") {
            return Ok(data.to_vec());
        }
        let body = text
            .lines()
            .skip(1)
            .take_while(|line| !line.starts_with("-----END "))
            .collect::<String>();
        unhex(&body)
    }

    fn parse_public_bundle(&self, data: &[u8]) -> Result<PublicKeyRingBundle> {
        if data.is_empty() {
            return Ok(PublicKeyRingBundle::default());
        }
        serde_json::from_slice(data).map_err(PgpError::engine)
    }

    fn parse_secret_bundle(&self, data: &[u8]) -> Result<SecretKeyRingBundle> {
        if data.is_empty() {
            return Ok(SecretKeyRingBundle::default());
        }
        serde_json::from_slice(data).map_err(PgpError::engine)
    }

    fn encode_public_bundle(&self, bundle: &PublicKeyRingBundle) -> Result<Vec<u8>> {
        serde_json::to_vec(bundle).map_err(PgpError::engine)
    }

    fn merge_certificates(&self, stored: &[u8], incoming: &[u8]) -> Result<Vec<u8>> {
        Ok([stored, b"+", incoming].concat())
    }

    fn unlock(&self, key: &SecretKey, passphrase: &SecretString) -> Result<PrivateKey> {
        let pad = sha256(&[passphrase.expose_secret().as_bytes()]);
        let recovered = xor(&key.encrypted_material, &pad);
        if recovered != key.public.material {
            return Err(PgpError::Passphrase {
                key_id: key.key_id(),
                reason: "wrong passphrase".into(),
            });
        }
        Ok(PrivateKey::new(key.key_id(), key.public.algorithm, recovered))
    }

    fn encode_literal(&self, header: &LiteralHeader, body: &[u8]) -> Result<Vec<u8>> {
        WirePacket::Literal {
            format: header.format,
            file_name: header.file_name.clone(),
            modified: header.modified,
            body: body.to_vec(),
        }
        .encode()
    }

    fn encode_compressed(&self, algorithm: CompressionAlgorithm, body: &[u8]) -> Result<Vec<u8>> {
        WirePacket::Compressed {
            algorithm: compression_tag(algorithm),
            body: body.to_vec(),
        }
        .encode()
    }

    fn encode_encrypted(
        &self,
        _cipher: SymmetricAlgorithm,
        integrity_protected: bool,
        recipients: &[PublicKey],
        body: &[u8],
    ) -> Result<Vec<u8>> {
        let session = sha256(&[b"session".as_slice(), body]);
        let mut plain = Vec::new();
        if integrity_protected {
            plain.extend(sha256(&[body]));
        }
        plain.extend_from_slice(body);

        WirePacket::Encrypted {
            integrity_protected,
            recipients: recipients
                .iter()
                .map(|key| WireRecipient {
                    key_id: key.key_id,
                    algorithm: key.algorithm,
                    session_key: xor(&session, &sha256(&[key.material.as_slice()])),
                })
                .collect(),
            passwords: Vec::new(),
            body: keystream_xor(&session, &plain),
        }
        .encode()
    }

    fn encode_one_pass_signature(&self, one_pass: &OnePassSignature) -> Result<Vec<u8>> {
        WirePacket::OnePass {
            key_id: one_pass.key_id,
            signature_type: one_pass.signature_type,
            digest_algorithm: one_pass.digest_algorithm,
            public_key_algorithm: one_pass.public_key_algorithm,
            nested: one_pass.nested,
        }
        .encode()
    }

    fn encode_signature(&self, signature: &Signature) -> Result<Vec<u8>> {
        WirePacket::Signature {
            key_id: signature.key_id,
            signature_type: signature.signature_type,
            public_key_algorithm: signature.public_key_algorithm,
            digest_algorithm: signature.digest_algorithm,
            created_at: signature.created_at,
            signer_user_id: signature.signer_user_id.clone(),
            material: signature.material.clone(),
        }
        .encode()
    }

    fn read_packets(&self, data: Vec<u8>) -> Result<PacketStream> {
        let objects = decode(&data)?
            .into_iter()
            .map(to_object)
            .collect::<Result<Vec<_>>>()?;
        Ok(Box::new(group(objects).into_iter().map(Ok)))
    }

    fn decrypt_data(
        &self,
        list: &EncryptedDataList,
        entry: &PublicKeyEncryptedData,
        key: &PrivateKey,
    ) -> Result<Vec<u8>> {
        if entry.key_id != key.key_id {
            return Err(PgpError::engine("session key is addressed to another key"));
        }
        let session = xor(&entry.encrypted_session_key, &sha256(&[key.material()]));
        let plain = keystream_xor(&session, &list.body);
        if !list.integrity_protected {
            return Ok(plain);
        }
        if plain.len() < 32 || sha256(&[&plain[32..]]) != plain[..32] {
            return Err(PgpError::engine("integrity check failed"));
        }
        Ok(plain[32..].to_vec())
    }

    fn decompress(&self, data: &CompressedData) -> Result<Vec<u8>> {
        Ok(data.body.clone())
    }

    fn signature_generator(
        &self,
        key: &PrivateKey,
        params: &SignatureParams,
    ) -> Result<Box<dyn SignatureGenerator>> {
        Ok(Box::new(MemoryGenerator {
            key_id: key.key_id,
            algorithm: key.algorithm,
            material: key.material().to_vec(),
            params: params.clone(),
            data: Vec::new(),
        }))
    }

    fn signature_verifier(
        &self,
        signature: &Signature,
        key: &PublicKey,
    ) -> Result<Box<dyn SignatureVerifier>> {
        Ok(Box::new(MemoryVerifier {
            signature: signature.clone(),
            material: key.material.clone(),
            data: Vec::new(),
        }))
    }
}

struct MemoryGenerator {
    key_id: KeyId,
    algorithm: u8,
    material: Vec<u8>,
    params: SignatureParams,
    data: Vec<u8>,
}

impl SignatureGenerator for MemoryGenerator {
    fn update(&mut self, data: &[u8]) {
        self.data.extend_from_slice(data);
    }

    fn finish(self: Box<Self>) -> Result<Signature> {
        let material = signature_material(&self.material, &self.params, self.key_id, &self.data);
        Ok(Signature {
            key_id: self.key_id,
            signature_type: self.params.signature_type,
            public_key_algorithm: self.algorithm,
            digest_algorithm: self.params.digest_algorithm,
            created_at: self.params.created_at,
            signer_user_id: self.params.signer_user_id,
            material,
        })
    }
}

struct MemoryVerifier {
    signature: Signature,
    material: Vec<u8>,
    data: Vec<u8>,
}

impl SignatureVerifier for MemoryVerifier {
    fn update(&mut self, data: &[u8]) {
        self.data.extend_from_slice(data);
    }

    fn verify(self: Box<Self>) -> Result<bool> {
        let params = SignatureParams {
            signature_type: self.signature.signature_type,
            digest_algorithm: self.signature.digest_algorithm,
            created_at: self.signature.created_at,
            signer_user_id: self.signature.signer_user_id.clone(),
        };
        let expected = signature_material(&self.material, &params, self.signature.key_id, &self.data);
        Ok(expected == self.signature.material)
    }
}

/// `MemoryEngine` whose compression always fails. Counts armor calls.
#[derive(Debug, Default)]
pub struct FailingEngine {
    inner: MemoryEngine,
    armor_calls: AtomicUsize,
}

impl FailingEngine {
    pub fn on_compress() -> Self {
        Self::default()
    }

    pub fn armor_calls(&self) -> usize {
        self.armor_calls.load(Ordering::SeqCst)
    }
}

impl PgpEngine for FailingEngine {
    fn armor(&self, kind: ArmorKind, data: &[u8]) -> Result<Vec<u8>> {
        self.armor_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.armor(kind, data)
    }

    fn dearmor(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.inner.dearmor(data)
    }

    fn parse_public_bundle(&self, data: &[u8]) -> Result<PublicKeyRingBundle> {
        self.inner.parse_public_bundle(data)
    }

    fn parse_secret_bundle(&self, data: &[u8]) -> Result<SecretKeyRingBundle> {
        self.inner.parse_secret_bundle(data)
    }

    fn encode_public_bundle(&self, bundle: &PublicKeyRingBundle) -> Result<Vec<u8>> {
        self.inner.encode_public_bundle(bundle)
    }

    fn merge_certificates(&self, stored: &[u8], incoming: &[u8]) -> Result<Vec<u8>> {
        self.inner.merge_certificates(stored, incoming)
    }

    fn unlock(&self, key: &SecretKey, passphrase: &SecretString) -> Result<PrivateKey> {
        self.inner.unlock(key, passphrase)
    }

    fn encode_literal(&self, header: &LiteralHeader, body: &[u8]) -> Result<Vec<u8>> {
        self.inner.encode_literal(header, body)
    }

    fn encode_compressed(&self, _algorithm: CompressionAlgorithm, _body: &[u8]) -> Result<Vec<u8>> {
        Err(PgpError::engine("compressor unavailable"))
    }

    fn encode_encrypted(
        &self,
        cipher: SymmetricAlgorithm,
        integrity_protected: bool,
        recipients: &[PublicKey],
        body: &[u8],
    ) -> Result<Vec<u8>> {
        self.inner
            .encode_encrypted(cipher, integrity_protected, recipients, body)
    }

    fn encode_one_pass_signature(&self, one_pass: &OnePassSignature) -> Result<Vec<u8>> {
        self.inner.encode_one_pass_signature(one_pass)
    }

    fn encode_signature(&self, signature: &Signature) -> Result<Vec<u8>> {
        self.inner.encode_signature(signature)
    }

    fn read_packets(&self, data: Vec<u8>) -> Result<PacketStream> {
        self.inner.read_packets(data)
    }

    fn decrypt_data(
        &self,
        list: &EncryptedDataList,
        entry: &PublicKeyEncryptedData,
        key: &PrivateKey,
    ) -> Result<Vec<u8>> {
        self.inner.decrypt_data(list, entry, key)
    }

    fn decompress(&self, data: &CompressedData) -> Result<Vec<u8>> {
        self.inner.decompress(data)
    }

    fn signature_generator(
        &self,
        key: &PrivateKey,
        params: &SignatureParams,
    ) -> Result<Box<dyn SignatureGenerator>> {
        self.inner.signature_generator(key, params)
    }

    fn signature_verifier(
        &self,
        signature: &Signature,
        key: &PublicKey,
    ) -> Result<Box<dyn SignatureVerifier>> {
        self.inner.signature_verifier(signature, key)
    }
}

/// In-memory key-ring store that records what it was asked to persist.
#[derive(Debug, Default)]
pub struct MemoryStore {
    public: PublicKeyRingBundle,
    secret: SecretKeyRingBundle,
    saved: RefCell<Option<Vec<u8>>>,
    fail_saves: bool,
}

impl MemoryStore {
    pub fn new(public: PublicKeyRingBundle, secret: SecretKeyRingBundle) -> Self {
        Self {
            public,
            secret,
            ..Self::default()
        }
    }

    /// A store whose every save fails.
    pub fn failing() -> Self {
        Self {
            fail_saves: true,
            ..Self::default()
        }
    }

    /// The last bytes handed to `save_public_key_ring`.
    pub fn saved(&self) -> Option<Vec<u8>> {
        self.saved.borrow().clone()
    }
}

impl KeyRingStore for MemoryStore {
    fn public_bundle(&self) -> &PublicKeyRingBundle {
        &self.public
    }

    fn secret_bundle(&self) -> &SecretKeyRingBundle {
        &self.secret
    }

    fn replace_public_bundle(&mut self, bundle: PublicKeyRingBundle) {
        self.public = bundle;
    }

    fn save_public_key_ring(&self, encoded: &[u8]) -> Result<()> {
        if self.fail_saves {
            return Err(PgpError::Persistence {
                path: "memory".into(),
                reason: "disk full".into(),
            });
        }
        *self.saved.borrow_mut() = Some(encoded.to_vec());
        Ok(())
    }
}

/// Fixed timestamp for reproducible fixtures.
pub fn epoch() -> DateTime<Utc> {
    DateTime::from_timestamp(1_600_000_000, 0).expect("valid timestamp")
}

/// A non-expiring RSA key created at [`epoch`].
pub fn public_key(key_id: KeyId, encryption_capable: bool) -> PublicKey {
    PublicKey {
        key_id,
        algorithm: RSA,
        encryption_capable,
        revoked: false,
        created_at: epoch(),
        validity_seconds: 0,
        material: material(key_id),
    }
}

/// Secret key whose material unlocks with `passphrase`.
pub fn secret_key(key_id: KeyId, signing_capable: bool, passphrase: &str) -> SecretKey {
    SecretKey {
        public: public_key(key_id, true),
        signing_capable,
        encrypted_material: xor(&material(key_id), &sha256(&[passphrase.as_bytes()])),
    }
}

pub fn private_key(key_id: KeyId) -> PrivateKey {
    PrivateKey::new(key_id, RSA, material(key_id))
}

/// Matching public and secret rings holding one key that can both
/// encrypt and sign.
pub fn key_pair(key_id: KeyId, user_id: &str, passphrase: &str) -> (PublicKeyRing, SecretKeyRing) {
    (
        PublicKeyRing {
            keys: vec![public_key(key_id, true)],
            user_ids: vec![user_id.to_string()],
        },
        SecretKeyRing {
            keys: vec![secret_key(key_id, true, passphrase)],
            user_ids: vec![user_id.to_string()],
        },
    )
}

pub fn passphrase(passphrase: &str) -> StaticPassphrase {
    StaticPassphrase::new(passphrase.into())
}

pub fn encode_secret_bundle(bundle: &SecretKeyRingBundle) -> Vec<u8> {
    serde_json::to_vec(bundle).expect("bundle serializes")
}

/// A detached signature over `content` made with the fixture key `key_id`.
pub fn sign(engine: &MemoryEngine, key_id: KeyId, content: &[u8]) -> Signature {
    let params = SignatureParams {
        signature_type: SignatureType::CanonicalText,
        digest_algorithm: 8,
        created_at: epoch(),
        signer_user_id: None,
    };
    let mut generator = engine
        .signature_generator(&private_key(key_id), &params)
        .expect("generator");
    generator.update(content);
    generator.finish().expect("signature")
}

/// A bare binary literal data packet.
pub fn literal(engine: &MemoryEngine, body: &[u8]) -> Vec<u8> {
    let header = LiteralHeader {
        format: LiteralFormat::Binary,
        file_name: String::new(),
        modified: epoch(),
    };
    engine.encode_literal(&header, body).expect("literal packet")
}

pub fn marker() -> Vec<u8> {
    WirePacket::Marker.encode().expect("marker packet")
}

/// An encrypted data list whose only session key is password based.
pub fn password_only_message(engine: &MemoryEngine, body: &[u8]) -> Vec<u8> {
    WirePacket::Encrypted {
        integrity_protected: true,
        recipients: Vec::new(),
        passwords: vec![b"s2k".to_vec()],
        body: literal(engine, body),
    }
    .encode()
    .expect("encrypted packet")
}
