use std::io::{Read, Write};
use std::mem;
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use zeroize::Zeroizing;

use sequoia_openpgp as openpgp;
use openpgp::armor::{self, ReaderMode};
use openpgp::cert::prelude::*;
use openpgp::crypto::{KeyPair, Password, SessionKey};
use openpgp::packet::key::{PublicParts, UnspecifiedRole};
use openpgp::packet::one_pass_sig::OnePassSig3;
use openpgp::packet::signature::SignatureBuilder;
use openpgp::packet::{Body, Key, Literal, OnePassSig, SEIP};
use openpgp::parse::{PacketParserBuilder, PacketParserResult, Parse};
use openpgp::policy::StandardPolicy;
use openpgp::serialize::stream::{Compressor, Encryptor, Message, Recipient};
use openpgp::serialize::{Serialize, SerializeInto};
use openpgp::types::{
    CompressionAlgorithm as SqCompression, DataFormat, HashAlgorithm,
    PublicKeyAlgorithm as SqPublicKeyAlgorithm, RevocationStatus, SignatureType as SqSignatureType,
    SymmetricAlgorithm as SqSymmetric,
};
use openpgp::{Cert, KeyID, Packet};

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

const POLICY: &StandardPolicy<'static> = &StandardPolicy::new();

/// [`PgpEngine`] backed by Sequoia-PGP.
///
/// Key material in the models is the serialized certificate: the public
/// certificate for [`PublicKey::material`], the transferable secret key
/// for [`SecretKey::encrypted_material`]. An unlocked [`PrivateKey`] holds
/// one secret key packet with its material in the clear.
///
/// Capabilities, expiry and revocation are read through Sequoia's standard
/// policy at load time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequoiaEngine;

impl SequoiaEngine {
    pub fn new() -> Self {
        Self
    }
}

impl PgpEngine for SequoiaEngine {
    fn armor(&self, kind: ArmorKind, data: &[u8]) -> Result<Vec<u8>> {
        let mut writer = armor::Writer::new(Vec::new(), armor_kind(kind))?;
        writer.write_all(data)?;
        Ok(writer.finalize()?)
    }

    fn dearmor(&self, data: &[u8]) -> Result<Vec<u8>> {
        if !is_armored(data) {
            return Ok(data.to_vec());
        }
        let mut reader = armor::Reader::from_bytes(data, ReaderMode::Tolerant(None));
        let mut binary = Vec::new();
        reader.read_to_end(&mut binary)?;
        Ok(binary)
    }

    fn parse_public_bundle(&self, data: &[u8]) -> Result<PublicKeyRingBundle> {
        let rings = parse_certs(data)?
            .iter()
            .map(public_ring)
            .collect::<Result<Vec<_>>>()?;
        Ok(PublicKeyRingBundle::new(rings))
    }

    fn parse_secret_bundle(&self, data: &[u8]) -> Result<SecretKeyRingBundle> {
        let rings = parse_certs(data)?
            .iter()
            .filter(|cert| cert.is_tsk())
            .map(secret_ring)
            .collect::<Result<Vec<_>>>()?;
        Ok(SecretKeyRingBundle::new(rings))
    }

    fn encode_public_bundle(&self, bundle: &PublicKeyRingBundle) -> Result<Vec<u8>> {
        let mut encoded = Vec::new();
        for ring in &bundle.rings {
            ring_certificate(ring)?
                .serialize(&mut encoded)
                .map_err(PgpError::engine)?;
        }
        Ok(encoded)
    }

    fn merge_certificates(&self, stored: &[u8], incoming: &[u8]) -> Result<Vec<u8>> {
        let stored = Cert::from_bytes(stored).map_err(PgpError::engine)?;
        let incoming = Cert::from_bytes(incoming).map_err(PgpError::engine)?;
        stored
            .merge_public(incoming)
            .and_then(|merged| merged.to_vec())
            .map_err(PgpError::engine)
    }

    fn unlock(&self, key: &SecretKey, passphrase: &SecretString) -> Result<PrivateKey> {
        let key_id = key.key_id();
        let cert = Cert::from_bytes(&key.encrypted_material).map_err(PgpError::engine)?;
        let component = cert
            .keys()
            .secret()
            .key_handle(to_sequoia_key_id(key_id))
            .next()
            .ok_or_else(|| PgpError::Passphrase {
                key_id,
                reason: "no secret material for this key".into(),
            })?;

        let mut secret = component.key().clone();
        if secret.secret().is_encrypted() {
            let password = Password::from(passphrase.expose_secret());
            secret = secret
                .decrypt_secret(&password)
                .map_err(|_| PgpError::Passphrase {
                    key_id,
                    reason: "wrong passphrase".into(),
                })?;
        }

        let material = Packet::from(secret.role_into_primary())
            .to_vec()
            .map_err(PgpError::engine)?;
        Ok(PrivateKey::new(key_id, key.public.algorithm, material))
    }

    fn encode_literal(&self, header: &LiteralHeader, body: &[u8]) -> Result<Vec<u8>> {
        let mut literal = Literal::new(data_format(header.format));
        literal
            .set_filename(header.file_name.as_bytes())
            .map_err(PgpError::engine)?;
        literal
            .set_date(Some(SystemTime::from(header.modified)))
            .map_err(PgpError::engine)?;
        literal.set_body(body.to_vec());
        Packet::from(literal).to_vec().map_err(PgpError::engine)
    }

    fn encode_compressed(&self, algorithm: CompressionAlgorithm, body: &[u8]) -> Result<Vec<u8>> {
        let mut encoded = Vec::new();
        let message = Message::new(&mut encoded);
        let mut writer = Compressor::new(message)
            .algo(compression(algorithm))
            .build()
            .map_err(PgpError::engine)?;
        writer.write_all(body)?;
        writer.finalize().map_err(PgpError::engine)?;
        Ok(encoded)
    }

    fn encode_encrypted(
        &self,
        cipher: SymmetricAlgorithm,
        integrity_protected: bool,
        recipients: &[PublicKey],
        body: &[u8],
    ) -> Result<Vec<u8>> {
        if !integrity_protected {
            return Err(PgpError::invalid(
                "encryption without integrity protection is not supported",
            ));
        }
        let keys = recipients
            .iter()
            .map(|recipient| public_component(&recipient.material, recipient.key_id))
            .collect::<Result<Vec<_>>>()?;

        let mut encoded = Vec::new();
        let message = Message::new(&mut encoded);
        let recipients: Vec<Recipient> = keys
            .iter()
            .map(|key| Recipient::new(key.keyid(), key))
            .collect();
        let mut writer = Encryptor::for_recipients(message, recipients)
            .symmetric_algo(symmetric(cipher))
            .build()
            .map_err(PgpError::engine)?;
        writer.write_all(body)?;
        writer.finalize().map_err(PgpError::engine)?;
        Ok(encoded)
    }

    fn encode_one_pass_signature(&self, one_pass: &OnePassSignature) -> Result<Vec<u8>> {
        let mut packet = OnePassSig3::new(signature_type(one_pass.signature_type));
        packet.set_hash_algo(HashAlgorithm::from(one_pass.digest_algorithm));
        packet.set_pk_algo(SqPublicKeyAlgorithm::from(one_pass.public_key_algorithm));
        packet.set_issuer(to_sequoia_key_id(one_pass.key_id));
        packet.set_last(!one_pass.nested);
        Packet::OnePassSig(OnePassSig::from(packet))
            .to_vec()
            .map_err(PgpError::engine)
    }

    fn encode_signature(&self, signature: &Signature) -> Result<Vec<u8>> {
        // The material is already a serialized signature packet.
        match Packet::from_bytes(&signature.material).map_err(PgpError::engine)? {
            Packet::Signature(_) => Ok(signature.material.clone()),
            other => Err(PgpError::engine(format!(
                "expected a signature packet, found {}",
                other.tag()
            ))),
        }
    }

    fn read_packets(&self, data: Vec<u8>) -> Result<PacketStream> {
        let objects = group_packets(parse_packets(&data)?)?;
        Ok(Box::new(objects.into_iter().map(Ok)))
    }

    fn decrypt_data(
        &self,
        list: &EncryptedDataList,
        entry: &PublicKeyEncryptedData,
        key: &PrivateKey,
    ) -> Result<Vec<u8>> {
        if !list.integrity_protected {
            return Err(PgpError::engine(
                "refusing to decrypt data without integrity protection",
            ));
        }
        let pkesk = match Packet::from_bytes(&entry.encrypted_session_key)
            .map_err(PgpError::engine)?
        {
            Packet::PKESK(pkesk) => pkesk,
            other => {
                return Err(PgpError::engine(format!(
                    "expected a session key packet, found {}",
                    other.tag()
                )));
            }
        };

        let mut keypair = keypair(key)?;
        let (algorithm, session_key) = pkesk.decrypt(&mut keypair, None).ok_or_else(|| {
            PgpError::engine(format!("could not recover the session key with {}", key.key_id))
        })?;
        open_encrypted(&list.body, algorithm, &session_key)
    }

    fn decompress(&self, data: &CompressedData) -> Result<Vec<u8>> {
        // The parser already inflated the body while reading the packet.
        Ok(data.body.clone())
    }

    fn signature_generator(
        &self,
        key: &PrivateKey,
        params: &SignatureParams,
    ) -> Result<Box<dyn SignatureGenerator>> {
        let mut builder = SignatureBuilder::new(signature_type(params.signature_type))
            .set_hash_algo(HashAlgorithm::from(params.digest_algorithm))
            .set_signature_creation_time(SystemTime::from(params.created_at))
            .map_err(PgpError::engine)?;
        if let Some(user_id) = &params.signer_user_id {
            builder = builder
                .set_signers_user_id(user_id.as_bytes())
                .map_err(PgpError::engine)?;
        }

        Ok(Box::new(SequoiaSigner {
            keypair: keypair(key)?,
            builder,
            data: Zeroizing::new(Vec::new()),
        }))
    }

    fn signature_verifier(
        &self,
        signature: &Signature,
        key: &PublicKey,
    ) -> Result<Box<dyn SignatureVerifier>> {
        let signature = match Packet::from_bytes(&signature.material).map_err(PgpError::engine)? {
            Packet::Signature(signature) => signature,
            other => {
                return Err(PgpError::engine(format!(
                    "expected a signature packet, found {}",
                    other.tag()
                )));
            }
        };
        Ok(Box::new(SequoiaVerifier {
            signature,
            key: public_component(&key.material, key.key_id)?,
            data: Vec::new(),
        }))
    }
}

struct SequoiaSigner {
    keypair: KeyPair,
    builder: SignatureBuilder,
    data: Zeroizing<Vec<u8>>,
}

impl SignatureGenerator for SequoiaSigner {
    fn update(&mut self, data: &[u8]) {
        self.data.extend_from_slice(data);
    }

    fn finish(self: Box<Self>) -> Result<Signature> {
        let Self {
            mut keypair,
            builder,
            data,
        } = *self;
        let signature = builder
            .sign_message(&mut keypair, &data[..])
            .map_err(PgpError::engine)?;
        describe_signature(&signature)
    }
}

struct SequoiaVerifier {
    signature: openpgp::packet::Signature,
    key: Key<PublicParts, UnspecifiedRole>,
    data: Vec<u8>,
}

impl SignatureVerifier for SequoiaVerifier {
    fn update(&mut self, data: &[u8]) {
        self.data.extend_from_slice(data);
    }

    fn verify(self: Box<Self>) -> Result<bool> {
        let Self {
            mut signature,
            key,
            data,
        } = *self;
        match signature.verify_message(&key, &data[..]) {
            Ok(()) => Ok(true),
            Err(error) => {
                tracing::debug!(key_id = %key.keyid(), %error, "signature does not verify");
                Ok(false)
            }
        }
    }
}

// Certificates

fn parse_certs(data: &[u8]) -> Result<Vec<Cert>> {
    if data.is_empty() {
        return Ok(Vec::new());
    }
    CertParser::from_bytes(data)
        .map_err(PgpError::engine)?
        .map(|cert| cert.map_err(PgpError::engine))
        .collect()
}

/// What the policy says about one key of a certificate.
#[derive(Default)]
struct KeyFacts {
    encryption_capable: bool,
    signing_capable: bool,
    revoked: bool,
    validity_seconds: u64,
}

fn key_facts(valid: Option<&ValidCert<'_>>, key_id: &KeyID) -> KeyFacts {
    // A certificate the policy rejects yields keys that are good for nothing.
    let Some(valid) = valid else {
        return KeyFacts::default();
    };
    let cert_revoked = matches!(valid.revocation_status(), RevocationStatus::Revoked(_));

    match valid.keys().key_handle(key_id.clone()).next() {
        Some(component) => KeyFacts {
            encryption_capable: component.for_transport_encryption()
                || component.for_storage_encryption(),
            signing_capable: component.for_signing(),
            revoked: cert_revoked
                || matches!(component.revocation_status(), RevocationStatus::Revoked(_)),
            validity_seconds: component
                .key_expiration_time()
                .map(|expires| validity_seconds(component.key().creation_time(), expires))
                .unwrap_or(0),
        },
        None => KeyFacts {
            revoked: cert_revoked,
            ..KeyFacts::default()
        },
    }
}

/// Seconds from creation to expiry; at least 1 so an expiring key never
/// reads as "no expiry".
fn validity_seconds(created: SystemTime, expires: SystemTime) -> u64 {
    expires
        .duration_since(created)
        .map(|validity| validity.as_secs())
        .unwrap_or(0)
        .max(1)
}

fn describe_key(
    key: &Key<PublicParts, UnspecifiedRole>,
    facts: &KeyFacts,
    material: &[u8],
) -> Result<PublicKey> {
    Ok(PublicKey {
        key_id: to_key_id(&key.keyid())?,
        algorithm: u8::from(key.pk_algo()),
        encryption_capable: facts.encryption_capable,
        revoked: facts.revoked,
        created_at: DateTime::<Utc>::from(key.creation_time()),
        validity_seconds: facts.validity_seconds,
        material: material.to_vec(),
    })
}

fn user_ids(cert: &Cert) -> Vec<String> {
    cert.userids()
        .map(|user| String::from_utf8_lossy(user.userid().value()).into_owned())
        .collect()
}

fn public_ring(cert: &Cert) -> Result<PublicKeyRing> {
    let material = cert.to_vec().map_err(PgpError::engine)?;
    let valid = cert.with_policy(POLICY, None).ok();

    let keys = cert
        .keys()
        .map(|component| {
            let facts = key_facts(valid.as_ref(), &component.key().keyid());
            describe_key(component.key(), &facts, &material)
        })
        .collect::<Result<Vec<_>>>()?;

    tracing::trace!(fingerprint = %cert.fingerprint(), keys = keys.len(), "parsed certificate");
    Ok(PublicKeyRing {
        keys,
        user_ids: user_ids(cert),
    })
}

fn secret_ring(cert: &Cert) -> Result<SecretKeyRing> {
    let public_material = cert.to_vec().map_err(PgpError::engine)?;
    let secret_material = cert.as_tsk().to_vec().map_err(PgpError::engine)?;
    let valid = cert.with_policy(POLICY, None).ok();

    let keys = cert
        .keys()
        .secret()
        .map(|component| {
            let key = component.key().parts_as_public();
            let facts = key_facts(valid.as_ref(), &key.keyid());
            Ok(SecretKey {
                public: describe_key(key, &facts, &public_material)?,
                signing_capable: facts.signing_capable,
                encrypted_material: secret_material.clone(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(SecretKeyRing {
        keys,
        user_ids: user_ids(cert),
    })
}

/// One certificate for a ring, folding in every distinct encoding its keys carry.
fn ring_certificate(ring: &PublicKeyRing) -> Result<Cert> {
    let mut seen: Vec<&[u8]> = Vec::new();
    let mut merged: Option<Cert> = None;

    for key in &ring.keys {
        let material = key.material.as_slice();
        if material.is_empty() || seen.contains(&material) {
            continue;
        }
        seen.push(material);
        let cert = Cert::from_bytes(material).map_err(PgpError::engine)?;
        merged = Some(match merged {
            Some(existing) => existing.merge_public(cert).map_err(PgpError::engine)?,
            None => cert,
        });
    }

    merged.ok_or_else(|| match ring.primary_key_id() {
        Some(id) => PgpError::engine(format!("key ring {id} carries no certificate")),
        None => PgpError::engine("empty key ring"),
    })
}

fn public_component(material: &[u8], key_id: KeyId) -> Result<Key<PublicParts, UnspecifiedRole>> {
    let cert = Cert::from_bytes(material).map_err(PgpError::engine)?;
    cert.keys()
        .key_handle(to_sequoia_key_id(key_id))
        .next()
        .map(|component| component.key().clone())
        .ok_or_else(|| PgpError::engine(format!("certificate does not contain key {key_id}")))
}

fn keypair(key: &PrivateKey) -> Result<KeyPair> {
    let secret = match Packet::from_bytes(key.material()).map_err(PgpError::engine)? {
        Packet::SecretKey(secret) => secret.role_into_unspecified(),
        other => {
            return Err(PgpError::engine(format!(
                "expected a secret key packet, found {}",
                other.tag()
            )));
        }
    };
    secret.into_keypair().map_err(PgpError::engine)
}

// Packets

fn parse_packets(data: &[u8]) -> Result<Vec<Packet>> {
    let mut packets = Vec::new();
    if data.is_empty() {
        return Ok(packets);
    }
    let mut parser = PacketParserBuilder::from_bytes(data)
        .map_err(PgpError::engine)?
        .buffer_unread_content()
        .build()
        .map_err(PgpError::engine)?;
    while let PacketParserResult::Some(pp) = parser {
        let (packet, next) = pp.next().map_err(PgpError::engine)?;
        packets.push(packet);
        parser = next;
    }
    Ok(packets)
}

/// Group a flat packet sequence into the objects a reader walks.
fn group_packets(packets: Vec<Packet>) -> Result<Vec<PacketObject>> {
    let mut objects: Vec<PacketObject> = Vec::new();
    let mut session_keys: Vec<EncryptedData> = Vec::new();

    for packet in packets {
        let object = match &packet {
            Packet::PKESK(pkesk) => {
                session_keys.push(EncryptedData::PublicKey(PublicKeyEncryptedData {
                    key_id: to_key_id(pkesk.recipient())?,
                    algorithm: u8::from(pkesk.pk_algo()),
                    encrypted_session_key: packet.to_vec().map_err(PgpError::engine)?,
                }));
                continue;
            }
            Packet::SKESK(_) => {
                session_keys.push(EncryptedData::Password(
                    packet.to_vec().map_err(PgpError::engine)?,
                ));
                continue;
            }
            Packet::SEIP(_) => PacketObject::EncryptedDataList(EncryptedDataList {
                entries: mem::take(&mut session_keys),
                integrity_protected: true,
                body: packet.to_vec().map_err(PgpError::engine)?,
            }),
            Packet::Unknown(unknown) if unknown.tag() == openpgp::packet::Tag::SED => {
                PacketObject::EncryptedDataList(EncryptedDataList {
                    entries: mem::take(&mut session_keys),
                    integrity_protected: false,
                    body: packet.to_vec().map_err(PgpError::engine)?,
                })
            }
            Packet::Marker(_) => PacketObject::Marker,
            Packet::CompressedData(data) => PacketObject::CompressedData(CompressedData {
                algorithm: compression_from(data.algo())?,
                body: container_body(data.body())?,
            }),
            Packet::Literal(literal) => PacketObject::LiteralData(LiteralData {
                header: LiteralHeader {
                    format: literal_format(literal.format()),
                    file_name: String::from_utf8_lossy(literal.filename().unwrap_or_default())
                        .into_owned(),
                    modified: literal.date().map(DateTime::<Utc>::from).unwrap_or_default(),
                },
                body: literal.body().to_vec(),
            }),
            Packet::OnePassSig(one_pass) => {
                let one_pass = describe_one_pass(one_pass)?;
                if let Some(PacketObject::OnePassSignatureList(list)) = objects.last_mut() {
                    list.push(one_pass);
                    continue;
                }
                PacketObject::OnePassSignatureList(vec![one_pass])
            }
            Packet::Signature(signature) => {
                let signature = describe_signature(signature)?;
                if let Some(PacketObject::SignatureList(list)) = objects.last_mut() {
                    list.push(signature);
                    continue;
                }
                PacketObject::SignatureList(vec![signature])
            }
            other => {
                return Err(PgpError::engine(format!(
                    "unsupported packet in message: {}",
                    other.tag()
                )));
            }
        };

        if !session_keys.is_empty() {
            return Err(PgpError::engine("session key packets without encrypted data"));
        }
        objects.push(object);
    }

    if !session_keys.is_empty() {
        return Err(PgpError::engine("session key packets without encrypted data"));
    }
    Ok(objects)
}

fn container_body(body: &Body) -> Result<Vec<u8>> {
    match body {
        Body::Processed(bytes) => Ok(bytes.clone()),
        Body::Structured(packets) => {
            let mut bytes = Vec::new();
            for packet in packets {
                packet.serialize(&mut bytes).map_err(PgpError::engine)?;
            }
            Ok(bytes)
        }
        Body::Unprocessed(_) => Err(PgpError::engine("compressed data could not be inflated")),
    }
}

/// Decrypt one encrypted container and return its inner packets, re-encoded.
fn open_encrypted(
    body: &[u8],
    algorithm: SqSymmetric,
    session_key: &SessionKey,
) -> Result<Vec<u8>> {
    let parser = PacketParserBuilder::from_bytes(body)
        .map_err(PgpError::engine)?
        .buffer_unread_content()
        .build()
        .map_err(PgpError::engine)?;
    let mut pp = match parser {
        PacketParserResult::Some(pp) => pp,
        PacketParserResult::EOF(_) => return Err(PgpError::NoEncryptedData),
    };
    let needs_mdc = matches!(pp.packet, Packet::SEIP(SEIP::V1(_)));
    pp.decrypt(algorithm, session_key)
        .map_err(|e| PgpError::engine(format!("session key does not open the data: {e}")))?;

    let (_, mut parser) = pp.recurse().map_err(PgpError::engine)?;
    let mut inner = Vec::new();
    let mut mdc_checked = false;
    while let PacketParserResult::Some(pp) = parser {
        let (packet, next) = pp.next().map_err(PgpError::engine)?;
        parser = next;
        match packet {
            Packet::MDC(mdc) => {
                if !mdc.valid() {
                    return Err(PgpError::engine("modification detected in encrypted data"));
                }
                mdc_checked = true;
            }
            packet => packet.serialize(&mut inner).map_err(PgpError::engine)?,
        }
    }

    if needs_mdc && !mdc_checked {
        return Err(PgpError::engine("encrypted data lacks its modification detection code"));
    }
    Ok(inner)
}

fn describe_one_pass(one_pass: &OnePassSig) -> Result<OnePassSignature> {
    match one_pass {
        OnePassSig::V3(one_pass) => Ok(OnePassSignature {
            key_id: to_key_id(one_pass.issuer())?,
            signature_type: signature_type_from(one_pass.typ())?,
            digest_algorithm: u8::from(one_pass.hash_algo()),
            public_key_algorithm: u8::from(one_pass.pk_algo()),
            nested: !one_pass.last(),
        }),
        #[allow(unreachable_patterns)]
        _ => Err(PgpError::engine("unsupported one-pass signature version")),
    }
}

fn describe_signature(signature: &openpgp::packet::Signature) -> Result<Signature> {
    let issuer = signature
        .get_issuers()
        .into_iter()
        .next()
        .ok_or_else(|| PgpError::engine("signature names no issuer"))?;

    Ok(Signature {
        key_id: to_key_id(&KeyID::from(issuer))?,
        signature_type: signature_type_from(signature.typ())?,
        public_key_algorithm: u8::from(signature.pk_algo()),
        digest_algorithm: u8::from(signature.hash_algo()),
        created_at: signature
            .signature_creation_time()
            .map(DateTime::<Utc>::from)
            .unwrap_or_default(),
        signer_user_id: signature
            .signers_user_id()
            .map(|user_id| String::from_utf8_lossy(user_id).into_owned()),
        material: Packet::from(signature.clone())
            .to_vec()
            .map_err(PgpError::engine)?,
    })
}

// Conversions

fn to_key_id(key_id: &KeyID) -> Result<KeyId> {
    let bytes: [u8; 8] = key_id
        .as_bytes()
        .try_into()
        .map_err(|_| PgpError::engine(format!("unsupported key id {key_id}")))?;
    Ok(KeyId(u64::from_be_bytes(bytes)))
}

fn to_sequoia_key_id(key_id: KeyId) -> KeyID {
    KeyID::new(key_id.0)
}

fn is_armored(data: &[u8]) -> bool {
    let start = data
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(data.len());
    data[start..].starts_with(b"-----BEGIN PGP")
}

fn armor_kind(kind: ArmorKind) -> armor::Kind {
    match kind {
        ArmorKind::Message => armor::Kind::Message,
        ArmorKind::Signature => armor::Kind::Signature,
        ArmorKind::PublicKeyBlock => armor::Kind::PublicKey,
    }
}

fn data_format(format: LiteralFormat) -> DataFormat {
    match format {
        LiteralFormat::Binary => DataFormat::Binary,
        LiteralFormat::Text => DataFormat::Text,
        LiteralFormat::Utf8 => DataFormat::Unicode,
    }
}

fn literal_format(format: DataFormat) -> LiteralFormat {
    match format {
        DataFormat::Text => LiteralFormat::Text,
        DataFormat::Unicode => LiteralFormat::Utf8,
        _ => LiteralFormat::Binary,
    }
}

fn compression(algorithm: CompressionAlgorithm) -> SqCompression {
    match algorithm {
        CompressionAlgorithm::Uncompressed => SqCompression::Uncompressed,
        CompressionAlgorithm::Zip => SqCompression::Zip,
        CompressionAlgorithm::Zlib => SqCompression::Zlib,
        CompressionAlgorithm::Bzip2 => SqCompression::BZip2,
    }
}

fn compression_from(algorithm: SqCompression) -> Result<CompressionAlgorithm> {
    match algorithm {
        SqCompression::Uncompressed => Ok(CompressionAlgorithm::Uncompressed),
        SqCompression::Zip => Ok(CompressionAlgorithm::Zip),
        SqCompression::Zlib => Ok(CompressionAlgorithm::Zlib),
        SqCompression::BZip2 => Ok(CompressionAlgorithm::Bzip2),
        other => Err(PgpError::UnsupportedAlgorithm {
            kind: "compression",
            tag: u8::from(other),
        }),
    }
}

fn symmetric(algorithm: SymmetricAlgorithm) -> SqSymmetric {
    match algorithm {
        SymmetricAlgorithm::Aes128 => SqSymmetric::AES128,
        SymmetricAlgorithm::Aes192 => SqSymmetric::AES192,
        SymmetricAlgorithm::Aes256 => SqSymmetric::AES256,
    }
}

fn signature_type(signature_type: SignatureType) -> SqSignatureType {
    match signature_type {
        SignatureType::Binary => SqSignatureType::Binary,
        SignatureType::CanonicalText => SqSignatureType::Text,
    }
}

fn signature_type_from(signature_type: SqSignatureType) -> Result<SignatureType> {
    match signature_type {
        SqSignatureType::Binary => Ok(SignatureType::Binary),
        SqSignatureType::Text => Ok(SignatureType::CanonicalText),
        other => Err(PgpError::UnsupportedAlgorithm {
            kind: "signature type",
            tag: u8::from(other),
        }),
    }
}
