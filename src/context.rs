use crate::adapters::key_stores::keyring_store::FileKeyRingStore;
use crate::config::app_config::{AppConfig, CryptoSection};
use crate::core::errors::Result;
use crate::core::models::algorithm::DigestAlgorithm;
use crate::core::models::attachment::{Attachment, ENCRYPTED_FILE_NAME, SIGNATURE_FILE_NAME};
use crate::core::models::key::{KeyId, PrivateKey, PublicKey, SecretKey};
use crate::core::models::keyring::PublicKeyRingBundle;
use crate::core::models::packet::Signature;
use crate::core::models::signature_result::SignatureResult;
use crate::core::services::decryptor::{Decrypted, Decryptor};
use crate::core::services::encryptor::Encryptor;
use crate::core::services::key_exchange::{ImportSummary, KeyExchange};
use crate::core::services::key_selector::{ExpiryRule, KeySelector};
use crate::core::services::signer::{Signer, SigningKey};
use crate::core::services::verifier::Verifier;
use crate::core::traits::document::DocumentParser;
use crate::core::traits::engine::PgpEngine;
use crate::core::traits::key_store::KeyRingStore;
use crate::core::traits::passphrase::PassphraseProvider;

/// Everything a mail client needs for OpenPGP: the engine, the local
/// key-rings and the crypto settings.
///
/// Read operations borrow the context immutably; only [`import_keys`]
/// takes `&mut self`, so an import can never overlap a lookup.
///
/// [`import_keys`]: PgpContext::import_keys
pub struct PgpContext<E: PgpEngine, S: KeyRingStore = FileKeyRingStore> {
    engine: E,
    store: S,
    crypto: CryptoSection,
}

impl<E: PgpEngine> PgpContext<E, FileKeyRingStore> {
    /// Load the key-ring files named in `config`.
    pub fn open(engine: E, config: &AppConfig) -> Result<Self> {
        let store =
            FileKeyRingStore::load(&engine, &config.keyring.public, &config.keyring.secret)?;
        Ok(Self::new(engine, store).with_crypto(config.crypto))
    }
}

impl<E: PgpEngine, S: KeyRingStore> PgpContext<E, S> {
    pub fn new(engine: E, store: S) -> Self {
        Self {
            engine,
            store,
            crypto: CryptoSection::default(),
        }
    }

    pub fn with_crypto(mut self, crypto: CryptoSection) -> Self {
        self.crypto = crypto;
        self
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Digest configured for new signatures.
    pub fn default_digest(&self) -> DigestAlgorithm {
        self.crypto.digest
    }

    pub fn expiry_rule(&self) -> ExpiryRule {
        self.crypto.expiry_rule
    }

    fn selector(&self) -> KeySelector<'_> {
        KeySelector::new(
            self.store.public_bundle(),
            self.store.secret_bundle(),
            self.crypto.expiry_rule,
        )
    }

    // Key selection

    pub fn select_encryption_key(&self, identity: &str) -> Result<PublicKey> {
        self.selector().select_encryption_key(identity)
    }

    pub fn select_encryption_keys<T: AsRef<str>>(&self, identities: &[T]) -> Result<Vec<PublicKey>> {
        self.selector().select_encryption_keys(identities)
    }

    pub fn select_signing_key(&self, identity: &str) -> Result<SecretKey> {
        self.selector().select_signing_key(identity)
    }

    pub fn select_public_key(&self, key_id: KeyId) -> Option<PublicKey> {
        self.selector().select_public_key(key_id).cloned()
    }

    pub fn select_private_key(
        &self,
        key_id: KeyId,
        passphrase: &dyn PassphraseProvider,
    ) -> Result<PrivateKey> {
        self.selector()
            .select_private_key(&self.engine, key_id, passphrase)
    }

    // Outbound

    /// Detached signature over `payload`, framed as `signature.asc`.
    pub fn sign(
        &self,
        key: &SecretKey,
        digest: DigestAlgorithm,
        payload: &[u8],
        passphrase: &dyn PassphraseProvider,
    ) -> Result<Attachment> {
        let signing_key = self.signing_key(key, digest, passphrase);
        let armored = Signer::new(&self.engine).sign(&signing_key, payload)?;
        Ok(Attachment::opaque(SIGNATURE_FILE_NAME, armored))
    }

    /// Encrypted message for `recipients`, framed as `encrypted.asc`.
    pub fn encrypt(&self, recipients: &[PublicKey], payload: &[u8]) -> Result<Attachment> {
        let armored = Encryptor::new(&self.engine).encrypt(recipients, payload)?;
        Ok(Attachment::opaque(ENCRYPTED_FILE_NAME, armored))
    }

    pub fn sign_and_encrypt(
        &self,
        key: &SecretKey,
        digest: DigestAlgorithm,
        recipients: &[PublicKey],
        payload: &[u8],
        passphrase: &dyn PassphraseProvider,
    ) -> Result<Attachment> {
        let signing_key = self.signing_key(key, digest, passphrase);
        let armored =
            Encryptor::new(&self.engine).sign_and_encrypt(&signing_key, recipients, payload)?;
        Ok(Attachment::opaque(ENCRYPTED_FILE_NAME, armored))
    }

    fn signing_key<'a>(
        &'a self,
        key: &'a SecretKey,
        digest: DigestAlgorithm,
        passphrase: &'a dyn PassphraseProvider,
    ) -> SigningKey<'a> {
        SigningKey {
            key,
            user_id: self.store.secret_bundle().user_id_for(key.key_id()),
            digest,
            passphrase,
        }
    }

    // Inbound

    pub fn decrypt<P: DocumentParser>(
        &self,
        encrypted: &[u8],
        parser: &P,
        passphrase: &dyn PassphraseProvider,
    ) -> Result<Decrypted<P::Document>> {
        Decryptor::new(&self.engine, self.selector(), passphrase).decrypt(encrypted, parser)
    }

    pub fn verify_signatures(
        &self,
        signatures: &[Signature],
        content: &[u8],
    ) -> Result<Vec<SignatureResult>> {
        Verifier::new(&self.engine, self.store.public_bundle())
            .verify_signatures(signatures, content)
    }

    /// Check an armored detached signature such as the one [`sign`] returns.
    ///
    /// [`sign`]: PgpContext::sign
    pub fn verify_detached(&self, armored: &[u8], content: &[u8]) -> Result<Vec<SignatureResult>> {
        Verifier::new(&self.engine, self.store.public_bundle()).verify_detached(armored, content)
    }

    // Key exchange

    pub fn import_keys(&mut self, armored: &[u8]) -> Result<ImportSummary> {
        KeyExchange::new(&self.engine).import_keys(&mut self.store, armored)
    }

    pub fn export_keys<T: AsRef<str>>(&self, identities: &[T]) -> Result<Attachment> {
        KeyExchange::new(&self.engine).export_keys(&self.selector(), identities)
    }

    pub fn export_public_keys(&self, keys: &[PublicKey]) -> Result<Attachment> {
        KeyExchange::new(&self.engine).export_public_keys(self.store.public_bundle(), keys)
    }

    pub fn export_bundle(&self, bundle: &PublicKeyRingBundle) -> Result<Attachment> {
        KeyExchange::new(&self.engine).export_bundle(bundle)
    }

    pub fn save_public_key_ring(&self) -> Result<()> {
        KeyExchange::new(&self.engine).save_public_key_ring(&self.store)
    }

    pub fn public_key_rings(&self) -> &PublicKeyRingBundle {
        self.store.public_bundle()
    }
}
