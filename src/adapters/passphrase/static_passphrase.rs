use std::collections::HashMap;

use secrecy::SecretString;

use crate::core::errors::{PgpError, Result};
use crate::core::models::key::{KeyId, SecretKey};
use crate::core::traits::passphrase::PassphraseProvider;

/// Passphrases known up front, e.g. read from a secret store at startup.
///
/// A passphrase registered for a specific key id wins over the fallback.
#[derive(Default)]
pub struct StaticPassphrase {
    by_key: HashMap<KeyId, SecretString>,
    fallback: Option<SecretString>,
}

impl StaticPassphrase {
    /// Use `passphrase` for every key.
    pub fn new(passphrase: SecretString) -> Self {
        Self {
            by_key: HashMap::new(),
            fallback: Some(passphrase),
        }
    }

    pub fn with_key(mut self, key_id: KeyId, passphrase: SecretString) -> Self {
        self.by_key.insert(key_id, passphrase);
        self
    }
}

impl PassphraseProvider for StaticPassphrase {
    fn passphrase(&self, key: &SecretKey) -> Result<SecretString> {
        let key_id = key.key_id();
        self.by_key
            .get(&key_id)
            .or(self.fallback.as_ref())
            .cloned()
            .ok_or_else(|| PgpError::Passphrase {
                key_id,
                reason: "no passphrase configured".into(),
            })
    }
}

impl std::fmt::Debug for StaticPassphrase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticPassphrase")
            .field("keys", &self.by_key.keys().collect::<Vec<_>>())
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}
