use secrecy::SecretString;

use crate::core::errors::Result;
use crate::core::models::key::SecretKey;

/// Port for obtaining the passphrase that protects a secret key.
///
/// Failures are fatal for the key being unlocked only.
pub trait PassphraseProvider {
    fn passphrase(&self, key: &SecretKey) -> Result<SecretString>;
}

impl<F> PassphraseProvider for F
where
    F: Fn(&SecretKey) -> Result<SecretString>,
{
    fn passphrase(&self, key: &SecretKey) -> Result<SecretString> {
        self(key)
    }
}
