use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Deserialize;

use crate::core::errors::{PgpError, Result};
use crate::core::models::key::{KeyId, PrivateKey, PublicKey, SecretKey};
use crate::core::models::keyring::{PublicKeyRingBundle, SecretKeyRingBundle};
use crate::core::traits::engine::PgpEngine;
use crate::core::traits::passphrase::PassphraseProvider;

/// Mailbox part of a user id such as `Alice <alice@example.com>`.
static MAILBOX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<\s*([^<>\s]+)\s*>\s*$").expect("valid mailbox regex"));

/// How a key's expiry time is compared against the current time.
///
/// `RejectExpired` skips keys whose validity period has ended.
/// `RejectUnexpired` keeps the legacy comparison (`expires >= now` is
/// skipped) for deployments that were built against it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExpiryRule {
    #[default]
    RejectExpired,
    RejectUnexpired,
}

/// Whether `key` passes the expiry rule at `now`. Keys without expiry always pass.
pub fn is_within_validity(key: &PublicKey, now: DateTime<Utc>, rule: ExpiryRule) -> bool {
    match key.expires_at() {
        None => true,
        Some(expires) => match rule {
            ExpiryRule::RejectExpired => now < expires,
            ExpiryRule::RejectUnexpired => expires < now,
        },
    }
}

pub fn is_usable_for_encryption(key: &PublicKey, now: DateTime<Utc>, rule: ExpiryRule) -> bool {
    key.encryption_capable && !key.revoked && is_within_validity(key, now, rule)
}

pub fn is_usable_for_signing(key: &SecretKey, now: DateTime<Utc>, rule: ExpiryRule) -> bool {
    key.signing_capable && !key.public.revoked && is_within_validity(&key.public, now, rule)
}

/// True if any user id is `identity`, or wraps it as `<identity>`.
///
/// Comparison is case-insensitive, as mail addresses are in practice.
pub fn matches_identity(user_ids: &[String], identity: &str) -> bool {
    let wanted = identity.trim();
    user_ids.iter().any(|uid| {
        if uid.trim().eq_ignore_ascii_case(wanted) {
            return true;
        }
        MAILBOX
            .captures(uid)
            .and_then(|c| c.get(1))
            .is_some_and(|m| m.as_str().eq_ignore_ascii_case(wanted))
    })
}

/// Decrypt the private half of `key` with the passphrase the provider returns.
pub fn unlock_secret_key<E: PgpEngine + ?Sized>(
    engine: &E,
    key: &SecretKey,
    provider: &dyn PassphraseProvider,
) -> Result<PrivateKey> {
    let key_id = key.key_id();
    let scoped = |e: PgpError| match e {
        PgpError::Passphrase { .. } => e,
        other => PgpError::Passphrase {
            key_id,
            reason: other.to_string(),
        },
    };

    let passphrase = provider.passphrase(key).map_err(scoped)?;
    engine.unlock(key, &passphrase).map_err(scoped)
}

/// Chooses the key that answers a cryptographic request.
///
/// Searches rings in bundle order and returns the first key that passes
/// the usability predicate for the requested role.
pub struct KeySelector<'a> {
    public: &'a PublicKeyRingBundle,
    secret: &'a SecretKeyRingBundle,
    rule: ExpiryRule,
    now: DateTime<Utc>,
}

impl<'a> KeySelector<'a> {
    pub fn new(
        public: &'a PublicKeyRingBundle,
        secret: &'a SecretKeyRingBundle,
        rule: ExpiryRule,
    ) -> Self {
        Self {
            public,
            secret,
            rule,
            now: Utc::now(),
        }
    }

    /// Evaluate validity at a fixed instant instead of the current time.
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    pub fn select_encryption_key(&self, identity: &str) -> Result<PublicKey> {
        require_identity(identity)?;

        let found = self
            .public
            .rings
            .iter()
            .filter(|ring| matches_identity(&ring.user_ids, identity))
            .flat_map(|ring| ring.keys.iter())
            .find(|key| is_usable_for_encryption(key, self.now, self.rule));

        match found {
            Some(key) => {
                tracing::debug!(identity, key_id = %key.key_id, "selected encryption key");
                Ok(key.clone())
            }
            None => Err(PgpError::CertificateNotFound {
                identity: identity.to_string(),
            }),
        }
    }

    /// Resolve every identity; the first unresolved one fails the whole call.
    pub fn select_encryption_keys<S: AsRef<str>>(&self, identities: &[S]) -> Result<Vec<PublicKey>> {
        identities
            .iter()
            .map(|identity| self.select_encryption_key(identity.as_ref()))
            .collect()
    }

    pub fn select_signing_key(&self, identity: &str) -> Result<SecretKey> {
        require_identity(identity)?;

        let found = self
            .secret
            .rings
            .iter()
            .filter(|ring| matches_identity(&ring.user_ids, identity))
            .flat_map(|ring| ring.keys.iter())
            .find(|key| is_usable_for_signing(key, self.now, self.rule));

        match found {
            Some(key) => {
                tracing::debug!(identity, key_id = %key.key_id(), "selected signing key");
                Ok(key.clone())
            }
            None => Err(PgpError::CertificateNotFound {
                identity: identity.to_string(),
            }),
        }
    }

    pub fn public_bundle(&self) -> &'a PublicKeyRingBundle {
        self.public
    }

    /// Exact key id lookup in the public bundle, without a validity filter.
    pub fn select_public_key(&self, key_id: KeyId) -> Option<&'a PublicKey> {
        self.public.key(key_id)
    }

    /// Locate the secret key with `key_id` and unlock it.
    pub fn select_private_key<E: PgpEngine + ?Sized>(
        &self,
        engine: &E,
        key_id: KeyId,
        provider: &dyn PassphraseProvider,
    ) -> Result<PrivateKey> {
        let secret = self
            .secret
            .key(key_id)
            .ok_or_else(|| PgpError::CertificateNotFound {
                identity: key_id.to_string(),
            })?;

        tracing::debug!(%key_id, "unlocking private key");
        unlock_secret_key(engine, secret, provider)
    }
}

fn require_identity(identity: &str) -> Result<()> {
    if identity.trim().is_empty() {
        return Err(PgpError::invalid("identity must not be empty"));
    }
    Ok(())
}
