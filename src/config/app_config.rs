use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::core::errors::{PgpError, Result};
use crate::core::models::algorithm::DigestAlgorithm;
use crate::core::services::key_selector::ExpiryRule;

/// Directory under the platform data dir that holds the key rings.
pub const DATA_DIR_NAME: &str = "mailpgp";

pub const PUBLIC_RING_FILE: &str = "pubring.pgp";
pub const SECRET_RING_FILE: &str = "secring.pgp";

/// Top-level configuration, usually read from `mailpgp.toml`.
///
/// Every section and field is optional; missing values take the defaults
/// below.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub keyring: KeyringSection,
    pub crypto: CryptoSection,
}

impl AppConfig {
    /// Load the configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PgpError::InvalidConfig {
                detail: format!("{} not found", path.display()),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let config = Self::parse(&content).map_err(|e| PgpError::InvalidConfig {
            detail: format!("Failed to parse {}: {e}", path.display()),
        })?;

        tracing::debug!(
            path = %path.display(),
            public = %config.keyring.public.display(),
            secret = %config.keyring.secret.display(),
            "loaded configuration"
        );
        Ok(config)
    }

    /// Parse configuration text.
    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// The `[keyring]` section: where the two bundles live.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KeyringSection {
    pub public: PathBuf,
    pub secret: PathBuf,
}

impl Default for KeyringSection {
    fn default() -> Self {
        let dir = default_data_dir();
        Self {
            public: dir.join(PUBLIC_RING_FILE),
            secret: dir.join(SECRET_RING_FILE),
        }
    }
}

/// The `[crypto]` section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CryptoSection {
    /// Digest used for new signatures.
    pub digest: DigestAlgorithm,
    pub expiry_rule: ExpiryRule,
}

/// `<data dir>/mailpgp`, or `./mailpgp` on platforms without a data dir.
fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DATA_DIR_NAME)
}
