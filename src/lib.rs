//! OpenPGP message processing for a mail security layer.
//!
//! Signs, encrypts, decrypts and verifies message payloads with local
//! key-rings, and imports or exports public keys as mail attachments.
//! The OpenPGP primitives sit behind [`PgpEngine`]; [`SequoiaEngine`]
//! implements it on Sequoia-PGP.

pub mod adapters;
pub mod config;
pub mod context;
pub mod core;

#[cfg(test)]
mod test_support;

pub use crate::adapters::documents::raw_document::{RawDocumentParser, TextDocumentParser};
pub use crate::adapters::engine::sequoia_engine::SequoiaEngine;
pub use crate::adapters::key_stores::keyring_store::FileKeyRingStore;
pub use crate::adapters::passphrase::static_passphrase::StaticPassphrase;
pub use crate::config::app_config::AppConfig;
pub use crate::context::PgpContext;
pub use crate::core::errors::{PgpError, Result};
pub use crate::core::models::attachment::Attachment;
pub use crate::core::models::key::{KeyId, PrivateKey, PublicKey, SecretKey};
pub use crate::core::models::signature_result::{SignatureResult, SignatureStatus};
pub use crate::core::services::decryptor::Decrypted;
pub use crate::core::services::key_selector::ExpiryRule;
pub use crate::core::traits::document::DocumentParser;
pub use crate::core::traits::engine::PgpEngine;
pub use crate::core::traits::key_store::KeyRingStore;
pub use crate::core::traits::passphrase::PassphraseProvider;
