pub mod documents;
pub mod engine;
pub mod key_stores;
pub mod passphrase;
