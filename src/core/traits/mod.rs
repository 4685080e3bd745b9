pub mod document;
pub mod engine;
pub mod key_store;
pub mod passphrase;
