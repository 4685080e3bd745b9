pub mod algorithm_map;
pub mod decryptor;
pub mod encryptor;
pub mod key_exchange;
pub mod key_selector;
pub mod layers;
pub mod signer;
pub mod verifier;
