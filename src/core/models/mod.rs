pub mod algorithm;
pub mod attachment;
pub mod key;
pub mod keyring;
pub mod packet;
pub mod signature_result;
