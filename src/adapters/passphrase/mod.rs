pub mod static_passphrase;
