pub mod keyring_store;
