use crate::core::errors::Result;
use crate::core::models::keyring::{PublicKeyRingBundle, SecretKeyRingBundle};

/// Port for the local key-ring storage (public and secret bundles).
pub trait KeyRingStore {
    fn public_bundle(&self) -> &PublicKeyRingBundle;

    fn secret_bundle(&self) -> &SecretKeyRingBundle;

    /// Swap in a new public bundle. Nothing is written to disk.
    fn replace_public_bundle(&mut self, bundle: PublicKeyRingBundle);

    /// Persist the engine encoding of the current public bundle.
    ///
    /// Implementations must replace the backing file atomically.
    fn save_public_key_ring(&self, encoded: &[u8]) -> Result<()>;
}
