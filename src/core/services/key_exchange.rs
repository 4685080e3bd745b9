use crate::core::errors::Result;
use crate::core::models::attachment::Attachment;
use crate::core::models::key::PublicKey;
use crate::core::models::keyring::{PublicKeyRing, PublicKeyRingBundle};
use crate::core::models::packet::ArmorKind;
use crate::core::services::key_selector::KeySelector;
use crate::core::traits::engine::PgpEngine;
use crate::core::traits::key_store::KeyRingStore;

/// What an import changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub added: usize,
    pub merged: usize,
}

impl ImportSummary {
    pub fn is_empty(&self) -> bool {
        self.added == 0 && self.merged == 0
    }
}

/// Merge `incoming` into `existing`.
///
/// A ring whose primary key id is already present is folded into the
/// stored ring at the same position (see [`merge_ring`]); other rings are
/// appended in their order.
pub fn merge_bundles<E: PgpEngine + ?Sized>(
    engine: &E,
    existing: &PublicKeyRingBundle,
    incoming: PublicKeyRingBundle,
) -> Result<(PublicKeyRingBundle, ImportSummary)> {
    let mut rings = existing.rings.clone();
    let mut summary = ImportSummary::default();

    for ring in incoming.rings {
        let position = ring
            .primary_key_id()
            .and_then(|id| rings.iter().position(|r| r.primary_key_id() == Some(id)));
        match position {
            Some(index) => {
                merge_ring(engine, &mut rings[index], ring)?;
                summary.merged += 1;
            }
            None => {
                rings.push(ring);
                summary.added += 1;
            }
        }
    }

    Ok((PublicKeyRingBundle::new(rings), summary))
}

/// Fold another copy of the same certificate into `stored`.
///
/// Keys and user ids are unioned, stored order first. A revocation seen
/// on either copy sticks, so a stale copy can never resurrect a revoked
/// key. For a key present on both sides the incoming capability and
/// expiry win, and the engine combines both encodings so the persisted
/// certificate keeps every signature either copy carried.
pub fn merge_ring<E: PgpEngine + ?Sized>(
    engine: &E,
    stored: &mut PublicKeyRing,
    incoming: PublicKeyRing,
) -> Result<()> {
    for key in incoming.keys {
        match stored.keys.iter_mut().find(|k| k.key_id == key.key_id) {
            Some(existing) => {
                let material = if existing.material == key.material {
                    key.material
                } else {
                    engine.merge_certificates(&existing.material, &key.material)?
                };
                *existing = PublicKey {
                    revoked: existing.revoked || key.revoked,
                    material,
                    ..key
                };
            }
            None => stored.keys.push(key),
        }
    }
    for user_id in incoming.user_ids {
        if !stored.user_ids.contains(&user_id) {
            stored.user_ids.push(user_id);
        }
    }
    Ok(())
}

/// Imports public keys into the store and exports them as armored bundles.
pub struct KeyExchange<'e, E: PgpEngine + ?Sized> {
    engine: &'e E,
}

impl<'e, E: PgpEngine + ?Sized> KeyExchange<'e, E> {
    pub fn new(engine: &'e E) -> Self {
        Self { engine }
    }

    /// Merge an armored public key bundle into the store and persist it.
    ///
    /// A bundle without rings changes nothing and writes nothing. When the
    /// merge succeeds but persisting fails, the error is returned and the
    /// store keeps the merged bundle in memory.
    pub fn import_keys<S: KeyRingStore + ?Sized>(
        &self,
        store: &mut S,
        armored: &[u8],
    ) -> Result<ImportSummary> {
        let binary = self.engine.dearmor(armored)?;
        let incoming = self.engine.parse_public_bundle(&binary)?;
        if incoming.is_empty() {
            tracing::info!("import contained no key rings, nothing to do");
            return Ok(ImportSummary::default());
        }

        let (merged, summary) = merge_bundles(self.engine, store.public_bundle(), incoming)?;
        store.replace_public_bundle(merged);
        self.save_public_key_ring(store)?;

        tracing::info!(
            added = summary.added,
            merged = summary.merged,
            "imported public keys"
        );
        Ok(summary)
    }

    /// Encode the store's public bundle and hand it to the store for an atomic write.
    pub fn save_public_key_ring<S: KeyRingStore + ?Sized>(&self, store: &S) -> Result<()> {
        let encoded = self.engine.encode_public_bundle(store.public_bundle())?;
        store.save_public_key_ring(&encoded)
    }

    /// Armor a whole bundle as an `application/pgp-keys` attachment.
    pub fn export_bundle(&self, bundle: &PublicKeyRingBundle) -> Result<Attachment> {
        let encoded = self.engine.encode_public_bundle(bundle)?;
        let armored = self.engine.armor(ArmorKind::PublicKeyBlock, &encoded)?;
        Ok(Attachment::pgp_keys(armored))
    }

    /// Export the rings that hold `keys`.
    ///
    /// Each ring is exported once even if several of its keys are listed.
    /// A key with no ring in `public` is exported on its own.
    pub fn export_public_keys(
        &self,
        public: &PublicKeyRingBundle,
        keys: &[PublicKey],
    ) -> Result<Attachment> {
        let mut rings: Vec<PublicKeyRing> = Vec::new();
        for key in keys {
            let ring = public
                .rings
                .iter()
                .find(|ring| ring.key(key.key_id).is_some())
                .cloned()
                .unwrap_or_else(|| PublicKeyRing {
                    keys: vec![key.clone()],
                    user_ids: Vec::new(),
                });
            if !rings.iter().any(|r| r.primary_key_id() == ring.primary_key_id()) {
                rings.push(ring);
            }
        }
        self.export_bundle(&PublicKeyRingBundle::new(rings))
    }

    /// Resolve identities to encryption keys and export their rings.
    pub fn export_keys<S: AsRef<str>>(
        &self,
        selector: &KeySelector<'_>,
        identities: &[S],
    ) -> Result<Attachment> {
        let keys = selector.select_encryption_keys(identities)?;
        self.export_public_keys(selector.public_bundle(), &keys)
    }
}
