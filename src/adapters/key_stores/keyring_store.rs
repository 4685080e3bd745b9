use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::core::errors::{PgpError, Result};
use crate::core::models::keyring::{PublicKeyRingBundle, SecretKeyRingBundle};
use crate::core::traits::engine::PgpEngine;
use crate::core::traits::key_store::KeyRingStore;

/// Key-ring store backed by two files: the public and the secret bundle.
///
/// Both files hold the engine's encoding of a bundle, armored or not.
/// A file that does not exist yet loads as an empty bundle. Only the
/// public file is ever written.
///
/// Writes go to a `.tmp` sibling first. Once that file is synced, the
/// current file is copied to `<file>.bak` and the new one is renamed over
/// it in a single step, so the path always holds a complete bundle.
#[derive(Debug, Clone)]
pub struct FileKeyRingStore {
    public_path: PathBuf,
    secret_path: PathBuf,
    public: PublicKeyRingBundle,
    secret: SecretKeyRingBundle,
}

impl FileKeyRingStore {
    /// Read both bundles from disk.
    pub fn load<E: PgpEngine + ?Sized>(
        engine: &E,
        public_path: impl Into<PathBuf>,
        secret_path: impl Into<PathBuf>,
    ) -> Result<Self> {
        let public_path = public_path.into();
        let secret_path = secret_path.into();

        let public = engine.parse_public_bundle(&read_bundle(engine, &public_path)?)?;
        let secret = engine.parse_secret_bundle(&read_bundle(engine, &secret_path)?)?;

        tracing::debug!(
            public = %public_path.display(),
            public_rings = public.len(),
            secret = %secret_path.display(),
            secret_rings = secret.len(),
            "loaded key rings"
        );

        Ok(Self {
            public_path,
            secret_path,
            public,
            secret,
        })
    }

    /// Build a store around bundles that are already in memory.
    pub fn from_bundles(
        public_path: impl Into<PathBuf>,
        secret_path: impl Into<PathBuf>,
        public: PublicKeyRingBundle,
        secret: SecretKeyRingBundle,
    ) -> Self {
        Self {
            public_path: public_path.into(),
            secret_path: secret_path.into(),
            public,
            secret,
        }
    }

    pub fn public_path(&self) -> &Path {
        &self.public_path
    }

    pub fn secret_path(&self) -> &Path {
        &self.secret_path
    }
}

impl KeyRingStore for FileKeyRingStore {
    fn public_bundle(&self) -> &PublicKeyRingBundle {
        &self.public
    }

    fn secret_bundle(&self) -> &SecretKeyRingBundle {
        &self.secret
    }

    fn replace_public_bundle(&mut self, bundle: PublicKeyRingBundle) {
        self.public = bundle;
    }

    fn save_public_key_ring(&self, encoded: &[u8]) -> Result<()> {
        write_atomically(&self.public_path, encoded).map_err(|e| PgpError::Persistence {
            path: self.public_path.clone(),
            reason: e.to_string(),
        })?;

        tracing::info!(
            path = %self.public_path.display(),
            rings = self.public.len(),
            bytes = encoded.len(),
            "saved public key ring"
        );
        Ok(())
    }
}

fn read_bundle<E: PgpEngine + ?Sized>(engine: &E, path: &Path) -> Result<Vec<u8>> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "key ring file absent, starting empty");
        return Ok(Vec::new());
    }
    let raw = fs::read(path)?;
    engine.dearmor(&raw)
}

/// `<file><suffix>` next to `path`.
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(suffix);
    path.with_file_name(name)
}

fn write_atomically(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let prefix = format!("{}.", path.file_name().unwrap_or_default().to_string_lossy());
    // Dropping the temp file on any early return removes it.
    let mut tmp = tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(".tmp")
        .tempfile_in(parent)?;
    tmp.write_all(contents)?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;

    keep_backup(path)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Copy the live file to `<file>.bak`, leaving the live file where it is.
fn keep_backup(path: &Path) -> std::io::Result<()> {
    if path.exists() {
        let backup = sibling(path, ".bak");
        fs::copy(path, &backup)?;
        tracing::debug!(backup = %backup.display(), "kept previous key ring");
    }
    Ok(())
}
