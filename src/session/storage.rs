//! Durable session record. The credential pair, role, permissions and profile
//! are encoded as ONE document and written or removed as a unit, so a crash
//! mid-write can never leave a role without its profile or tokens.

use super::types::{CredentialPair, Identity, IdentityError, PermissionSet, Profile, Role};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::{
    fmt, fs,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session storage I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("session record is corrupt: {0}")]
    Corrupt(String),
    #[error("session record is inconsistent: {0}")]
    Invalid(#[from] IdentityError),
    #[error("session update rejected: {0}")]
    Rejected(String),
}

/// Medium that keeps the session record across restarts.
pub trait SessionPersistence: Send + Sync + fmt::Debug {
    /// Reads the record. `Ok(None)` is the normal empty state.
    ///
    /// # Errors
    /// Returns an error when the medium fails or the record cannot be decoded.
    fn load(&self) -> Result<Option<Identity>, StoreError>;

    /// Replaces the record with `identity`.
    ///
    /// # Errors
    /// Returns an error when the medium fails.
    fn save(&self, identity: &Identity) -> Result<(), StoreError>;

    /// Removes the record. Removing a missing record is not an error.
    ///
    /// # Errors
    /// Returns an error when the medium fails.
    fn clear(&self) -> Result<(), StoreError>;
}

/// On-disk layout of the record.
#[derive(Serialize, Deserialize)]
struct Record {
    access_token: String,
    refresh_token: String,
    role: Role,
    #[serde(default)]
    permissions: PermissionSet,
    profile: Profile,
}

impl Record {
    fn from_identity(identity: &Identity) -> Self {
        let credential = identity.credential();
        Self {
            access_token: credential.access_token().expose_secret().to_string(),
            refresh_token: credential.refresh_token().expose_secret().to_string(),
            role: identity.role(),
            permissions: identity.permissions().clone(),
            profile: identity.profile().clone(),
        }
    }

    fn into_identity(self) -> Result<Identity, StoreError> {
        if self.access_token.is_empty() || self.refresh_token.is_empty() {
            return Err(StoreError::Corrupt("empty token".to_string()));
        }
        let credential = CredentialPair::new(
            SecretString::from(self.access_token),
            SecretString::from(self.refresh_token),
        );
        Ok(Identity::new(
            self.role,
            self.permissions,
            self.profile,
            credential,
        )?)
    }
}

fn encode(identity: &Identity) -> Result<Vec<u8>, StoreError> {
    serde_json::to_vec_pretty(&Record::from_identity(identity))
        .map_err(|err| StoreError::Corrupt(format!("failed to encode record: {err}")))
}

fn decode(bytes: &[u8]) -> Result<Identity, StoreError> {
    let record: Record = serde_json::from_slice(bytes)
        .map_err(|err| StoreError::Corrupt(format!("failed to decode record: {err}")))?;
    record.into_identity()
}

/// JSON file written through a temporary sibling and an atomic rename.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SessionPersistence for FileStorage {
    fn load(&self) -> Result<Option<Identity>, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        decode(&bytes).map(Some)
    }

    fn save(&self, identity: &Identity) -> Result<(), StoreError> {
        let payload = encode(identity)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp_path = self.temp_path();
        {
            let mut file = open_private(&temp_path)?;
            file.write_all(&payload)?;
            file.sync_all()?;
        }
        fs::rename(&temp_path, &self.path)?;

        debug!("session record written to {}", self.path.display());

        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!("session record removed from {}", self.path.display());
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Opens a file for writing that only the owner can read.
fn open_private(path: &Path) -> io::Result<fs::File> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    options.open(path)
}

/// In-process medium. Shares the encoding of [`FileStorage`] so a reload can
/// be simulated by building a second store over the same instance.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    record: Mutex<Option<Vec<u8>>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a record is currently stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.record
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    /// Stores raw bytes, bypassing encoding. Used to simulate damaged records.
    pub fn store_raw(&self, bytes: impl Into<Vec<u8>>) {
        *self.record.lock().unwrap_or_else(PoisonError::into_inner) = Some(bytes.into());
    }
}

impl SessionPersistence for MemoryStorage {
    fn load(&self) -> Result<Option<Identity>, StoreError> {
        let record = self.record.lock().unwrap_or_else(PoisonError::into_inner);
        record.as_deref().map(decode).transpose()
    }

    fn save(&self, identity: &Identity) -> Result<(), StoreError> {
        let payload = encode(identity)?;
        *self.record.lock().unwrap_or_else(PoisonError::into_inner) = Some(payload);
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.record.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
