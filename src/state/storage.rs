//! Durable session storage.
//!
//! DESIGN
//! ======
//! The session is mirrored into a small key-value document (`userId`,
//! `username`, `isAdmin`, `adminToken`). The store is an explicit object
//! injected into the session manager; nothing reaches for it ambiently.
//! `FileStore` writes a JSON file via write-then-rename so a crash never
//! leaves a half-written session behind.

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use super::session::Session;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("session store I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session store is not valid JSON: {0}")]
    Format(#[from] serde_json::Error),
}

/// Load/save boundary for the persisted session.
pub trait SessionStore: Send + Sync {
    /// Read the stored session. `Ok(None)` when nothing was saved.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] when the backing medium cannot be read or
    /// holds something other than a session document.
    fn load(&self) -> Result<Option<Session>, StorageError>;

    fn save(&self, session: &Session) -> Result<(), StorageError>;

    /// Remove every stored key.
    fn clear(&self) -> Result<(), StorageError>;
}

// =============================================================================
// FILE STORE
// =============================================================================

pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io { path: self.path.clone(), source }
    }
}

impl SessionStore for FileStore {
    fn load(&self) -> Result<Option<Session>, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };
        if raw.trim().is_empty() {
            return Ok(None);
        }
        let session: Session = serde_json::from_str(&raw)?;
        Ok(Some(session))
    }

    fn save(&self, session: &Session) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
            }
        }
        let body = serde_json::to_string_pretty(session)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body).map_err(|e| self.io_error(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))
    }

    fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

// =============================================================================
// MEMORY STORE
// =============================================================================

/// Process-local store for tests and throwaway runs.
#[derive(Default)]
pub struct MemoryStore {
    slot: Mutex<Option<Session>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_session(session: Session) -> Self {
        Self { slot: Mutex::new(Some(session)) }
    }
}

impl SessionStore for MemoryStore {
    fn load(&self) -> Result<Option<Session>, StorageError> {
        Ok(self.slot.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn save(&self, session: &Session) -> Result<(), StorageError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
