//! Session storage implementation
//!
//! This module handles persistence of the session (token and user profile)
//! in a JSON file, including serialization, deserialization and cleanup.
//! The file is written with owner-only permissions on unix.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::session::Session;
use crate::utils::errors::{EventHubError, Result};

/// File-based session storage
#[derive(Debug, Clone)]
pub struct SessionStorage {
    path: PathBuf,
}

impl SessionStorage {
    /// Create a new storage backed by `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted session.
    ///
    /// A missing file is not an error. A corrupted file is removed and treated
    /// as "no session", the same way an unreadable entry would be discarded.
    pub fn load(&self) -> Result<Option<Session>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No persisted session");
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path).map_err(|e| {
            EventHubError::SessionStorage(format!("Failed to read {}: {}", self.path.display(), e))
        })?;

        match serde_json::from_str::<Session>(&contents) {
            Ok(session) => {
                debug!(path = %self.path.display(), user_id = session.user.user_id, "Persisted session loaded");
                Ok(Some(session))
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Discarding unreadable session file");
                self.clear()?;
                Ok(None)
            }
        }
    }

    /// Persist `session`, replacing any previous one
    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                EventHubError::SessionStorage(format!("Failed to create directory {}: {}", parent.display(), e))
            })?;
        }

        let contents = serde_json::to_string_pretty(session)?;

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&self.path).map_err(|e| {
            EventHubError::SessionStorage(format!("Failed to open {} for writing: {}", self.path.display(), e))
        })?;
        file.write_all(contents.as_bytes()).map_err(|e| {
            EventHubError::SessionStorage(format!("Failed to write {}: {}", self.path.display(), e))
        })?;

        debug!(path = %self.path.display(), user_id = session.user.user_id, "Session persisted");
        Ok(())
    }

    /// Remove the persisted session, if any
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "Persisted session removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(EventHubError::SessionStorage(format!(
                "Failed to remove {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}
