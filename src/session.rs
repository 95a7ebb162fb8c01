//! Session persistence
//!
//! The logged-in user and bearer token live in a small JSON file under the
//! user data directory (`~/.local/share/mflix/session.json` on Linux).

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::Session;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Could not determine data directory")]
    NoDataDir,

    #[error("Session file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt session file: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// On-disk home of the session record
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location (`<data_dir>/mflix/session.json`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|p| p.join("mflix").join("session.json"))
    }

    pub fn open_default() -> Result<Self, SessionError> {
        Self::default_path()
            .map(Self::new)
            .ok_or(SessionError::NoDataDir)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored session; `None` when there is none
    pub fn load(&self) -> Result<Option<Session>, SessionError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let session: Session = serde_json::from_str(&text)?;
        if session.token.is_empty() {
            return Ok(None);
        }
        Ok(Some(session))
    }

    pub fn save(&self, session: &Session) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, json)?;

        // Token is a credential
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }

        tracing::debug!(path = %self.path.display(), "session saved");
        Ok(())
    }

    /// Remove the stored session. Missing file is not an error.
    pub fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
