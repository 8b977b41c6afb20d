//! File-persisted session: the bearer token and the identity it belongs
//! to, written on login and removed on logout.
//!
//! The store is an explicit object handed to whoever needs the session.
//! Nothing in this crate reads credentials from ambient global state.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use hostel_types::models::Identity;

use crate::error::{ClientError, Result};

/// Current identity plus its credential. Created at login/register,
/// destroyed on logout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: Identity,
}

/// Persists a [`Session`] as JSON at a fixed path across restarts.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Resolve the session file path: `HOSTEL_SESSION_FILE` if set,
    /// otherwise `$HOME/.hostel/session.json`, falling back to the
    /// working directory when no home is available.
    pub fn from_env() -> Self {
        let path = std::env::var_os("HOSTEL_SESSION_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                std::env::var_os("HOME")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".hostel")
                    .join("session.json")
            });
        Self::new(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted session, if any.
    pub fn load(&self) -> Result<Option<Session>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let session = serde_json::from_str(&raw)
            .map_err(|err| ClientError::Session(format!("corrupt session file: {err}")))?;
        Ok(Some(session))
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, raw)?;
        debug!(path = %self.path.display(), "session saved");
        Ok(())
    }

    /// Tear the session down (logout). Missing file is not an error.
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
