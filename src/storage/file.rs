//! Token pair persisted as a JSON file

use std::path::{Path, PathBuf};

use anyhow::Context;
use directories::ProjectDirs;

use super::{TokenPair, TokenRepository};
use crate::error::{Result, TaskdeckError};

/// File name used inside the data directory.
const SESSION_FILE: &str = "session.json";

/// Stores the token pair as `{"access_token": ..., "refresh_token": ...}`.
///
/// A file that cannot be parsed is treated as an empty session so that a
/// corrupt file never blocks start-up.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Uses the given file path.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Uses `session.json` in the platform data directory.
    ///
    /// # Errors
    ///
    /// Returns [`TaskdeckError::Storage`] if the data directory cannot be
    /// determined.
    pub fn in_data_dir() -> Result<Self> {
        let proj_dirs = ProjectDirs::from("com", "taskdeck", "taskdeck")
            .ok_or_else(|| TaskdeckError::Storage("Could not determine data directory".into()))?;
        Ok(Self::new(proj_dirs.data_dir().join(SESSION_FILE)))
    }

    /// Location of the session file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, contents: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create session directory")
                .map_err(|e| TaskdeckError::Storage(format!("{:#}", e)))?;
        }
        std::fs::write(&self.path, contents)
            .context("Failed to write session file")
            .map_err(|e| TaskdeckError::Storage(format!("{:#}", e)))?;
        restrict_permissions(&self.path);
        Ok(())
    }
}

impl TokenRepository for FileTokenStore {
    fn load(&self) -> Result<TokenPair> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(TokenPair::default()),
            Err(e) => return Err(TaskdeckError::Io(e).into()),
        };

        match serde_json::from_str(&contents) {
            Ok(pair) => Ok(pair),
            Err(e) => {
                tracing::warn!(
                    "Ignoring unreadable session file {}: {}",
                    self.path.display(),
                    e
                );
                Ok(TokenPair::default())
            }
        }
    }

    fn save(&self, tokens: &TokenPair) -> Result<()> {
        if tokens.is_empty() {
            return self.clear();
        }
        let json = serde_json::to_string_pretty(tokens)?;
        self.write(&json)
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(TaskdeckError::Io(e).into()),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    if let Err(e) = std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)) {
        tracing::warn!("Could not restrict permissions on {}: {}", path.display(), e);
    }
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) {}
