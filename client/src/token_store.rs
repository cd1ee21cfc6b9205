//! Bearer token persistence.
//!
//! Exactly one item survives between runs: the bearer token. It is written on login
//! and removed on logout or session expiry. On unix the file is readable by its owner only.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from token persistence
#[derive(Debug, Error)]
pub enum TokenStoreError {
    /// Reading the persisted token failed
    #[error("Failed to read token from {path}: {source}")]
    Read {
        /// Token file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Writing the token failed
    #[error("Failed to write token to {path}: {source}")]
    Write {
        /// Token file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Removing the token failed
    #[error("Failed to remove token at {path}: {source}")]
    Remove {
        /// Token file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },
}

/// Result type alias for token persistence
pub type Result<T> = std::result::Result<T, TokenStoreError>;

/// Keeps the single persisted bearer token.
pub trait TokenStore: Send + Sync {
    /// The persisted token, if any
    ///
    /// # Errors
    ///
    /// Returns [`TokenStoreError::Read`] if storage exists but cannot be read
    fn load(&self) -> Result<Option<String>>;

    /// Persist `token`, replacing any previous one
    ///
    /// # Errors
    ///
    /// Returns [`TokenStoreError::Write`] if the token cannot be written
    fn save(&self, token: &str) -> Result<()>;

    /// Forget the persisted token; succeeds when there is none
    ///
    /// # Errors
    ///
    /// Returns [`TokenStoreError::Remove`] if existing storage cannot be removed
    fn clear(&self) -> Result<()>;
}

/// [`TokenStore`] backed by one file
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Store the token at `path`
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the token file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(unix)]
const OWNER_READ_WRITE: u32 = 0o600;

#[cfg(unix)]
fn owner_only() -> OpenOptions {
    use std::os::unix::fs::OpenOptionsExt;

    let mut options = OpenOptions::new();
    options.mode(OWNER_READ_WRITE);
    options
}

#[cfg(not(unix))]
fn owner_only() -> OpenOptions {
    OpenOptions::new()
}

/// `mode` only applies when the file is created; a file left by an older run keeps its bits
#[cfg(unix)]
fn restrict(file: &fs::File) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    file.set_permissions(fs::Permissions::from_mode(OWNER_READ_WRITE))
}

#[cfg(not(unix))]
fn restrict(_file: &fs::File) -> io::Result<()> {
    Ok(())
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            },
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(TokenStoreError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn save(&self, token: &str) -> Result<()> {
        let write_error = |source: io::Error| TokenStoreError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(write_error)?;
        }
        let mut file = owner_only()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)
            .map_err(write_error)?;
        restrict(&file).map_err(write_error)?;
        file.write_all(token.as_bytes()).map_err(write_error)?;
        tracing::debug!(path = %self.path.display(), "Token persisted");
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "Token removed");
                Ok(())
            },
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(TokenStoreError::Remove {
                path: self.path.clone(),
                source,
            }),
        }
    }
}
