//! Persistence for the platform bearer token.
//!
//! The client holds exactly one opaque token string, keyed by a fixed name.
//! It is written after a successful sign-in and cleared on sign-out or when
//! the server rejects the credential.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::{Error, Result};

/// Fixed storage key for the platform bearer token.
pub const TOKEN_KEY: &str = "authToken";

/// Storage backend for the bearer token.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Load the stored token, if any.
    async fn load(&self) -> Result<Option<String>>;

    /// Replace the stored token.
    async fn save(&self, token: &str) -> Result<()>;

    /// Remove the stored token. Clearing an empty store is not an error.
    async fn clear(&self) -> Result<()>;
}

/// Process-local token store. The default; nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> Result<Option<String>> {
        let guard = self
            .token
            .read()
            .map_err(|_| Error::general("token store lock poisoned"))?;
        Ok(guard.clone())
    }

    async fn save(&self, token: &str) -> Result<()> {
        let mut guard = self
            .token
            .write()
            .map_err(|_| Error::general("token store lock poisoned"))?;
        *guard = Some(token.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut guard = self
            .token
            .write()
            .map_err(|_| Error::general("token store lock poisoned"))?;
        *guard = None;
        Ok(())
    }
}

/// File-backed token store: one file named [`TOKEN_KEY`] inside the given
/// directory, holding the raw token string.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(TOKEN_KEY),
        }
    }

    /// Location of the token file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> Result<Option<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => {
                let token = raw.trim();
                if token.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(token.to_string()))
                }
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(Error::general(format!("failed to read token: {err}"))),
        }
    }

    async fn save(&self, token: &str) -> Result<()> {
        tokio::fs::write(&self.path, token)
            .await
            .map_err(|err| Error::general(format!("failed to write token: {err}")))
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(Error::general(format!("failed to clear token: {err}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_round_trip() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.load().await.unwrap(), None);

        store.save("token-1").await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some("token-1".to_string()));

        store.clear().await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path());
        assert!(store.path().ends_with(TOKEN_KEY));

        assert_eq!(store.load().await.unwrap(), None);
        store.save("token-2").await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some("token-2".to_string()));

        store.clear().await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);
        // clearing twice is fine
        store.clear().await.unwrap();
    }
}
