use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::{config, error::StoreError, types::Credential};

/// Where the signed-in credential outlives the process.
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    async fn load(&self) -> Result<Option<Credential>, StoreError>;

    async fn save(&self, credential: &Credential) -> Result<(), StoreError>;

    /// Removes every stored field. Clearing an empty store succeeds.
    async fn clear(&self) -> Result<(), StoreError>;
}

/// On-disk layout: three fixed keys, nothing else.
#[derive(Debug, Serialize, Deserialize)]
struct StoredCredential {
    #[serde(rename = "accessToken")]
    access_token: String,
    #[serde(
        rename = "refreshToken",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    refresh_token: Option<String>,
    #[serde(rename = "expirationDate")]
    expires_at: DateTime<Utc>,
}

impl From<&Credential> for StoredCredential {
    fn from(credential: &Credential) -> Self {
        StoredCredential {
            access_token: credential.access_token.clone(),
            refresh_token: credential.refresh_token.clone(),
            expires_at: credential.expires_at,
        }
    }
}

impl From<StoredCredential> for Credential {
    // scope and token type are not persisted
    fn from(stored: StoredCredential) -> Self {
        Credential {
            access_token: stored.access_token,
            refresh_token: stored.refresh_token,
            expires_at: stored.expires_at,
            scope: String::new(),
            token_type: "Bearer".to_string(),
        }
    }
}

/// JSON file store, by default `<data_local_dir>/spotauth/cache/credential.json`.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_location() -> Self {
        Self::new(config::data_dir().join("cache").join("credential.json"))
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn load(&self) -> Result<Option<Credential>, StoreError> {
        let content = match async_fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let stored: StoredCredential = serde_json::from_str(&content)?;
        Ok(Some(stored.into()))
    }

    async fn save(&self, credential: &Credential) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(&StoredCredential::from(credential))?;

        // Readers see either the old file or the new one.
        let tmp = self.path.with_extension("json.tmp");
        async_fs::write(&tmp, json).await?;
        async_fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        match async_fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Process-local store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    credential: Mutex<Option<Credential>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(credential: Credential) -> Self {
        Self {
            credential: Mutex::new(Some(credential)),
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn load(&self) -> Result<Option<Credential>, StoreError> {
        Ok(self.credential.lock().await.clone())
    }

    async fn save(&self, credential: &Credential) -> Result<(), StoreError> {
        *self.credential.lock().await = Some(credential.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        *self.credential.lock().await = None;
        Ok(())
    }
}
