//! Local persistence of the cached configuration.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::debug;

use stagehand_protocols::{CachedConfiguration, Configuration};

use crate::error::StorageError;

/// Key-value store holding at most one cached configuration record.
#[async_trait]
pub trait ConfigStorage: Send + Sync {
    async fn load(&self) -> Result<Option<CachedConfiguration>, StorageError>;

    async fn store(&self, record: &CachedConfiguration) -> Result<(), StorageError>;

    async fn clear(&self) -> Result<(), StorageError>;
}

/// In-memory storage.
#[derive(Default)]
pub struct MemoryConfigStorage {
    record: Mutex<Option<CachedConfiguration>>,
}

impl MemoryConfigStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConfigStorage for MemoryConfigStorage {
    async fn load(&self) -> Result<Option<CachedConfiguration>, StorageError> {
        Ok(self.record.lock().clone())
    }

    async fn store(&self, record: &CachedConfiguration) -> Result<(), StorageError> {
        *self.record.lock() = Some(record.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.record.lock().take();
        Ok(())
    }
}

/// On-disk layout, keyed like the extension's local storage area.
#[derive(Serialize, Deserialize)]
struct StoredRecord {
    plugin_config: Configuration,
    config_cached_at: i64,
}

/// JSON file storage.
///
/// ```text
/// {dir}/
/// └── plugin_config.json
/// ```
pub struct FileConfigStorage {
    path: PathBuf,
}

impl FileConfigStorage {
    pub const FILE_NAME: &'static str = "plugin_config.json";

    /// Open storage under `dir`, creating the directory if needed.
    pub async fn new(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        let path = dir.join(Self::FILE_NAME);
        debug!("FileConfigStorage initialized at {:?}", path);
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ConfigStorage for FileConfigStorage {
    async fn load(&self) -> Result<Option<CachedConfiguration>, StorageError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let stored: StoredRecord = serde_json::from_str(&content)?;
        Ok(Some(CachedConfiguration::new(
            stored.plugin_config,
            stored.config_cached_at,
        )))
    }

    async fn store(&self, record: &CachedConfiguration) -> Result<(), StorageError> {
        let stored = StoredRecord {
            plugin_config: record.config.clone(),
            config_cached_at: record.cached_at_ms,
        };
        let content = serde_json::to_string_pretty(&stored)?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
