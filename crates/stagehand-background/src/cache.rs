//! Time-bounded configuration cache.
//!
//! The cache never fails: any fetch failure yields the built-in default
//! configuration, which is never written to storage. Storage failures are
//! logged and the fetched value is still returned.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use stagehand_protocols::defaults::{CONFIG_TTL, default_configuration};
use stagehand_protocols::{CachedConfiguration, Clock, Configuration, SystemClock};

use crate::error::StorageError;
use crate::source::ConfigSource;
use crate::storage::ConfigStorage;

pub struct ConfigCache {
    source: Arc<dyn ConfigSource>,
    storage: Option<Arc<dyn ConfigStorage>>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl ConfigCache {
    /// Cache without storage: every lookup fetches.
    pub fn new(source: Arc<dyn ConfigSource>) -> Self {
        Self {
            source,
            storage: None,
            clock: Arc::new(SystemClock),
            ttl: CONFIG_TTL,
        }
    }

    pub fn with_storage(mut self, storage: Arc<dyn ConfigStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh cached configuration, else a fetched one, else the default.
    pub async fn get(&self) -> Configuration {
        if let Some(storage) = &self.storage {
            match storage.load().await {
                Ok(Some(record)) if record.is_fresh(self.clock.now_millis(), self.ttl) => {
                    debug!(cached_at = record.cached_at_ms, "Using cached configuration");
                    return record.config;
                }
                Ok(Some(record)) => {
                    debug!(cached_at = record.cached_at_ms, "Cached configuration expired");
                }
                Ok(None) => debug!("No cached configuration"),
                Err(e) => warn!(error = %e, "Failed to read cached configuration"),
            }
        }
        self.refresh().await
    }

    /// Drop the cached record so the next lookup fetches.
    pub async fn clear(&self) -> Result<(), StorageError> {
        match &self.storage {
            Some(storage) => {
                storage.clear().await?;
                info!("Configuration cache cleared");
                Ok(())
            }
            None => {
                debug!("No configuration storage to clear");
                Ok(())
            }
        }
    }

    /// Clear, then fetch fresh regardless of what storage held.
    pub async fn invalidate_and_reload(&self) -> Configuration {
        if let Err(e) = self.clear().await {
            warn!(error = %e, "Failed to clear configuration cache before reload");
        }
        self.refresh().await
    }

    /// Populate the cache at startup.
    pub async fn warm(&self) {
        let config = self.get().await;
        info!(
            version = %config.version,
            organizations = config.allowed_organizations.len(),
            stages = config.pipeline_stages.len(),
            "Configuration loaded"
        );
    }

    async fn refresh(&self) -> Configuration {
        let config = match self.source.fetch().await {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "Failed to load remote configuration, using defaults");
                return default_configuration();
            }
        };

        if let Some(storage) = &self.storage {
            let record = CachedConfiguration::new(config.clone(), self.clock.now_millis());
            match storage.store(&record).await {
                Ok(()) => debug!("Configuration cached"),
                Err(e) => warn!(error = %e, "Failed to cache configuration"),
            }
        }
        config
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
