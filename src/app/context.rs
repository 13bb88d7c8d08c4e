use std::path::PathBuf;
use std::sync::Arc;

use crate::app::error::{FeedError, Result};
use crate::cache::{MemoryCache, PersistentCache, SqliteCache};
use crate::config::Config;
use crate::provider::{ArticleProvider, NewsApiProvider};
use crate::sync::scheduler::SchedulerConfig;
use crate::sync::{EngineSettings, Scheduler, SyncEngine};

pub struct AppContext {
    pub config: Config,
    pub engine: Arc<SyncEngine>,
}

impl AppContext {
    /// Engine backed by the SQLite cache at the configured (or default) path.
    pub fn new(config: Config) -> Result<Self> {
        let db_path = match config.cache.path.clone() {
            Some(p) => p,
            None => Self::default_db_path()?,
        };
        let cache: Arc<dyn PersistentCache + Send + Sync> = Arc::new(SqliteCache::new(&db_path)?);
        Ok(Self::with_cache(config, cache))
    }

    /// Engine whose snapshot lives only as long as the process.
    pub fn ephemeral(config: Config) -> Self {
        Self::with_cache(config, Arc::new(MemoryCache::new()))
    }

    pub fn with_cache(config: Config, cache: Arc<dyn PersistentCache + Send + Sync>) -> Self {
        let provider: Arc<dyn ArticleProvider + Send + Sync> =
            Arc::new(NewsApiProvider::new(config.provider.clone()));
        Self::with_parts(config, provider, cache)
    }

    pub fn with_parts(
        config: Config,
        provider: Arc<dyn ArticleProvider + Send + Sync>,
        cache: Arc<dyn PersistentCache + Send + Sync>,
    ) -> Self {
        let engine = Arc::new(SyncEngine::new(
            provider,
            cache,
            EngineSettings::from_config(&config),
        ));
        Self { config, engine }
    }

    pub fn scheduler(&self) -> Scheduler {
        Scheduler::new(
            self.engine.clone(),
            SchedulerConfig::from(&self.config.sync),
        )
    }

    fn default_db_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| FeedError::Config("Could not find data directory".into()))?;
        let app_dir = data_dir.join("headline-sync");
        std::fs::create_dir_all(&app_dir)?;
        Ok(app_dir.join("cache.db"))
    }
}
