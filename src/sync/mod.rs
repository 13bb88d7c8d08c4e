//! Refresh and paging orchestration.
//!
//! ```text
//! tick(n) ── cache.get ──┬─ absent / cursor at end ─→ provider.fetch → cache.set → reset → first page
//!                        └─ items remain ───────────→ advance_page(n)
//! ```
//!
//! One operation runs at a time per engine. A tick that arrives while another
//! is refreshing or paging is dropped, not queued.

pub mod scheduler;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::app::Result;
use crate::cache::PersistentCache;
use crate::config::Config;
use crate::domain::{decode_snapshot, encode_snapshot, Article};
use crate::feed::{FeedStore, PageAdvance};
use crate::provider::ArticleProvider;

pub use scheduler::Scheduler;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Refreshing,
    Paging,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A new generation was fetched and its first page shown.
    Refreshed { fetched: usize, shown: usize },
    /// More of the current snapshot was merged into the visible list.
    Paged { consumed: usize, cursor: usize },
    /// Nothing happened: zero batch size, or another operation was running.
    Skipped,
}

/// Broadcast to subscribers after each completed operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    Refreshed { fetched: usize, shown: usize },
    Paged { consumed: usize, cursor: usize },
    RefreshFailed(String),
}

#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Name of the snapshot blob in the persistent cache
    pub cache_key: String,
    /// Articles requested from the provider per refresh
    pub page_size: usize,
    /// Articles shown right after a refresh
    pub initial_batch: usize,
}

impl EngineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            cache_key: config.cache.key.clone(),
            page_size: config.sync.page_size,
            initial_batch: config.sync.initial_batch,
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

pub struct SyncEngine {
    provider: Arc<dyn ArticleProvider + Send + Sync>,
    cache: Arc<dyn PersistentCache + Send + Sync>,
    settings: EngineSettings,
    feed: Mutex<FeedStore>,
    state: Mutex<SyncState>,
    in_flight: tokio::sync::Mutex<()>,
    events: broadcast::Sender<SyncEvent>,
}

impl SyncEngine {
    pub fn new(
        provider: Arc<dyn ArticleProvider + Send + Sync>,
        cache: Arc<dyn PersistentCache + Send + Sync>,
        settings: EngineSettings,
    ) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            provider,
            cache,
            settings,
            feed: Mutex::new(FeedStore::new()),
            state: Mutex::new(SyncState::Idle),
            in_flight: tokio::sync::Mutex::new(()),
            events,
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    pub fn state(&self) -> SyncState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn visible_list(&self) -> Vec<Article> {
        self.feed().visible().to_vec()
    }

    pub fn cursor(&self) -> usize {
        self.feed().cursor()
    }

    pub fn snapshot_len(&self) -> usize {
        self.feed().snapshot_len()
    }

    /// Refresh when the cache is empty or used up, otherwise merge the next
    /// `batch_size` cached articles. A batch size of zero does nothing.
    pub async fn tick(&self, batch_size: usize) -> Result<TickOutcome> {
        if batch_size == 0 {
            return Ok(TickOutcome::Skipped);
        }
        let Ok(_guard) = self.in_flight.try_lock() else {
            debug!("Tick dropped: another operation is in progress");
            return Ok(TickOutcome::Skipped);
        };
        self.finish(self.tick_locked(batch_size).await)
    }

    /// Presentation-facing alias for [`tick`](Self::tick).
    pub async fn request_next_page(&self, batch_size: usize) -> Result<TickOutcome> {
        self.tick(batch_size).await
    }

    /// Drop the persisted snapshot and fetch a new generation.
    ///
    /// If the fetch fails the visible list is kept, and the next tick will
    /// try to refresh again because the cache is now empty.
    pub async fn force_refresh(&self) -> Result<TickOutcome> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            debug!("Forced refresh dropped: another operation is in progress");
            return Ok(TickOutcome::Skipped);
        };
        if let Err(e) = self.cache.remove(&self.settings.cache_key).await {
            warn!("Failed to clear cached snapshot: {}", e);
        }
        self.finish(self.refresh().await)
    }

    /// Remove the persisted snapshot without fetching.
    pub async fn clear_cache(&self) -> Result<()> {
        let _guard = self.in_flight.lock().await;
        self.cache.remove(&self.settings.cache_key).await
    }

    /// Toggle the pin on the visible article at `index`.
    pub fn pin(&self, index: usize) -> Result<Article> {
        let mut feed = self.feed();
        let article = feed.apply_pin(index)?;
        debug!("Article {} pinned={}", article.key, article.is_pinned);
        Ok(article.clone())
    }

    /// Hide the visible article at `index`. The cached snapshot is untouched.
    pub fn delete(&self, index: usize) -> Result<Article> {
        let removed = self.feed().apply_delete(index)?;
        debug!("Article {} removed from visible list", removed.key);
        Ok(removed)
    }

    /// Tick on behalf of a scheduler; skipped once `running` is cleared.
    pub(crate) async fn scheduled_tick(
        &self,
        batch_size: usize,
        running: &AtomicBool,
    ) -> Result<TickOutcome> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            debug!("Scheduled tick dropped: another operation is in progress");
            return Ok(TickOutcome::Skipped);
        };
        if !running.load(Ordering::SeqCst) || batch_size == 0 {
            return Ok(TickOutcome::Skipped);
        }
        self.finish(self.tick_locked(batch_size).await)
    }

    /// Wait until no operation is in flight.
    pub(crate) async fn quiesce(&self) {
        let _guard = self.in_flight.lock().await;
    }

    fn finish(&self, result: Result<TickOutcome>) -> Result<TickOutcome> {
        self.set_state(SyncState::Idle);
        result
    }

    async fn tick_locked(&self, batch_size: usize) -> Result<TickOutcome> {
        let Some(persisted) = self.read_snapshot().await else {
            return self.refresh().await;
        };

        self.set_state(SyncState::Paging);
        let (advance, cursor) = {
            let mut feed = self.feed();
            if !feed.has_snapshot() {
                info!("Resuming cached snapshot of {} articles", persisted.len());
                feed.reset(persisted);
            }
            (feed.advance_page(batch_size), feed.cursor())
        };

        match advance {
            PageAdvance::Advanced { consumed } => {
                debug!("Merged {} cached articles, cursor at {}", consumed, cursor);
                let _ = self.events.send(SyncEvent::Paged { consumed, cursor });
                Ok(TickOutcome::Paged { consumed, cursor })
            }
            PageAdvance::Exhausted => self.refresh().await,
        }
    }

    async fn refresh(&self) -> Result<TickOutcome> {
        self.set_state(SyncState::Refreshing);

        let batch = match self.provider.fetch(self.settings.page_size).await {
            Ok(batch) => batch,
            Err(e) => {
                error!("Failed to fetch headlines: {}", e);
                let _ = self.events.send(SyncEvent::RefreshFailed(e.to_string()));
                return Err(e);
            }
        };

        let articles = Article::generation(batch);
        let fetched = articles.len();

        // The write has to land before the store points at the new generation.
        self.persist(&articles).await;

        let shown = {
            let mut feed = self.feed();
            feed.reset(articles);
            match feed.advance_page(self.settings.initial_batch) {
                PageAdvance::Advanced { consumed } => consumed,
                PageAdvance::Exhausted => 0,
            }
        };

        info!("Refreshed headlines: {} fetched, {} shown", fetched, shown);
        let _ = self.events.send(SyncEvent::Refreshed { fetched, shown });
        Ok(TickOutcome::Refreshed { fetched, shown })
    }

    /// Unreadable or undecodable snapshots count as absent.
    async fn read_snapshot(&self) -> Option<Vec<Article>> {
        match self.cache.get(&self.settings.cache_key).await {
            Ok(Some(blob)) => match decode_snapshot(&blob) {
                Ok(articles) => Some(articles),
                Err(e) => {
                    warn!("Discarding unreadable snapshot: {}", e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("Failed to read cached snapshot: {}", e);
                None
            }
        }
    }

    async fn persist(&self, articles: &[Article]) {
        let written = match encode_snapshot(articles) {
            Ok(blob) => self.cache.set(&self.settings.cache_key, &blob).await,
            Err(e) => Err(e),
        };

        if let Err(e) = written {
            warn!("Failed to persist snapshot: {}", e);
            // An older generation left behind would be paged from on the next tick.
            if let Err(e) = self.cache.remove(&self.settings.cache_key).await {
                warn!("Failed to drop stale snapshot: {}", e);
            }
        }
    }

    fn feed(&self) -> MutexGuard<'_, FeedStore> {
        self.feed.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: SyncState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::app::{FeedError, Result};
    use crate::domain::article::sample_raw;
    use crate::domain::RawArticle;
    use crate::provider::ArticleProvider;

    /// Returns `available` articles per call, titled `g<call>-<position>`.
    pub struct ScriptedProvider {
        available: usize,
        delay: Option<Duration>,
        calls: AtomicUsize,
        fail: AtomicBool,
    }

    impl ScriptedProvider {
        pub fn new(available: usize) -> Self {
            Self {
                available,
                delay: None,
                calls: AtomicUsize::new(0),
                fail: AtomicBool::new(false),
            }
        }

        pub fn with_delay(available: usize, delay: Duration) -> Self {
            Self {
                delay: Some(delay),
                ..Self::new(available)
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn set_failing(&self, fail: bool) {
            self.fail.store(fail, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl ArticleProvider for ScriptedProvider {
        async fn fetch(&self, page_size: usize) -> Result<Vec<RawArticle>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail.load(Ordering::SeqCst) {
                return Err(FeedError::Provider("connection refused".into()));
            }
            Ok((0..self.available.min(page_size))
                .map(|i| sample_raw(&format!("g{}-{}", call, i)))
                .collect())
        }
    }
}
