//! Periodic driver for [`SyncEngine::tick`].
//!
//! `start` spawns a tokio task that ticks the engine on a fixed interval;
//! `stop` clears the run flag, waits out any tick already executing and
//! cancels the task. No tick begins after `stop` returns.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::{format_interval, SyncConfig};
use crate::sync::{SyncEngine, TickOutcome};

/// Scheduler configuration
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Batch size for the first tick after start
    pub initial_batch: usize,
    /// Batch size for every later tick
    pub incremental_batch: usize,
    /// Whether to tick immediately on start instead of after one interval
    pub tick_on_start: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::from(&SyncConfig::default())
    }
}

impl From<&SyncConfig> for SchedulerConfig {
    fn from(sync: &SyncConfig) -> Self {
        Self {
            initial_batch: sync.initial_batch,
            incremental_batch: sync.incremental_batch,
            tick_on_start: sync.tick_on_start,
        }
    }
}

struct RunningTask {
    running: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

pub struct Scheduler {
    engine: Arc<SyncEngine>,
    config: SchedulerConfig,
    task: Mutex<Option<RunningTask>>,
}

impl Scheduler {
    pub fn new(engine: Arc<SyncEngine>, config: SchedulerConfig) -> Self {
        Self {
            engine,
            config,
            task: Mutex::new(None),
        }
    }

    pub fn is_running(&self) -> bool {
        self.task().is_some()
    }

    /// Begin ticking every `every`. Returns `false` if already running or
    /// `every` is zero.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self, every: Duration) -> bool {
        if every.is_zero() {
            warn!("Refusing to start scheduler with a zero interval");
            return false;
        }

        let mut task = self.task();
        if task.is_some() {
            debug!("Scheduler already running");
            return false;
        }

        let running = Arc::new(AtomicBool::new(true));
        let handle = tokio::spawn(run_loop(
            self.engine.clone(),
            self.config.clone(),
            every,
            running.clone(),
        ));

        info!(
            "Scheduler started (interval: {})",
            format_interval(every.as_secs())
        );
        *task = Some(RunningTask { running, handle });
        true
    }

    /// Stop ticking. Waits for a tick that is already executing; a no-op when
    /// not running.
    pub async fn stop(&self) {
        let task = self.task().take();
        let Some(task) = task else {
            return;
        };

        task.running.store(false, Ordering::SeqCst);
        self.engine.quiesce().await;
        task.handle.abort();
        info!("Scheduler stopped");
    }

    fn task(&self) -> MutexGuard<'_, Option<RunningTask>> {
        self.task.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        if let Some(task) = self.task().take() {
            task.running.store(false, Ordering::SeqCst);
            task.handle.abort();
        }
    }
}

async fn run_loop(
    engine: Arc<SyncEngine>,
    config: SchedulerConfig,
    every: Duration,
    running: Arc<AtomicBool>,
) {
    let mut timer = interval(every);
    timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
    if !config.tick_on_start {
        timer.tick().await; // Skip the first immediate tick
    }

    let mut batch = config.initial_batch;
    while running.load(Ordering::SeqCst) {
        timer.tick().await;

        match engine.scheduled_tick(batch, &running).await {
            Ok(TickOutcome::Skipped) => debug!("Scheduled tick skipped"),
            Ok(outcome) => debug!("Scheduled tick: {:?}", outcome),
            Err(e) => warn!("Scheduled tick failed: {}", e),
        }
        batch = config.incremental_batch;
    }
}
