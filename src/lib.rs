//! # headline-sync
//!
//! Keeps a ranked headline feed in sync with a remote news provider, cached
//! locally and surfaced to a reader a few articles at a time.
//!
//! ## Architecture
//!
//! ```text
//! Provider → Cache → FeedStore → visible list
//!              ↑         ↑
//!           SyncEngine ──┘ ← Scheduler
//! ```
//!
//! A refresh fetches one batch from the provider, stores it as a snapshot and
//! shows the first page. Later ticks merge more of that snapshot into the
//! visible list, newest page first, until the snapshot runs out and the next
//! tick refreshes again. Pinned articles always stay at the top.
//!
//! Article keys are positions within one fetched batch. A refresh starts a
//! new generation with new keys, and pins from the old generation are lost.
//!
//! ## Quick Start
//!
//! ```bash
//! # Fetch (or resume) headlines and print the first page
//! headline-sync show
//!
//! # Tick every 5 seconds until Ctrl-C
//! headline-sync watch --interval 5s
//!
//! # Start over with a fresh batch
//! headline-sync refresh
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the provider,
/// the cache and the sync engine.
pub mod app;

/// Snapshot persistence.
///
/// - [`PersistentCache`](cache::PersistentCache): async get/set/remove of whole blobs
/// - [`SqliteCache`](cache::SqliteCache): SQLite-backed implementation
/// - [`MemoryCache`](cache::MemoryCache): in-process implementation
pub mod cache;

/// Command-line interface using clap.
pub mod cli;

/// Configuration loaded from `~/.config/headline-sync/config.toml`.
pub mod config;

/// Core domain models: [`Article`](domain::Article) and its snapshot encoding.
pub mod domain;

/// Visible list, cursor and snapshot of a single feed.
pub mod feed;

/// Headline sources.
///
/// - [`ArticleProvider`](provider::ArticleProvider): async trait for batch fetching
/// - [`NewsApiProvider`](provider::NewsApiProvider): reqwest-based implementation
pub mod provider;

/// Refresh/paging orchestration and the periodic scheduler.
pub mod sync;
