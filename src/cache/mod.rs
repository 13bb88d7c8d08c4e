pub mod memory;
pub mod sqlite;

use async_trait::async_trait;

use crate::app::Result;

pub use memory::MemoryCache;
pub use sqlite::SqliteCache;

/// Durable byte store holding whole snapshot blobs by name.
///
/// `set` replaces the stored value in full; a reader sees either the last
/// complete write or nothing. Removing a missing name succeeds.
#[async_trait]
pub trait PersistentCache {
    async fn get(&self, name: &str) -> Result<Option<Vec<u8>>>;
    async fn set(&self, name: &str, value: &[u8]) -> Result<()>;
    async fn remove(&self, name: &str) -> Result<()>;
}
