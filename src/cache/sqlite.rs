use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use rusqlite_migration::{Migrations, M};

use crate::app::{FeedError, Result};
use crate::cache::PersistentCache;

pub struct SqliteCache {
    conn: Mutex<Connection>,
}

impl SqliteCache {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let cache = Self {
            conn: Mutex::new(conn),
        };
        cache.run_migrations()?;
        Ok(cache)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let cache = Self {
            conn: Mutex::new(conn),
        };
        cache.run_migrations()?;
        Ok(cache)
    }

    fn run_migrations(&self) -> Result<()> {
        let migrations = Migrations::new(vec![M::up(include_str!(
            "../../migrations/001-initial/up.sql"
        ))]);

        let mut conn = self.lock()?;
        migrations
            .to_latest(&mut conn)
            .map_err(|e| FeedError::Cache(format!("migration failed: {}", e)))?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| FeedError::Cache(format!("connection poisoned: {}", e)))
    }
}

#[async_trait]
impl PersistentCache for SqliteCache {
    async fn get(&self, name: &str) -> Result<Option<Vec<u8>>> {
        let conn = self.lock()?;

        let value = conn
            .query_row(
                "SELECT value FROM cache_entries WHERE name = ?1",
                params![name],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;

        Ok(value)
    }

    async fn set(&self, name: &str, value: &[u8]) -> Result<()> {
        let conn = self.lock()?;

        conn.execute(
            "INSERT INTO cache_entries (name, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(name) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![name, value, Utc::now().to_rfc3339()],
        )?;

        Ok(())
    }

    async fn remove(&self, name: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM cache_entries WHERE name = ?1", params![name])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::article::sample_raw;
    use crate::domain::{decode_snapshot, encode_snapshot, Article};

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let cache = SqliteCache::in_memory().unwrap();
        assert!(cache.get("HEADLINES").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let cache = SqliteCache::in_memory().unwrap();
        cache.set("HEADLINES", b"[1,2,3]").await.unwrap();

        let value = cache.get("HEADLINES").await.unwrap();
        assert_eq!(value.as_deref(), Some(&b"[1,2,3]"[..]));
    }

    #[tokio::test]
    async fn test_set_replaces_whole_value() {
        let cache = SqliteCache::in_memory().unwrap();
        cache.set("HEADLINES", b"a much longer first value").await.unwrap();
        cache.set("HEADLINES", b"short").await.unwrap();

        let value = cache.get("HEADLINES").await.unwrap().unwrap();
        assert_eq!(value, b"short");
    }

    #[tokio::test]
    async fn test_remove() {
        let cache = SqliteCache::in_memory().unwrap();
        cache.set("HEADLINES", b"x").await.unwrap();
        cache.remove("HEADLINES").await.unwrap();
        assert!(cache.get("HEADLINES").await.unwrap().is_none());

        // Removing again is still fine
        tokio_test::assert_ok!(cache.remove("HEADLINES").await);
    }

    #[tokio::test]
    async fn test_names_are_independent() {
        let cache = SqliteCache::in_memory().unwrap();
        cache.set("a", b"1").await.unwrap();
        cache.set("b", b"2").await.unwrap();
        cache.remove("a").await.unwrap();

        assert!(cache.get("a").await.unwrap().is_none());
        assert_eq!(cache.get("b").await.unwrap().unwrap(), b"2");
    }

    #[tokio::test]
    async fn test_snapshot_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.db");

        let articles = Article::generation((0..12).map(|i| sample_raw(&format!("story-{}", i))).collect());
        {
            let cache = SqliteCache::new(&path).unwrap();
            cache
                .set("HEADLINES", &encode_snapshot(&articles).unwrap())
                .await
                .unwrap();
        }

        let reopened = SqliteCache::new(&path).unwrap();
        let blob = reopened.get("HEADLINES").await.unwrap().unwrap();
        let decoded = decode_snapshot(&blob).unwrap();

        assert_eq!(decoded.len(), 12);
        assert_eq!(decoded, articles);
    }
}
