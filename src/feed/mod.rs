//! In-memory state of one feed: the current snapshot generation, the cursor
//! into it, and the list the reader actually sees.
//!
//! The visible list is always `pinned ++ unpinned`. Every mutation rebuilds
//! it in one step, so callers holding the store behind a lock never expose a
//! half-partitioned list.

use crate::app::{FeedError, Result};
use crate::domain::Article;

/// Result of asking the store for the next page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAdvance {
    /// `consumed` snapshot records were merged; may be fewer than asked for
    /// on the final page.
    Advanced { consumed: usize },
    /// The cursor already sits at the end of the snapshot. Time to refresh.
    Exhausted,
}

#[derive(Debug, Default)]
pub struct FeedStore {
    snapshot: Vec<Article>,
    visible: Vec<Article>,
    cursor: usize,
}

impl FeedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visible(&self) -> &[Article] {
        &self.visible
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn snapshot_len(&self) -> usize {
        self.snapshot.len()
    }

    pub fn has_snapshot(&self) -> bool {
        !self.snapshot.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.snapshot.len().saturating_sub(self.cursor)
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Start a new generation: replace the snapshot, clear the visible list,
    /// rewind the cursor. Pins from the previous generation are dropped.
    pub fn reset(&mut self, snapshot: Vec<Article>) {
        self.snapshot = snapshot;
        self.visible.clear();
        self.cursor = 0;
    }

    /// Merge the next `batch_size` snapshot records into the visible list.
    ///
    /// The new slice goes ahead of the existing unpinned items. A batch size
    /// of zero changes nothing.
    pub fn advance_page(&mut self, batch_size: usize) -> PageAdvance {
        if batch_size == 0 {
            return PageAdvance::Advanced { consumed: 0 };
        }
        if self.is_exhausted() {
            return PageAdvance::Exhausted;
        }

        let end = (self.cursor + batch_size).min(self.snapshot.len());
        let slice = self.snapshot[self.cursor..end].to_vec();
        let consumed = slice.len();

        let previous = std::mem::take(&mut self.visible);
        self.visible = partition(slice.into_iter().chain(previous));
        self.cursor = end;

        PageAdvance::Advanced { consumed }
    }

    /// Toggle the pin on `visible[index]` and move it to the front of the
    /// partition it now belongs to.
    pub fn apply_pin(&mut self, index: usize) -> Result<&Article> {
        self.check_index(index)?;

        let mut item = self.visible.remove(index);
        item.is_pinned = !item.is_pinned;

        let (mut pinned, unpinned): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.visible)
                .into_iter()
                .partition(|a| a.is_pinned);

        let position = if item.is_pinned {
            pinned.insert(0, item);
            0
        } else {
            let position = pinned.len();
            pinned.push(item);
            position
        };
        pinned.extend(unpinned);
        self.visible = pinned;

        Ok(&self.visible[position])
    }

    /// Hide `visible[index]`. The snapshot and cursor are left alone.
    pub fn apply_delete(&mut self, index: usize) -> Result<Article> {
        self.check_index(index)?;
        Ok(self.visible.remove(index))
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.visible.len() {
            return Err(FeedError::IndexOutOfRange {
                index,
                len: self.visible.len(),
            });
        }
        Ok(())
    }
}

/// Stable split into `pinned ++ unpinned`.
fn partition(articles: impl IntoIterator<Item = Article>) -> Vec<Article> {
    let (mut pinned, unpinned): (Vec<_>, Vec<_>) =
        articles.into_iter().partition(|a| a.is_pinned);
    pinned.extend(unpinned);
    pinned
}
