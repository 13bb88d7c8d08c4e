pub mod news_api;

use async_trait::async_trait;

use crate::app::Result;
use crate::domain::RawArticle;

pub use news_api::NewsApiProvider;

/// Source of ranked headline batches.
///
/// Implementations return at most `page_size` records, newest first, and
/// handle their own transport retries. The engine consumes the order as-is.
#[async_trait]
pub trait ArticleProvider {
    async fn fetch(&self, page_size: usize) -> Result<Vec<RawArticle>>;
}
