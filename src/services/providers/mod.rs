/// Movie catalog provider abstraction
///
/// A provider exposes the two catalog calls the bot needs: keyword lookup and
/// paginated discovery. Providers surface failures as errors; callers decide
/// how to degrade.
use crate::{
    error::AppResult,
    models::{DiscoveryQuery, KeywordId, MovieResult},
};

pub mod tmdb;

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Searches keywords by free text, returning matching ids in catalog order
    async fn search_keywords(&self, query: &str) -> AppResult<Vec<KeywordId>>;

    /// Fetches one page of discovery results
    async fn discover(&self, query: &DiscoveryQuery) -> AppResult<Vec<MovieResult>>;
}
