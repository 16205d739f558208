use std::sync::Arc;

use crate::{models::KeywordId, services::providers::CatalogProvider};

/// Resolves free-text keywords to catalog keyword ids
///
/// One lookup per call and no retries. A failed lookup and a lookup with no
/// matches both resolve to `None`.
#[derive(Clone)]
pub struct KeywordResolver {
    provider: Arc<dyn CatalogProvider>,
}

impl KeywordResolver {
    pub fn new(provider: Arc<dyn CatalogProvider>) -> Self {
        Self { provider }
    }

    pub async fn resolve(&self, keyword: &str) -> Option<KeywordId> {
        match self.provider.search_keywords(keyword).await {
            Ok(ids) => {
                let id = ids.first().copied();
                if id.is_none() {
                    tracing::debug!(keyword = %keyword, "No keyword match");
                }
                id
            }
            Err(e) => {
                tracing::warn!(keyword = %keyword, error = %e, "Keyword lookup failed");
                None
            }
        }
    }
}
