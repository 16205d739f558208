use std::collections::VecDeque;
use std::sync::Arc;

use crate::{
    models::{DiscoveryQuery, GenreId, MovieResult, ADULT_GENRE_ID},
    services::{keywords::KeywordResolver, providers::CatalogProvider},
};

/// Collects movie recommendations with fallback widening
///
/// Pages through discovery results under the most specific filter set first.
/// When a page comes back empty, one filter is dropped (keywords before genres,
/// front to back) and the search continues at the same page number. The search
/// stops once `min_count` movies are collected or no filters remain.
#[derive(Clone)]
pub struct RecommendationEngine {
    provider: Arc<dyn CatalogProvider>,
    resolver: KeywordResolver,
}

impl RecommendationEngine {
    pub fn new(provider: Arc<dyn CatalogProvider>) -> Self {
        let resolver = KeywordResolver::new(provider.clone());
        Self { provider, resolver }
    }

    /// Returns at least `min_count` movies when the catalog has them
    ///
    /// Best effort: may return fewer, including none. Catalog failures count
    /// as empty pages and never surface as errors.
    pub async fn recommend(
        &self,
        genre_ids: &[GenreId],
        keywords: &[String],
        language: &str,
        min_count: usize,
    ) -> Vec<MovieResult> {
        let mut keyword_ids = VecDeque::with_capacity(keywords.len());
        for keyword in keywords {
            if let Some(id) = self.resolver.resolve(keyword).await {
                keyword_ids.push_back(id);
            }
        }

        let mut genre_ids: VecDeque<GenreId> = genre_ids
            .iter()
            .copied()
            .filter(|id| *id != ADULT_GENRE_ID)
            .collect();

        tracing::info!(
            genres = ?genre_ids,
            keywords = ?keyword_ids,
            language = %language,
            min_count,
            "Fetching movie recommendations"
        );

        let mut all_results = Vec::new();
        let mut page = 1;
        let mut calls = 0;

        loop {
            let query = DiscoveryQuery {
                genre_ids: genre_ids.iter().copied().collect(),
                keyword_ids: keyword_ids.iter().copied().collect(),
                language: language.to_string(),
                page,
            };

            calls += 1;
            let results = match self.provider.discover(&query).await {
                Ok(results) => results,
                Err(e) => {
                    tracing::warn!(page, error = %e, "Discovery page failed, treating as empty");
                    Vec::new()
                }
            };
            let page_was_empty = results.is_empty();
            all_results.extend(results);

            if all_results.len() >= min_count {
                break;
            }

            if !page_was_empty {
                page += 1;
            } else if keyword_ids.pop_front().is_none() {
                genre_ids.pop_front();
            }

            if keyword_ids.is_empty() && genre_ids.is_empty() {
                break;
            }
        }

        tracing::info!(
            results = all_results.len(),
            calls,
            "Recommendation search finished"
        );

        all_results
    }
}
