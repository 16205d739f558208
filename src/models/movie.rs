use serde::{Deserialize, Serialize};

use super::GenreId;

/// Catalog identifier of a keyword
pub type KeywordId = u64;

/// A movie returned to the user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieResult {
    pub title: String,
    pub overview: Option<String>,
    pub release_date: Option<String>,
    pub poster_path: Option<String>,
}

/// One page request against the discovery endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryQuery {
    pub genre_ids: Vec<GenreId>,
    pub keyword_ids: Vec<KeywordId>,
    pub language: String,
    pub page: u32,
}

impl DiscoveryQuery {
    /// Query parameters for the request, without credentials
    ///
    /// Sort order, adult and video flags are fixed. Genre and keyword lists are
    /// comma-joined and left out entirely when empty.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("language", self.language.clone()),
            ("sort_by", "popularity.desc".to_string()),
            ("include_adult", "true".to_string()),
            ("include_video", "false".to_string()),
            ("page", self.page.to_string()),
        ];

        if !self.genre_ids.is_empty() {
            params.push(("with_genres", join_ids(&self.genre_ids)));
        }
        if !self.keyword_ids.is_empty() {
            params.push(("with_keywords", join_ids(&self.keyword_ids)));
        }

        params
    }
}

fn join_ids<T: ToString>(ids: &[T]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

// ============================================================================
// TMDB API Types
// ============================================================================

/// Raw movie entry from `/discover/movie`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiMovie {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

impl From<ApiMovie> for MovieResult {
    fn from(movie: ApiMovie) -> Self {
        // TMDB sends "" rather than null for some unknown fields
        let non_empty = |s: Option<String>| s.filter(|v| !v.trim().is_empty());

        MovieResult {
            title: non_empty(movie.title).unwrap_or_else(|| "Unknown Title".to_string()),
            overview: non_empty(movie.overview),
            release_date: non_empty(movie.release_date),
            poster_path: non_empty(movie.poster_path),
        }
    }
}

/// Keyword entry from `/search/keyword`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiKeyword {
    pub id: KeywordId,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct KeywordSearchResponse {
    #[serde(default)]
    pub results: Vec<ApiKeyword>,
}
