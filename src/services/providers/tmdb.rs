/// TMDB API provider
///
/// API Flow:
/// 1. Keyword lookup: /search/keyword → keyword ids for free text
/// 2. Discovery: /discover/movie → one page of movies matching genre/keyword filters
use crate::{
    error::{AppError, AppResult},
    models::{ApiMovie, DiscoveryQuery, KeywordId, KeywordSearchResponse, MovieResult},
    services::providers::CatalogProvider,
};
use reqwest::Client as HttpClient;

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl TmdbProvider {
    pub fn new(api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    async fn ensure_success(response: reqwest::Response) -> AppResult<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(AppError::ExternalApi(format!(
            "TMDB API returned status {}: {}",
            status, body
        )))
    }
}

#[async_trait::async_trait]
impl CatalogProvider for TmdbProvider {
    async fn search_keywords(&self, query: &str) -> AppResult<Vec<KeywordId>> {
        let url = format!("{}/search/keyword", self.api_url);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str()), ("query", query)])
            .send()
            .await?;
        let response = Self::ensure_success(response).await?;

        let search: KeywordSearchResponse = response.json().await?;
        let ids: Vec<KeywordId> = search.results.into_iter().map(|k| k.id).collect();

        tracing::debug!(
            query = %query,
            results = ids.len(),
            provider = "tmdb",
            "Keyword search completed"
        );

        Ok(ids)
    }

    async fn discover(&self, query: &DiscoveryQuery) -> AppResult<Vec<MovieResult>> {
        let url = format!("{}/discover/movie", self.api_url);

        let mut params = query.to_params();
        params.push(("api_key", self.api_key.clone()));

        let response = self.http_client.get(&url).query(&params).send().await?;
        let response = Self::ensure_success(response).await?;

        let body: serde_json::Value = response.json().await?;
        let results = body["results"].as_array().ok_or_else(|| {
            AppError::ExternalApi("Invalid TMDB discover response format".to_string())
        })?;

        // Entries that fail to parse are skipped rather than failing the page
        let movies: Vec<MovieResult> = results
            .iter()
            .filter_map(|result| {
                serde_json::from_value::<ApiMovie>(result.clone())
                    .map(MovieResult::from)
                    .ok()
            })
            .collect();

        tracing::info!(
            page = query.page,
            genres = ?query.genre_ids,
            keywords = ?query.keyword_ids,
            results = movies.len(),
            provider = "tmdb",
            "Discovery page fetched"
        );

        Ok(movies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> TmdbProvider {
        TmdbProvider::new("test_key".to_string(), server.uri())
    }

    fn query(genre_ids: Vec<i32>, keyword_ids: Vec<u64>) -> DiscoveryQuery {
        DiscoveryQuery {
            genre_ids,
            keyword_ids,
            language: "en".to_string(),
            page: 2,
        }
    }

    #[tokio::test]
    async fn test_search_keywords_returns_ids_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/keyword"))
            .and(query_param("api_key", "test_key"))
            .and(query_param("query", "erotic"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "page": 1,
                "results": [
                    {"id": 256466, "name": "erotic"},
                    {"id": 9840, "name": "erotic movie"}
                ]
            })))
            .mount(&server)
            .await;

        let ids = provider(&server).search_keywords("erotic").await.unwrap();
        assert_eq!(ids, vec![256466, 9840]);
    }

    #[tokio::test]
    async fn test_search_keywords_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/keyword"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Invalid API key"))
            .mount(&server)
            .await;

        let result = provider(&server).search_keywords("heist").await;
        assert!(matches!(result, Err(AppError::ExternalApi(_))));
    }

    #[tokio::test]
    async fn test_discover_sends_filters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/discover/movie"))
            .and(query_param("api_key", "test_key"))
            .and(query_param("with_genres", "28,12"))
            .and(query_param("with_keywords", "9840"))
            .and(query_param("sort_by", "popularity.desc"))
            .and(query_param("include_adult", "true"))
            .and(query_param("include_video", "false"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "page": 2,
                "results": [
                    {"id": 1, "title": "Mad Max: Fury Road", "overview": "Chase.", "release_date": "2015-05-13", "poster_path": "/a.jpg"},
                    {"id": 2, "title": "Dune", "overview": "Spice.", "release_date": "2021-09-15", "poster_path": null}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let movies = provider(&server)
            .discover(&query(vec![28, 12], vec![9840]))
            .await
            .unwrap();

        assert_eq!(movies.len(), 2);
        assert_eq!(movies[0].title, "Mad Max: Fury Road");
        assert_eq!(movies[1].poster_path, None);
    }

    #[tokio::test]
    async fn test_discover_skips_malformed_entries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/discover/movie"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [
                    {"title": "Heat"},
                    {"title": 42},
                    "garbage"
                ]
            })))
            .mount(&server)
            .await;

        let movies = provider(&server).discover(&query(vec![], vec![])).await.unwrap();
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].title, "Heat");
    }

    #[tokio::test]
    async fn test_discover_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/discover/movie"))
            .respond_with(ResponseTemplate::new(422).set_body_string("page must be less than or equal to 500"))
            .mount(&server)
            .await;

        let result = provider(&server).discover(&query(vec![18], vec![])).await;
        assert!(matches!(result, Err(AppError::ExternalApi(_))));
    }
}
