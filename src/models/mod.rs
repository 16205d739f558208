pub mod genre;
pub mod movie;
pub mod user_preferences;

pub use genre::{Genre, GenreCatalog, GenreId, ADULT_GENRE_ID, ADULT_KEYWORD, GENRES};
pub use movie::{
    ApiKeyword, ApiMovie, DiscoveryQuery, KeywordId, KeywordSearchResponse, MovieResult,
};
pub use user_preferences::{
    toggle_genre, PreferenceUpdate, RecommendationFilters, UserId, UserPreference,
};
