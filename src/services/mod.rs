pub mod dialog;
pub mod formatting;
pub mod keywords;
pub mod providers;
pub mod recommendations;

pub use dialog::{DialogOutcome, PreferenceDialog};
pub use keywords::KeywordResolver;
pub use providers::{tmdb::TmdbProvider, CatalogProvider};
pub use recommendations::RecommendationEngine;
