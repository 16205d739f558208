use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{GenreId, ADULT_GENRE_ID, ADULT_KEYWORD};

/// Opaque identifier of a chat user
pub type UserId = i64;

/// Stored genre selection for one user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserPreference {
    pub user_id: UserId,
    /// Selected genres, in the order they were picked
    pub favorite_genres: Vec<GenreId>,
    pub preferred_language: String,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Fields written by an upsert. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreferenceUpdate {
    pub favorite_genres: Option<Vec<GenreId>>,
    pub preferred_language: Option<String>,
}

/// Filters derived from a stored preference for a recommendation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationFilters {
    pub genre_ids: Vec<GenreId>,
    pub keywords: Vec<String>,
}

impl UserPreference {
    /// Creates a record with no genres selected
    pub fn new(user_id: UserId, preferred_language: impl Into<String>) -> Self {
        Self {
            user_id,
            favorite_genres: Vec::new(),
            preferred_language: preferred_language.into(),
            updated_at: None,
        }
    }

    /// Applies the fields of an upsert to this record
    pub fn apply(&mut self, update: PreferenceUpdate) {
        if let Some(genres) = update.favorite_genres {
            self.favorite_genres = genres;
        }
        if let Some(language) = update.preferred_language {
            self.preferred_language = language;
        }
        self.updated_at = Some(Utc::now());
    }

    /// Genre and keyword filters for this user
    ///
    /// The adult genre is swapped for its keyword and never used as a genre filter.
    pub fn recommendation_filters(&self) -> RecommendationFilters {
        let has_adult = self.favorite_genres.contains(&ADULT_GENRE_ID);

        RecommendationFilters {
            genre_ids: self
                .favorite_genres
                .iter()
                .copied()
                .filter(|id| *id != ADULT_GENRE_ID)
                .collect(),
            keywords: if has_adult {
                vec![ADULT_KEYWORD.to_string()]
            } else {
                Vec::new()
            },
        }
    }
}

/// Flips membership of `genre_id` in the working set
///
/// Returns `true` when the genre was added and `false` when it was removed.
pub fn toggle_genre(working_set: &mut Vec<GenreId>, genre_id: GenreId) -> bool {
    if let Some(pos) = working_set.iter().position(|id| *id == genre_id) {
        working_set.remove(pos);
        false
    } else {
        working_set.push(genre_id);
        true
    }
}
