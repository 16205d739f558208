//! Durable per-user genre preferences
//!
//! Records are keyed by user id and only ever written through `upsert`:
//! the first write creates the record, later writes replace the given fields.
//! There is no locking; the last writer for a user wins.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tokio::sync::RwLock;

use crate::{
    error::AppResult,
    models::{GenreId, PreferenceUpdate, UserId, UserPreference},
};

#[async_trait::async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Returns the stored record, or `None` when the user never saved preferences
    async fn find_one(&self, user_id: UserId) -> AppResult<Option<UserPreference>>;

    /// Creates or updates the record for `user_id`
    async fn upsert(&self, user_id: UserId, update: PreferenceUpdate) -> AppResult<()>;
}

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgPreferenceStore {
    pool: PgPool,
    default_language: String,
}

impl PgPreferenceStore {
    pub fn new(pool: PgPool, default_language: String) -> Self {
        Self {
            pool,
            default_language,
        }
    }
}

type PreferenceRow = (i64, Vec<i32>, String, DateTime<Utc>);

#[async_trait::async_trait]
impl PreferenceStore for PgPreferenceStore {
    async fn find_one(&self, user_id: UserId) -> AppResult<Option<UserPreference>> {
        let row: Option<PreferenceRow> = sqlx::query_as(
            r#"
            SELECT user_id, favorite_genres, preferred_language, updated_at
            FROM user_preferences
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(
            |(user_id, favorite_genres, preferred_language, updated_at)| UserPreference {
                user_id,
                favorite_genres,
                preferred_language,
                updated_at: Some(updated_at),
            },
        ))
    }

    async fn upsert(&self, user_id: UserId, update: PreferenceUpdate) -> AppResult<()> {
        let genres: Option<Vec<GenreId>> = update.favorite_genres;

        sqlx::query(
            r#"
            INSERT INTO user_preferences (user_id, favorite_genres, preferred_language, updated_at)
            VALUES ($1, COALESCE($2, '{}'::INTEGER[]), COALESCE($3, $4), NOW())
            ON CONFLICT (user_id) DO UPDATE SET
                favorite_genres = COALESCE($2, user_preferences.favorite_genres),
                preferred_language = COALESCE($3, user_preferences.preferred_language),
                updated_at = NOW()
            "#,
        )
        .bind(user_id)
        .bind(genres)
        .bind(update.preferred_language)
        .bind(&self.default_language)
        .execute(&self.pool)
        .await?;

        tracing::debug!(user_id, "Preferences upserted");
        Ok(())
    }
}

/// Process-local store; contents are lost on restart
pub struct InMemoryPreferenceStore {
    records: RwLock<HashMap<UserId, UserPreference>>,
    default_language: String,
}

impl Default for InMemoryPreferenceStore {
    fn default() -> Self {
        Self::new("en")
    }
}

impl InMemoryPreferenceStore {
    pub fn new(default_language: impl Into<String>) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            default_language: default_language.into(),
        }
    }
}

#[async_trait::async_trait]
impl PreferenceStore for InMemoryPreferenceStore {
    async fn find_one(&self, user_id: UserId) -> AppResult<Option<UserPreference>> {
        Ok(self.records.read().await.get(&user_id).cloned())
    }

    async fn upsert(&self, user_id: UserId, update: PreferenceUpdate) -> AppResult<()> {
        let mut records = self.records.write().await;
        records
            .entry(user_id)
            .or_insert_with(|| UserPreference::new(user_id, self.default_language.clone()))
            .apply(update);
        Ok(())
    }
}
