use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, Pool, Postgres};
use uuid::Uuid;

use crate::domain::{SavedSearch, SearchFilters};
use crate::infrastructure::repositories::SavedSearchRepository;
use crate::utils::error::Result;

const SAVED_SEARCH_COLUMNS: &str =
    "id, user_id, name, filters, alerts_enabled, created_at, updated_at";

#[derive(Debug, FromRow)]
struct SavedSearchRow {
    id: Uuid,
    user_id: Uuid,
    name: String,
    filters: Json<SearchFilters>,
    alerts_enabled: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<SavedSearchRow> for SavedSearch {
    fn from(row: SavedSearchRow) -> Self {
        SavedSearch {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            filters: row.filters.0,
            alerts_enabled: row.alerts_enabled,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Recherches sauvegardées, filtres stockés en JSONB
#[derive(Clone)]
pub struct PgSavedSearchRepository {
    pool: Pool<Postgres>,
}

impl PgSavedSearchRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SavedSearchRepository for PgSavedSearchRepository {
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<SavedSearch>> {
        let rows = sqlx::query_as::<_, SavedSearchRow>(&format!(
            "SELECT {SAVED_SEARCH_COLUMNS} FROM saved_searches \
             WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(SavedSearch::from).collect())
    }

    async fn list_alerting(&self) -> Result<Vec<SavedSearch>> {
        let rows = sqlx::query_as::<_, SavedSearchRow>(&format!(
            "SELECT {SAVED_SEARCH_COLUMNS} FROM saved_searches WHERE alerts_enabled"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(SavedSearch::from).collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<SavedSearch>> {
        let row = sqlx::query_as::<_, SavedSearchRow>(&format!(
            "SELECT {SAVED_SEARCH_COLUMNS} FROM saved_searches WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(SavedSearch::from))
    }

    async fn save(&self, search: &SavedSearch) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO saved_searches (id, user_id, name, filters, alerts_enabled, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                filters = EXCLUDED.filters,
                alerts_enabled = EXCLUDED.alerts_enabled,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(search.id)
        .bind(search.user_id)
        .bind(&search.name)
        .bind(Json(&search.filters))
        .bind(search.alerts_enabled)
        .bind(search.created_at)
        .bind(search.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM saved_searches WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
