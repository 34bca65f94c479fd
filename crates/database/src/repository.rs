use crate::store::AnalysisStore;
use crate::DbError;
use analytics::AssetAnalysis;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value as JsonValue;
use sqlx::postgres::{PgPool, Postgres};
use sqlx::{FromRow, Transaction};
use uuid::Uuid;

/// Upper bound on rows returned by a single history query.
pub const MAX_HISTORY_LIMIT: i64 = 500;

/// The `DbRepository` provides a high-level, application-specific interface
/// to the database. It encapsulates all SQL queries and data access logic.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: PgPool,
}

/// A row from the `asset_analyses` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StoredAnalysis {
    pub analysis_id: Uuid,
    pub user_id: String,
    pub symbol: String,
    pub asof: DateTime<Utc>,
    pub payload: JsonValue,
    pub created_at: DateTime<Utc>,
}

impl StoredAnalysis {
    /// Decodes the stored payload. `null` metrics come back as `NaN`.
    pub fn analysis(&self) -> Result<AssetAnalysis, DbError> {
        Ok(serde_json::from_value(self.payload.clone())?)
    }
}

impl DbRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the user or refreshes their email.
    ///
    /// A `None` email never overwrites a previously stored one.
    pub async fn upsert_user(&self, uid: &str, email: Option<&str>) -> Result<(), DbError> {
        let uid = require_user_id(uid)?;
        sqlx::query(
            r#"
            INSERT INTO users (uid, email)
            VALUES ($1, $2)
            ON CONFLICT (uid) DO UPDATE
            SET email = COALESCE(EXCLUDED.email, users.email),
                updated_at = NOW()
            "#,
        )
        .bind(uid)
        .bind(email)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Archives one analysis and returns its new id.
    ///
    /// The user row is created on the fly if it does not exist yet, inside
    /// the same transaction as the analysis insert.
    pub async fn save_analysis(
        &self,
        user_id: &str,
        analysis: &AssetAnalysis,
    ) -> Result<Uuid, DbError> {
        let user_id = require_user_id(user_id)?;
        let payload = serde_json::to_value(analysis)?;
        let analysis_id = Uuid::new_v4();

        let mut tx: Transaction<Postgres> = self.pool.begin().await?;

        sqlx::query("INSERT INTO users (uid) VALUES ($1) ON CONFLICT (uid) DO NOTHING")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO asset_analyses (analysis_id, user_id, symbol, asof, payload)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(analysis_id)
        .bind(user_id)
        .bind(&analysis.asset.symbol)
        .bind(analysis.asof)
        .bind(&payload)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!(%analysis_id, %user_id, symbol = %analysis.asset.symbol, "Analysis archived.");
        Ok(analysis_id)
    }

    /// Lists a user's saved analyses, newest `asof` first, optionally for one symbol.
    pub async fn list_analyses(
        &self,
        user_id: &str,
        symbol: Option<&str>,
        limit: i64,
    ) -> Result<Vec<StoredAnalysis>, DbError> {
        let user_id = require_user_id(user_id)?;
        let limit = clamp_limit(limit)?;

        let rows = sqlx::query_as::<_, StoredAnalysis>(
            r#"
            SELECT analysis_id, user_id, symbol, asof, payload, created_at
            FROM asset_analyses
            WHERE user_id = $1 AND ($2::TEXT IS NULL OR symbol = $2)
            ORDER BY asof DESC, created_at DESC
            LIMIT $3
            "#,
        )
        .bind(user_id)
        .bind(symbol)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

#[async_trait]
impl AnalysisStore for DbRepository {
    async fn save_analysis(&self, user_id: &str, analysis: &AssetAnalysis) -> Result<Uuid, DbError> {
        DbRepository::save_analysis(self, user_id, analysis).await
    }
}

fn require_user_id(user_id: &str) -> Result<&str, DbError> {
    let trimmed = user_id.trim();
    if trimmed.is_empty() {
        return Err(DbError::InvalidArgument("user id must not be empty".to_string()));
    }
    Ok(trimmed)
}

fn clamp_limit(limit: i64) -> Result<i64, DbError> {
    if limit <= 0 {
        return Err(DbError::InvalidArgument(format!(
            "limit must be positive, got {}",
            limit
        )));
    }
    Ok(limit.min(MAX_HISTORY_LIMIT))
}
