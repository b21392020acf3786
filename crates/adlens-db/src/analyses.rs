//! Database operations for the `competitor_analysis` table.
//!
//! Stores generated recommendation payloads as opaque JSON, newest-first.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;

use crate::DbError;

/// A row from the `competitor_analysis` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AnalysisRow {
    pub id: i64,
    pub client_name: String,
    pub analysis: Value,
    pub created_at: DateTime<Utc>,
}

/// Inserts a recommendation payload for a client and returns the new row id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_analysis(
    pool: &PgPool,
    client_name: &str,
    analysis: &Value,
) -> Result<i64, DbError> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO competitor_analysis (client_name, analysis) \
         VALUES ($1, $2) \
         RETURNING id",
    )
    .bind(client_name)
    .bind(analysis)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Returns the most recent stored payload for a client, or `None`.
///
/// Client matching is case-insensitive on the trimmed name, consistent with
/// analysis-run lookup.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn latest_analysis_for_client(
    pool: &PgPool,
    client_name: &str,
) -> Result<Option<AnalysisRow>, DbError> {
    let row = sqlx::query_as::<_, AnalysisRow>(
        "SELECT id, client_name, analysis, created_at \
         FROM competitor_analysis \
         WHERE lower(btrim(client_name)) = lower(btrim($1)) \
         ORDER BY created_at DESC \
         LIMIT 1",
    )
    .bind(client_name)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}
