//! Database operations for the `analysis_runs` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use adlens_core::lookup::{normalize_client_name, normalize_product_focus};

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `analysis_runs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AnalysisRunRow {
    pub id: Uuid,
    pub client_name: String,
    pub product_focus: String,
    pub market: String,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Inserts a new analysis run and returns the created row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_analysis_run(
    pool: &PgPool,
    client_name: &str,
    product_focus: &str,
    market: &str,
) -> Result<AnalysisRunRow, DbError> {
    let row = sqlx::query_as::<_, AnalysisRunRow>(
        "INSERT INTO analysis_runs (client_name, product_focus, market) \
         VALUES ($1, $2, $3) \
         RETURNING id, client_name, product_focus, market, created_at",
    )
    .bind(client_name.trim())
    .bind(product_focus.trim())
    .bind(market.trim())
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Returns the most recent run matching the client/product pair, or `None`.
///
/// Matching is exact after normalization on both sides: values are trimmed
/// and case-folded, and trailing commas on the product focus are ignored
/// (legacy data entry appended one to some stored rows).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_analysis_run(
    pool: &PgPool,
    client_name: &str,
    product_focus: &str,
) -> Result<Option<AnalysisRunRow>, DbError> {
    let row = sqlx::query_as::<_, AnalysisRunRow>(
        "SELECT id, client_name, product_focus, market, created_at \
         FROM analysis_runs \
         WHERE lower(btrim(client_name)) = $1 \
           AND rtrim(lower(btrim(product_focus)), ', ') = $2 \
         ORDER BY created_at DESC \
         LIMIT 1",
    )
    .bind(normalize_client_name(client_name))
    .bind(normalize_product_focus(product_focus))
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns the most recent run for a client regardless of product focus.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn latest_run_for_client(
    pool: &PgPool,
    client_name: &str,
) -> Result<Option<AnalysisRunRow>, DbError> {
    let row = sqlx::query_as::<_, AnalysisRunRow>(
        "SELECT id, client_name, product_focus, market, created_at \
         FROM analysis_runs \
         WHERE lower(btrim(client_name)) = $1 \
         ORDER BY created_at DESC \
         LIMIT 1",
    )
    .bind(normalize_client_name(client_name))
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns a single run by id, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_analysis_run(pool: &PgPool, id: Uuid) -> Result<Option<AnalysisRunRow>, DbError> {
    let row = sqlx::query_as::<_, AnalysisRunRow>(
        "SELECT id, client_name, product_focus, market, created_at \
         FROM analysis_runs \
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}
