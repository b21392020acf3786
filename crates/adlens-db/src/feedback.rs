//! Database operations for the `idea_feedback` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `idea_feedback` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FeedbackRow {
    pub id: i64,
    pub client_name: String,
    pub idea: String,
    pub verdict: String,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Inserts a feedback entry and returns the created row.
///
/// `verdict` must already be validated to `up` or `down`; the table carries a
/// CHECK constraint as a backstop.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_feedback(
    pool: &PgPool,
    client_name: &str,
    idea: &str,
    verdict: &str,
    comment: Option<&str>,
) -> Result<FeedbackRow, DbError> {
    let row = sqlx::query_as::<_, FeedbackRow>(
        "INSERT INTO idea_feedback (client_name, idea, verdict, comment) \
         VALUES ($1, $2, $3, $4) \
         RETURNING id, client_name, idea, verdict, comment, created_at",
    )
    .bind(client_name)
    .bind(idea)
    .bind(verdict)
    .bind(comment)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Returns all feedback for a client, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_feedback_for_client(
    pool: &PgPool,
    client_name: &str,
) -> Result<Vec<FeedbackRow>, DbError> {
    let rows = sqlx::query_as::<_, FeedbackRow>(
        "SELECT id, client_name, idea, verdict, comment, created_at \
         FROM idea_feedback \
         WHERE lower(btrim(client_name)) = lower(btrim($1)) \
         ORDER BY created_at DESC",
    )
    .bind(client_name)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
