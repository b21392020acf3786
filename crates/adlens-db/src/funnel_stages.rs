//! Database operations for the `funnel_stages` table.
//!
//! Holds each ad account's configured stage order. Accounts without rows fall
//! back to [`adlens_core::DEFAULT_FUNNEL_STAGES`] at the call site.

use sqlx::PgPool;

use crate::DbError;

/// A row from the `funnel_stages` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FunnelStageRow {
    pub id: i64,
    pub ad_account: String,
    pub position: i32,
    pub stage: String,
}

/// Returns the account's configured stage names in position order.
///
/// An empty result means the account has no configuration; callers decide
/// the fallback.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_stages_for_account(
    pool: &PgPool,
    ad_account: &str,
) -> Result<Vec<String>, DbError> {
    let rows = sqlx::query_as::<_, FunnelStageRow>(
        "SELECT id, ad_account, position, stage \
         FROM funnel_stages \
         WHERE ad_account = $1 \
         ORDER BY position",
    )
    .bind(ad_account)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.stage).collect())
}

/// Replaces the account's configured stage order.
///
/// # Errors
///
/// Returns [`DbError`] on database query failure.
pub async fn replace_stages_for_account(
    pool: &PgPool,
    ad_account: &str,
    stages: &[String],
) -> Result<(), DbError> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM funnel_stages WHERE ad_account = $1")
        .bind(ad_account)
        .execute(&mut *tx)
        .await?;

    for (position, stage) in stages.iter().enumerate() {
        sqlx::query(
            "INSERT INTO funnel_stages (ad_account, position, stage) \
             VALUES ($1, $2, $3)",
        )
        .bind(ad_account)
        .bind(i32::try_from(position).unwrap_or(i32::MAX))
        .bind(stage)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}
