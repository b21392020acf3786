//! Database operations for the `ad_set_funnel_mappings` table.
//!
//! One row per (ad set, stage) pair — an ad set mapping to multiple stages
//! holds multiple rows. Saves are full replacements per account; there is no
//! incremental update.

use std::collections::HashMap;

use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `ad_set_funnel_mappings` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FunnelMappingRow {
    pub id: i64,
    pub ad_account: String,
    pub ad_set_id: String,
    pub ad_set_name: String,
    pub funnel_stage: String,
}

/// A mapping entry to be written by [`replace_mappings_for_account`].
#[derive(Debug, Clone)]
pub struct NewFunnelMapping {
    pub ad_set_id: String,
    pub ad_set_name: String,
    pub funnel_stage: String,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns all mapping rows for an ad account.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_mappings_for_account(
    pool: &PgPool,
    ad_account: &str,
) -> Result<Vec<FunnelMappingRow>, DbError> {
    let rows = sqlx::query_as::<_, FunnelMappingRow>(
        "SELECT id, ad_account, ad_set_id, ad_set_name, funnel_stage \
         FROM ad_set_funnel_mappings \
         WHERE ad_account = $1 \
         ORDER BY id",
    )
    .bind(ad_account)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns the account's mappings folded into `ad_set_id -> [stage]`.
///
/// Stage order within an ad set follows row insertion order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn stage_map_for_account(
    pool: &PgPool,
    ad_account: &str,
) -> Result<HashMap<String, Vec<String>>, DbError> {
    let rows = list_mappings_for_account(pool, ad_account).await?;

    let mut map: HashMap<String, Vec<String>> = HashMap::new();
    for row in rows {
        map.entry(row.ad_set_id).or_default().push(row.funnel_stage);
    }
    Ok(map)
}

/// Replaces all mappings for an ad account with the supplied entries.
///
/// Deletes every existing row for the account and inserts the fresh set in
/// one transaction. Returns the number of rows written.
///
/// # Errors
///
/// Returns [`DbError`] on database query failure.
pub async fn replace_mappings_for_account(
    pool: &PgPool,
    ad_account: &str,
    mappings: &[NewFunnelMapping],
) -> Result<usize, DbError> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM ad_set_funnel_mappings WHERE ad_account = $1")
        .bind(ad_account)
        .execute(&mut *tx)
        .await?;

    for mapping in mappings {
        sqlx::query(
            "INSERT INTO ad_set_funnel_mappings (ad_account, ad_set_id, ad_set_name, funnel_stage) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(ad_account)
        .bind(&mapping.ad_set_id)
        .bind(&mapping.ad_set_name)
        .bind(&mapping.funnel_stage)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(mappings.len())
}
