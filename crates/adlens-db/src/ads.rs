//! Database operations for the `ads_details` table.
//!
//! One row per exported Facebook ad. Metric columns are stored as text
//! because the upstream export is loosely typed; parsing to numbers happens
//! in the aggregation layer, never here.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `ads_details` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AdDetailRow {
    pub id: i64,
    pub ad_account: String,
    pub ad_id: String,
    pub ad_name: String,
    pub ad_set_id: String,
    pub ad_set_name: String,
    pub impressions: String,
    pub reach: String,
    pub spend: String,
    pub clicks: String,
    pub frequency: String,
    pub roas: String,
    pub ctr: String,
    pub cpc: String,
    pub thumbnail_url: Option<String>,
    pub creative_pillars: Option<String>,
    pub audience: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns all ad rows for an ad account, in insertion order.
///
/// Insertion order matters downstream: ad-set aggregation preserves the
/// first-seen order of each `ad_set_id`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_ads_for_account(
    pool: &PgPool,
    ad_account: &str,
) -> Result<Vec<AdDetailRow>, DbError> {
    let rows = sqlx::query_as::<_, AdDetailRow>(
        "SELECT id, ad_account, ad_id, ad_name, ad_set_id, ad_set_name, impressions, reach, \
                spend, clicks, frequency, roas, ctr, cpc, thumbnail_url, creative_pillars, \
                audience, created_at \
         FROM ads_details \
         WHERE ad_account = $1 \
         ORDER BY id",
    )
    .bind(ad_account)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
