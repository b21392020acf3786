//! Database operations for the `facebook_custom_audiences` table.

use sqlx::PgPool;

use crate::DbError;

/// A row from the `facebook_custom_audiences` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CustomAudienceRow {
    pub id: i64,
    pub ad_account: String,
    pub audience_id: String,
    pub name: String,
    pub description: Option<String>,
}

/// Returns all stored custom audiences for an ad account, ordered by name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_audiences_for_account(
    pool: &PgPool,
    ad_account: &str,
) -> Result<Vec<CustomAudienceRow>, DbError> {
    let rows = sqlx::query_as::<_, CustomAudienceRow>(
        "SELECT id, ad_account, audience_id, name, description \
         FROM facebook_custom_audiences \
         WHERE ad_account = $1 \
         ORDER BY name",
    )
    .bind(ad_account)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
