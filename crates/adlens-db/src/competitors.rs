//! Database operations for the `competitors` table.
//!
//! Competitor rows are owned by an analysis run and replaced wholesale when a
//! research pass completes; there is no per-row update path.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use adlens_core::{CompetitorProfile, SeoProfile, SocialMetrics, WebsiteQuality};

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `competitors` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CompetitorRow {
    pub id: i64,
    pub analysis_run_id: Uuid,
    pub name: String,
    pub services: Vec<String>,
    pub service_tags: Vec<String>,
    pub pricing: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub complaints: Vec<String>,
    pub ad_themes: Vec<String>,
    pub specialty: String,
    pub target_audience: String,
    pub brand_tone: String,
    pub market_share: String,
    pub positive_perception: String,
    pub negative_perception: String,
    pub usp: String,
    pub seo_domain_authority: i32,
    pub seo_backlinks: i32,
    pub seo_organic_traffic: String,
    pub website_ux_score: i32,
    pub website_loading_speed: String,
    pub website_mobile_responsiveness: String,
    pub social_followers: i32,
    pub created_at: DateTime<Utc>,
}

impl CompetitorRow {
    /// Reassembles the canonical profile shape from flat columns.
    #[must_use]
    pub fn into_profile(self) -> CompetitorProfile {
        CompetitorProfile {
            name: self.name,
            services: self.services,
            service_tags: self.service_tags,
            pricing: self.pricing,
            strengths: self.strengths,
            weaknesses: self.weaknesses,
            complaints: self.complaints,
            ad_themes: self.ad_themes,
            specialty: self.specialty,
            target_audience: self.target_audience,
            brand_tone: self.brand_tone,
            market_share: self.market_share,
            positive_perception: self.positive_perception,
            negative_perception: self.negative_perception,
            usp: self.usp,
            seo: SeoProfile {
                domain_authority: self.seo_domain_authority,
                backlinks: self.seo_backlinks,
                organic_traffic: self.seo_organic_traffic,
            },
            website_quality: WebsiteQuality {
                ux_score: self.website_ux_score,
                loading_speed: self.website_loading_speed,
                mobile_responsiveness: self.website_mobile_responsiveness,
            },
            social_metrics: SocialMetrics {
                followers: self.social_followers,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns all competitors for a run, in insertion order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_competitors(
    pool: &PgPool,
    analysis_run_id: Uuid,
) -> Result<Vec<CompetitorRow>, DbError> {
    let rows = sqlx::query_as::<_, CompetitorRow>(
        "SELECT id, analysis_run_id, name, services, service_tags, pricing, strengths, \
                weaknesses, complaints, ad_themes, specialty, target_audience, brand_tone, \
                market_share, positive_perception, negative_perception, usp, \
                seo_domain_authority, seo_backlinks, seo_organic_traffic, \
                website_ux_score, website_loading_speed, website_mobile_responsiveness, \
                social_followers, created_at \
         FROM competitors \
         WHERE analysis_run_id = $1 \
         ORDER BY id",
    )
    .bind(analysis_run_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Replaces all competitors for a run with the supplied profiles.
///
/// Deletes existing rows and inserts the fresh set in one transaction so a
/// concurrent reader never observes a half-written run.
///
/// # Errors
///
/// Returns [`DbError`] on database query failure.
pub async fn replace_competitors(
    pool: &PgPool,
    analysis_run_id: Uuid,
    profiles: &[CompetitorProfile],
) -> Result<(), DbError> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM competitors WHERE analysis_run_id = $1")
        .bind(analysis_run_id)
        .execute(&mut *tx)
        .await?;

    for profile in profiles {
        sqlx::query(
            "INSERT INTO competitors (analysis_run_id, name, services, service_tags, pricing, \
                strengths, weaknesses, complaints, ad_themes, specialty, target_audience, \
                brand_tone, market_share, positive_perception, negative_perception, usp, \
                seo_domain_authority, seo_backlinks, seo_organic_traffic, website_ux_score, \
                website_loading_speed, website_mobile_responsiveness, social_followers) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, \
                $17, $18, $19, $20, $21, $22, $23)",
        )
        .bind(analysis_run_id)
        .bind(&profile.name)
        .bind(&profile.services)
        .bind(&profile.service_tags)
        .bind(&profile.pricing)
        .bind(&profile.strengths)
        .bind(&profile.weaknesses)
        .bind(&profile.complaints)
        .bind(&profile.ad_themes)
        .bind(&profile.specialty)
        .bind(&profile.target_audience)
        .bind(&profile.brand_tone)
        .bind(&profile.market_share)
        .bind(&profile.positive_perception)
        .bind(&profile.negative_perception)
        .bind(&profile.usp)
        .bind(profile.seo.domain_authority)
        .bind(profile.seo.backlinks)
        .bind(&profile.seo.organic_traffic)
        .bind(profile.website_quality.ux_score)
        .bind(&profile.website_quality.loading_speed)
        .bind(&profile.website_quality.mobile_responsiveness)
        .bind(profile.social_metrics.followers)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}
