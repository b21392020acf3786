//! Canonical competitor profile shared by the db, insights and server crates.
//!
//! Field shapes here are the normalized output of research parsing: every
//! list field is a `Vec<String>`, every scalar is a `String` (with
//! [`NOT_AVAILABLE`] standing in for absent data), and nested numeric fields
//! are plain integers defaulting to zero. Serialized as camelCase because the
//! dashboard consumes these records directly.

use serde::{Deserialize, Serialize};

/// Placeholder for scalar fields the research pass could not resolve.
pub const NOT_AVAILABLE: &str = "N/A";

/// Sentinel name produced when parsing could not extract a usable competitor
/// name. Records resolving to this are dropped from processed output.
pub const UNKNOWN_COMPETITOR: &str = "Unknown Competitor";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitorProfile {
    pub name: String,
    pub services: Vec<String>,
    /// Canonical lowercase service-category tags, deduplicated and
    /// independent of the free-text `services` entries.
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
    pub seo: SeoProfile,
    pub website_quality: WebsiteQuality,
    pub social_metrics: SocialMetrics,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoProfile {
    pub domain_authority: i32,
    pub backlinks: i32,
    pub organic_traffic: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebsiteQuality {
    pub ux_score: i32,
    pub loading_speed: String,
    pub mobile_responsiveness: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialMetrics {
    pub followers: i32,
}
