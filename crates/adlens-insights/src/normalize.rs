//! Normalization from raw research output to [`adlens_core::CompetitorProfile`].
//!
//! Research responses are loosely typed: any field may arrive as a string,
//! an array, a number, or not at all, in either camelCase or snake_case.
//! Accepted shapes are enumerated per field through [`Flex`]; anything
//! outside them falls back to the field's default rather than being
//! duck-typed through.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use adlens_core::{
    CompetitorProfile, SeoProfile, SocialMetrics, WebsiteQuality, NOT_AVAILABLE,
    UNKNOWN_COMPETITOR,
};

// ---------------------------------------------------------------------------
// Flexible field shapes
// ---------------------------------------------------------------------------

/// A field value whose shape the model does not guarantee.
///
/// `Text` and `List` are the accepted shapes; everything else lands in
/// `Other` and resolves to the target default.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Flex {
    Text(String),
    List(Vec<Value>),
    Other(Value),
}

impl Default for Flex {
    fn default() -> Self {
        Flex::Other(Value::Null)
    }
}

impl Flex {
    /// Coerces to a list: arrays pass through with falsy entries filtered,
    /// non-empty strings wrap as a single element, everything else is empty.
    fn into_list(self) -> Vec<String> {
        match self {
            Flex::List(entries) => entries.into_iter().filter_map(entry_to_string).collect(),
            Flex::Text(s) if !s.trim().is_empty() => vec![s.trim().to_owned()],
            _ => Vec::new(),
        }
    }

    /// Coerces to a scalar: strings pass through, arrays join with `", "`,
    /// everything else resolves to `"N/A"`.
    fn into_text(self) -> String {
        match self {
            Flex::Text(s) if !s.trim().is_empty() => s.trim().to_owned(),
            Flex::List(entries) => {
                let joined = entries
                    .into_iter()
                    .filter_map(entry_to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                if joined.is_empty() {
                    NOT_AVAILABLE.to_owned()
                } else {
                    joined
                }
            }
            _ => NOT_AVAILABLE.to_owned(),
        }
    }

    /// Coerces to an integer: numbers truncate, numeric strings parse,
    /// everything else is zero.
    fn into_int(self) -> i32 {
        match self {
            Flex::Text(s) => parse_int(&s),
            Flex::Other(Value::Number(n)) => {
                n.as_f64().map_or(0, |f| f as i32)
            }
            _ => 0,
        }
    }
}

fn entry_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_owned())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_int(raw: &str) -> i32 {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '-')
        .collect();
    cleaned.parse().unwrap_or(0)
}

/// Deserializes `T`, substituting `T::default()` when the value has an
/// unexpected shape instead of failing the whole record.
fn lenient<'de, T, D>(deserializer: D) -> Result<T, D::Error>
where
    T: for<'a> Deserialize<'a> + Default,
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Raw record
// ---------------------------------------------------------------------------

/// A competitor record as emitted by the research pass, before coercion.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawCompetitor {
    pub name: Flex,
    pub services: Flex,
    #[serde(alias = "serviceTags", alias = "service_categories")]
    pub service_categories: Flex,
    pub pricing: Flex,
    pub strengths: Flex,
    pub weaknesses: Flex,
    pub complaints: Flex,
    #[serde(alias = "ad_themes")]
    pub ad_themes: Flex,
    pub specialty: Flex,
    #[serde(alias = "target_audience")]
    pub target_audience: Flex,
    #[serde(alias = "brand_tone")]
    pub brand_tone: Flex,
    #[serde(alias = "market_share")]
    pub market_share: Flex,
    #[serde(alias = "positive_perception")]
    pub positive_perception: Flex,
    #[serde(alias = "negative_perception")]
    pub negative_perception: Flex,
    pub usp: Flex,
    #[serde(deserialize_with = "lenient")]
    pub seo: RawSeo,
    #[serde(alias = "website_quality", deserialize_with = "lenient")]
    pub website_quality: RawWebsiteQuality,
    #[serde(alias = "social_metrics", deserialize_with = "lenient")]
    pub social_metrics: RawSocialMetrics,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawSeo {
    #[serde(alias = "domain_authority")]
    pub domain_authority: Flex,
    pub backlinks: Flex,
    #[serde(alias = "organic_traffic")]
    pub organic_traffic: Flex,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawWebsiteQuality {
    #[serde(alias = "ux_score")]
    pub ux_score: Flex,
    #[serde(alias = "loading_speed")]
    pub loading_speed: Flex,
    #[serde(alias = "mobile_responsiveness")]
    pub mobile_responsiveness: Flex,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawSocialMetrics {
    pub followers: Flex,
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Coerces one raw record into the canonical profile shape.
#[must_use]
pub fn normalize_competitor(raw: RawCompetitor) -> CompetitorProfile {
    let name = match raw.name {
        Flex::Text(s) if !s.trim().is_empty() => s.trim().to_owned(),
        _ => UNKNOWN_COMPETITOR.to_owned(),
    };

    CompetitorProfile {
        name,
        services: raw.services.into_list(),
        service_tags: normalize_tags(raw.service_categories.into_list()),
        pricing: raw.pricing.into_text(),
        strengths: raw.strengths.into_list(),
        weaknesses: raw.weaknesses.into_list(),
        complaints: raw.complaints.into_list(),
        ad_themes: raw.ad_themes.into_list(),
        specialty: raw.specialty.into_text(),
        target_audience: raw.target_audience.into_text(),
        brand_tone: raw.brand_tone.into_text(),
        market_share: raw.market_share.into_text(),
        positive_perception: raw.positive_perception.into_text(),
        negative_perception: raw.negative_perception.into_text(),
        usp: raw.usp.into_text(),
        seo: SeoProfile {
            domain_authority: raw.seo.domain_authority.into_int(),
            backlinks: raw.seo.backlinks.into_int(),
            organic_traffic: raw.seo.organic_traffic.into_text(),
        },
        website_quality: WebsiteQuality {
            ux_score: raw.website_quality.ux_score.into_int(),
            loading_speed: raw.website_quality.loading_speed.into_text(),
            mobile_responsiveness: raw.website_quality.mobile_responsiveness.into_text(),
        },
        social_metrics: SocialMetrics {
            followers: raw.social_metrics.followers.into_int(),
        },
    }
}

/// Normalizes a batch, dropping records with no usable name.
///
/// A record resolving to the [`UNKNOWN_COMPETITOR`] sentinel means upstream
/// parsing produced no name; such records carry no value downstream.
#[must_use]
pub fn normalize_competitors(raw: Vec<RawCompetitor>) -> Vec<CompetitorProfile> {
    raw.into_iter()
        .map(normalize_competitor)
        .filter(|profile| profile.name != UNKNOWN_COMPETITOR)
        .collect()
}

/// Canonicalizes service-category tags: trim, lowercase, drop empties,
/// dedupe preserving first-seen order.
fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    tags.into_iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_json(json: serde_json::Value) -> RawCompetitor {
        serde_json::from_value(json).expect("raw competitor should deserialize")
    }

    #[test]
    fn string_list_field_wraps_to_single_element() {
        let raw = from_json(serde_json::json!({
            "name": "Acme",
            "services": "CRM consulting"
        }));
        let profile = normalize_competitor(raw);
        assert_eq!(profile.services, vec!["CRM consulting"]);
    }

    #[test]
    fn array_scalar_field_joins_with_commas() {
        let raw = from_json(serde_json::json!({
            "name": "Acme",
            "pricing": ["$49/mo starter", "$99/mo pro"]
        }));
        let profile = normalize_competitor(raw);
        assert_eq!(profile.pricing, "$49/mo starter, $99/mo pro");
    }

    #[test]
    fn absent_fields_fall_back_to_defaults() {
        let raw = from_json(serde_json::json!({ "name": "Acme" }));
        let profile = normalize_competitor(raw);

        assert!(profile.strengths.is_empty());
        assert_eq!(profile.brand_tone, "N/A");
        assert_eq!(profile.seo.domain_authority, 0);
        assert_eq!(profile.seo.organic_traffic, "N/A");
        assert_eq!(profile.social_metrics.followers, 0);
    }

    #[test]
    fn unexpected_shapes_fall_back_rather_than_fail() {
        // seo arrives as prose, followers as an object: both outside the
        // accepted shapes, both resolved to defaults.
        let raw = from_json(serde_json::json!({
            "name": "Acme",
            "services": {"oops": true},
            "seo": "strong presence",
            "socialMetrics": {"followers": {"instagram": 1000}}
        }));
        let profile = normalize_competitor(raw);

        assert!(profile.services.is_empty());
        assert_eq!(profile.seo.domain_authority, 0);
        assert_eq!(profile.social_metrics.followers, 0);
    }

    #[test]
    fn numeric_strings_parse_with_separators() {
        let raw = from_json(serde_json::json!({
            "name": "Acme",
            "seo": { "domainAuthority": "72", "backlinks": "12,400" },
            "socialMetrics": { "followers": 8100 }
        }));
        let profile = normalize_competitor(raw);

        assert_eq!(profile.seo.domain_authority, 72);
        assert_eq!(profile.seo.backlinks, 12_400);
        assert_eq!(profile.social_metrics.followers, 8100);
    }

    #[test]
    fn snake_case_aliases_are_accepted() {
        let raw = from_json(serde_json::json!({
            "name": "Acme",
            "target_audience": "SMB founders",
            "brand_tone": "playful"
        }));
        let profile = normalize_competitor(raw);

        assert_eq!(profile.target_audience, "SMB founders");
        assert_eq!(profile.brand_tone, "playful");
    }

    #[test]
    fn service_tags_are_canonicalized() {
        let raw = from_json(serde_json::json!({
            "name": "Acme",
            "serviceCategories": [" SEO ", "seo", "", "Paid Social"]
        }));
        let profile = normalize_competitor(raw);
        assert_eq!(profile.service_tags, vec!["seo", "paid social"]);
    }

    #[test]
    fn unnamed_records_are_dropped_from_batches() {
        let raw = vec![
            from_json(serde_json::json!({ "name": "Acme" })),
            from_json(serde_json::json!({ "pricing": "$10" })),
            from_json(serde_json::json!({ "name": "Unknown Competitor" })),
            from_json(serde_json::json!({ "name": "   " })),
        ];
        let profiles = normalize_competitors(raw);

        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].name, "Acme");
    }

    #[test]
    fn list_entries_filter_falsy_values() {
        let raw = from_json(serde_json::json!({
            "name": "Acme",
            "strengths": ["fast support", "", null, "wide catalog"]
        }));
        let profile = normalize_competitor(raw);
        assert_eq!(profile.strengths, vec!["fast support", "wide catalog"]);
    }
}
