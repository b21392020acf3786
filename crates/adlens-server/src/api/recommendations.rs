//! AI-assisted recommendation generation and retrieval.
//!
//! Generation prefers stored research: the latest run's competitors feed the
//! prompt. With no stored competitors the handler falls back to one direct
//! ungrounded call. An upstream or parse failure still answers 200 with a
//! same-shape placeholder payload so the dashboard always has something to
//! render.

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use adlens_core::CompetitorProfile;
use adlens_gemini::{sanitize, GenerateOptions};

use crate::middleware::RequestId;

use super::runs::validate_non_empty;
use super::{map_db_error, require_gemini, ApiError, ApiResponse, AppState, ResponseMeta};

const NO_DATA: &str = "No data available";

// ---------------------------------------------------------------------------
// Request/response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(super) struct CreateRecommendationsRequest {
    pub client_name: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct LatestRecommendationsQuery {
    pub client: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RecommendationPayload {
    pub summary: String,
    pub recommendations: Vec<String>,
    pub ad_ideas: Vec<AdIdea>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AdIdea {
    pub headline: String,
    pub primary_text: String,
    pub pillar: String,
}

impl RecommendationPayload {
    /// Same-shape fallback so the dashboard never receives a shape it
    /// cannot render.
    fn placeholder() -> Self {
        Self {
            summary: NO_DATA.to_owned(),
            recommendations: vec![NO_DATA.to_owned()],
            ad_ideas: Vec::new(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct RecommendationsResponse {
    pub client_name: String,
    pub payload: RecommendationPayload,
    /// True when the payload is the placeholder produced after an upstream
    /// or parse failure.
    pub degraded: bool,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

pub(super) async fn create_recommendations(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateRecommendationsRequest>,
) -> Result<Json<ApiResponse<RecommendationsResponse>>, ApiError> {
    validate_non_empty(&req_id.0, "client_name", &body.client_name)?;
    let gemini = require_gemini(&state, &req_id.0)?;

    // Prefer stored research for the prompt; fall back to a direct call.
    let competitors = load_stored_competitors(&state, &req_id.0, &body.client_name).await?;
    let prompt = if competitors.is_empty() {
        tracing::info!(
            client = %body.client_name,
            "no stored competitors; using ungrounded direct prompt"
        );
        direct_prompt(&body.client_name)
    } else {
        grounded_in_research_prompt(&body.client_name, &competitors)
    };

    let options = GenerateOptions {
        temperature: Some(0.4),
        ..GenerateOptions::default()
    };

    let (payload, degraded) = match gemini.generate(&prompt, &options).await {
        Ok(generation) => {
            let cleaned = sanitize(&generation.text);
            match serde_json::from_str::<RecommendationPayload>(&cleaned) {
                Ok(payload) => (payload, false),
                Err(e) => {
                    tracing::warn!(error = %e, "recommendation payload did not decode; degrading");
                    (RecommendationPayload::placeholder(), true)
                }
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "recommendation generation failed; degrading");
            (RecommendationPayload::placeholder(), true)
        }
    };

    if !degraded {
        let value = serde_json::to_value(&payload).unwrap_or_default();
        adlens_db::insert_analysis(&state.pool, &body.client_name, &value)
            .await
            .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    }

    Ok(Json(ApiResponse {
        data: RecommendationsResponse {
            client_name: body.client_name,
            payload,
            degraded,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn latest_recommendations(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<LatestRecommendationsQuery>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    validate_non_empty(&req_id.0, "client", &query.client)?;

    let row = adlens_db::latest_analysis_for_client(&state.pool, &query.client)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| {
            ApiError::new(
                req_id.0.clone(),
                "not_found",
                format!("no stored recommendations for client '{}'", query.client),
            )
        })?;

    Ok(Json(ApiResponse {
        data: row.analysis,
        meta: ResponseMeta::new(req_id.0),
    }))
}

// ---------------------------------------------------------------------------
// Prompt assembly
// ---------------------------------------------------------------------------

async fn load_stored_competitors(
    state: &AppState,
    req_id: &str,
    client_name: &str,
) -> Result<Vec<CompetitorProfile>, ApiError> {
    let Some(run) = adlens_db::latest_run_for_client(&state.pool, client_name)
        .await
        .map_err(|e| map_db_error(req_id.to_owned(), &e))?
    else {
        return Ok(Vec::new());
    };

    let rows = adlens_db::list_competitors(&state.pool, run.id)
        .await
        .map_err(|e| map_db_error(req_id.to_owned(), &e))?;

    Ok(rows
        .into_iter()
        .map(adlens_db::CompetitorRow::into_profile)
        .collect())
}

fn payload_contract() -> &'static str {
    "Respond with JSON only: {\"summary\": string, \"recommendations\": [string], \
     \"adIdeas\": [{\"headline\": string, \"primaryText\": string, \"pillar\": string}]}."
}

fn direct_prompt(client_name: &str) -> String {
    format!(
        "You are a marketing strategist. Propose a competitor-aware marketing plan for \
         \"{client_name}\". No competitor research is stored, so rely on general best \
         practice for the category. {contract}",
        contract = payload_contract(),
    )
}

fn grounded_in_research_prompt(client_name: &str, competitors: &[CompetitorProfile]) -> String {
    let mut briefing = String::new();
    for competitor in competitors {
        briefing.push_str(&format!(
            "- {name}: strengths {strengths:?}; weaknesses {weaknesses:?}; usp {usp}\n",
            name = competitor.name,
            strengths = competitor.strengths,
            weaknesses = competitor.weaknesses,
            usp = competitor.usp,
        ));
    }

    format!(
        "You are a marketing strategist for \"{client_name}\". Based on this competitor \
         research:\n{briefing}\nRecommend positioning moves and ad creative ideas that \
         exploit competitor weaknesses. {contract}",
        contract = payload_contract(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_matches_success_shape() {
        let placeholder = RecommendationPayload::placeholder();
        let value = serde_json::to_value(&placeholder).expect("should serialize");

        assert_eq!(value["summary"], "No data available");
        assert!(value["recommendations"].is_array());
        assert!(value["adIdeas"].is_array());
    }

    #[test]
    fn payload_round_trips_camel_case() {
        let json = r#"{
            "summary": "Lean into onboarding speed.",
            "recommendations": ["Undercut Northwind's pricing tier"],
            "adIdeas": [
                {"headline": "Set up in 5 minutes", "primaryText": "No consultants needed.", "pillar": "Educational"}
            ]
        }"#;
        let payload: RecommendationPayload =
            serde_json::from_str(json).expect("should deserialize");

        assert_eq!(payload.ad_ideas.len(), 1);
        assert_eq!(payload.ad_ideas[0].pillar, "Educational");
    }

    #[test]
    fn research_prompt_includes_each_competitor() {
        let competitors = vec![CompetitorProfile {
            name: "Northwind".to_owned(),
            services: Vec::new(),
            service_tags: Vec::new(),
            pricing: "N/A".to_owned(),
            strengths: vec!["brand recognition".to_owned()],
            weaknesses: vec!["slow support".to_owned()],
            complaints: Vec::new(),
            ad_themes: Vec::new(),
            specialty: "N/A".to_owned(),
            target_audience: "N/A".to_owned(),
            brand_tone: "N/A".to_owned(),
            market_share: "N/A".to_owned(),
            positive_perception: "N/A".to_owned(),
            negative_perception: "N/A".to_owned(),
            usp: "enterprise features".to_owned(),
            seo: adlens_core::SeoProfile::default(),
            website_quality: adlens_core::WebsiteQuality::default(),
            social_metrics: adlens_core::SocialMetrics::default(),
        }];

        let prompt = grounded_in_research_prompt("Acme", &competitors);
        assert!(prompt.contains("Northwind"));
        assert!(prompt.contains("slow support"));
    }
}
