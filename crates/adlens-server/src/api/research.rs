//! Research execution for an analysis run.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use adlens_core::CompetitorProfile;
use adlens_insights::{ResearchOutcome, ResearchRequest, Researcher};

use crate::middleware::RequestId;

use super::runs::resolve_run;
use super::{map_db_error, require_gemini, ApiError, ApiResponse, AppState, ResponseMeta};

// ---------------------------------------------------------------------------
// Request/response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(super) struct RunResearchRequest {
    #[serde(default)]
    pub grounded: bool,
}

#[derive(Debug, Serialize)]
pub(super) struct ResearchResponse {
    pub competitors: Vec<CompetitorProfile>,
    pub grounding: Vec<GroundingItem>,
}

#[derive(Debug, Serialize)]
pub(super) struct GroundingItem {
    pub competitor: String,
    /// Absent when the competitor's grounding call failed; partial results
    /// are expected, not an error.
    pub summary: Option<String>,
    pub citations: Vec<Value>,
}

// ---------------------------------------------------------------------------
// Handler
// ---------------------------------------------------------------------------

pub(super) async fn run_research(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(run_id): Path<Uuid>,
    Json(body): Json<RunResearchRequest>,
) -> Result<Json<ApiResponse<ResearchResponse>>, ApiError> {
    let run = resolve_run(&state, &req_id.0, run_id).await?;
    let gemini = require_gemini(&state, &req_id.0)?;

    let researcher = Researcher::new(&gemini, state.research_max_concurrent);
    let request = ResearchRequest {
        client_name: run.client_name,
        product_focus: run.product_focus,
        market: run.market,
        grounded: body.grounded,
    };

    let outcome = researcher.run(&request).await.map_err(|e| {
        tracing::error!(error = %e, run_id = %run_id, "research pass failed");
        ApiError::new(
            req_id.0.clone(),
            "upstream_error",
            format!("research generation failed: {e}"),
        )
    })?;

    let report = match outcome {
        ResearchOutcome::Report(report) => report,
        ResearchOutcome::ParseFailure(failure) => {
            tracing::warn!(
                run_id = %run_id,
                raw = %failure.raw,
                "research response was not decodable"
            );
            return Err(ApiError::new(
                req_id.0.clone(),
                "upstream_invalid",
                format!("research response could not be parsed: {}", failure.reason),
            ));
        }
    };

    adlens_db::replace_competitors(&state.pool, run_id, &report.competitors)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    // Grounding entries follow competitor order; the map itself is unordered.
    // Ungrounded runs return an empty list rather than all-None entries.
    let mut grounding = Vec::new();
    if body.grounded {
        let mut insights = report.grounding;
        for competitor in &report.competitors {
            let insight = insights.remove(&competitor.name).flatten();
            let (summary, citations) = match insight {
                Some(i) => (Some(i.summary), i.citations),
                None => (None, Vec::new()),
            };
            grounding.push(GroundingItem {
                competitor: competitor.name.clone(),
                summary,
                citations,
            });
        }
    }

    Ok(Json(ApiResponse {
        data: ResearchResponse {
            competitors: report.competitors,
            grounding,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
