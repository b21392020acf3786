//! Funnel views: stage-grouped aggregates and mapping replacement.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use adlens_core::DEFAULT_FUNNEL_STAGES;
use adlens_db::NewFunnelMapping;
use adlens_insights::{group_by_stage, StageGroup};

use crate::middleware::RequestId;

use super::adsets::load_aggregates;
use super::runs::validate_non_empty;
use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

// ---------------------------------------------------------------------------
// Request/response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(super) struct SaveMappingsRequest {
    pub mappings: Vec<MappingEntry>,
}

#[derive(Debug, Deserialize)]
pub(super) struct MappingEntry {
    pub ad_set_id: String,
    #[serde(default)]
    pub ad_set_name: String,
    pub stages: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct SaveMappingsResponse {
    pub saved: usize,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

pub(super) async fn get_funnel(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(account): Path<String>,
) -> Result<Json<ApiResponse<Vec<StageGroup>>>, ApiError> {
    let aggregates = load_aggregates(&state, &req_id.0, &account).await?;

    let mut stages = adlens_db::list_stages_for_account(&state.pool, &account)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    if stages.is_empty() {
        stages = DEFAULT_FUNNEL_STAGES
            .iter()
            .map(|s| (*s).to_owned())
            .collect();
    }

    let data = group_by_stage(&aggregates, &stages);

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn save_funnel_mappings(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(account): Path<String>,
    Json(body): Json<SaveMappingsRequest>,
) -> Result<Json<ApiResponse<SaveMappingsResponse>>, ApiError> {
    // Flatten to one row per (ad set, stage); an ad set with several stages
    // yields several rows.
    let mut rows: Vec<NewFunnelMapping> = Vec::new();
    for entry in &body.mappings {
        validate_non_empty(&req_id.0, "ad_set_id", &entry.ad_set_id)?;
        for stage in &entry.stages {
            validate_non_empty(&req_id.0, "stages", stage)?;
            rows.push(NewFunnelMapping {
                ad_set_id: entry.ad_set_id.clone(),
                ad_set_name: entry.ad_set_name.clone(),
                funnel_stage: stage.clone(),
            });
        }
    }

    let saved = adlens_db::replace_mappings_for_account(&state.pool, &account, &rows)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: SaveMappingsResponse { saved },
        meta: ResponseMeta::new(req_id.0),
    }))
}
