//! Creative-pillar tally for an ad account.

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use adlens_insights::{tally_pillars, PillarShare};

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

pub(super) async fn get_pillar_tally(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(account): Path<String>,
) -> Result<Json<ApiResponse<Vec<PillarShare>>>, ApiError> {
    let ads = adlens_db::list_ads_for_account(&state.pool, &account)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let pillar_values: Vec<Option<String>> =
        ads.into_iter().map(|row| row.creative_pillars).collect();
    let data = tally_pillars(&pillar_values);

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
