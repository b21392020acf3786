//! Stored custom-audience listing for an ad account.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct AudienceItem {
    pub audience_id: String,
    pub name: String,
    pub description: Option<String>,
}

pub(super) async fn list_audiences(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(account): Path<String>,
) -> Result<Json<ApiResponse<Vec<AudienceItem>>>, ApiError> {
    let rows = adlens_db::list_audiences_for_account(&state.pool, &account)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| AudienceItem {
            audience_id: row.audience_id,
            name: row.name,
            description: row.description,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
