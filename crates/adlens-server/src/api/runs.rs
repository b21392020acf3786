//! Analysis-run handlers: create, lookup, and stored-competitor listing.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use adlens_core::CompetitorProfile;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

// ---------------------------------------------------------------------------
// Request/response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(super) struct CreateRunRequest {
    pub client_name: String,
    pub product_focus: String,
    #[serde(default)]
    pub market: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct FindRunQuery {
    pub client: String,
    pub product: String,
}

#[derive(Debug, Serialize)]
pub(super) struct RunItem {
    pub id: Uuid,
    pub client_name: String,
    pub product_focus: String,
    pub market: String,
    pub created_at: DateTime<Utc>,
}

impl From<adlens_db::AnalysisRunRow> for RunItem {
    fn from(row: adlens_db::AnalysisRunRow) -> Self {
        Self {
            id: row.id,
            client_name: row.client_name,
            product_focus: row.product_focus,
            market: row.market,
            created_at: row.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

pub(super) async fn create_run(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateRunRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RunItem>>), ApiError> {
    validate_non_empty(&req_id.0, "client_name", &body.client_name)?;
    validate_non_empty(&req_id.0, "product_focus", &body.product_focus)?;

    let row = adlens_db::create_analysis_run(
        &state.pool,
        &body.client_name,
        &body.product_focus,
        &body.market,
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: row.into(),
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

pub(super) async fn find_run(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<FindRunQuery>,
) -> Result<Json<ApiResponse<RunItem>>, ApiError> {
    validate_non_empty(&req_id.0, "client", &query.client)?;
    validate_non_empty(&req_id.0, "product", &query.product)?;

    let row = adlens_db::find_analysis_run(&state.pool, &query.client, &query.product)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| {
            ApiError::new(
                req_id.0.clone(),
                "not_found",
                format!(
                    "no analysis run for client '{}' and product '{}'",
                    query.client, query.product
                ),
            )
        })?;

    Ok(Json(ApiResponse {
        data: row.into(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn list_run_competitors(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(run_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<CompetitorProfile>>>, ApiError> {
    resolve_run(&state, &req_id.0, run_id).await?;

    let rows = adlens_db::list_competitors(&state.pool, run_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(adlens_db::CompetitorRow::into_profile)
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

pub(super) async fn resolve_run(
    state: &AppState,
    req_id: &str,
    run_id: Uuid,
) -> Result<adlens_db::AnalysisRunRow, ApiError> {
    adlens_db::get_analysis_run(&state.pool, run_id)
        .await
        .map_err(|e| map_db_error(req_id.to_owned(), &e))?
        .ok_or_else(|| {
            ApiError::new(
                req_id,
                "not_found",
                format!("no analysis run with id {run_id}"),
            )
        })
}

pub(super) fn validate_non_empty(
    req_id: &str,
    field: &str,
    value: &str,
) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::new(
            req_id,
            "validation_error",
            format!("'{field}' must not be empty"),
        ));
    }
    Ok(())
}
