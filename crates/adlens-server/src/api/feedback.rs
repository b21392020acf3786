//! Idea-feedback handlers: record and list.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::runs::validate_non_empty;
use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

// ---------------------------------------------------------------------------
// Request/response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(super) struct CreateFeedbackRequest {
    pub client_name: String,
    pub idea: String,
    pub verdict: String,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ListFeedbackQuery {
    pub client: String,
}

#[derive(Debug, Serialize)]
pub(super) struct FeedbackItem {
    pub id: i64,
    pub idea: String,
    pub verdict: String,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<adlens_db::FeedbackRow> for FeedbackItem {
    fn from(row: adlens_db::FeedbackRow) -> Self {
        Self {
            id: row.id,
            idea: row.idea,
            verdict: row.verdict,
            comment: row.comment,
            created_at: row.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn validate_verdict(req_id: &str, value: &str) -> Result<(), ApiError> {
    match value {
        "up" | "down" => Ok(()),
        _ => Err(ApiError::new(
            req_id,
            "validation_error",
            format!("verdict must be 'up' or 'down', got '{value}'"),
        )),
    }
}

pub(super) async fn create_feedback(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateFeedbackRequest>,
) -> Result<(StatusCode, Json<ApiResponse<FeedbackItem>>), ApiError> {
    validate_non_empty(&req_id.0, "client_name", &body.client_name)?;
    validate_non_empty(&req_id.0, "idea", &body.idea)?;
    validate_verdict(&req_id.0, &body.verdict)?;

    let row = adlens_db::insert_feedback(
        &state.pool,
        &body.client_name,
        &body.idea,
        &body.verdict,
        body.comment.as_deref(),
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

pub(super) async fn list_feedback(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ListFeedbackQuery>,
) -> Result<Json<ApiResponse<Vec<FeedbackItem>>>, ApiError> {
    validate_non_empty(&req_id.0, "client", &query.client)?;

    let rows = adlens_db::list_feedback_for_client(&state.pool, &query.client)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows.into_iter().map(FeedbackItem::from).collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
