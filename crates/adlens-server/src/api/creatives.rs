//! Ad-creative image generation passthrough.

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::runs::validate_non_empty;
use super::{require_gemini, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct GenerateCreativeRequest {
    pub prompt: String,
    #[serde(default)]
    pub client_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct CreativeItem {
    pub mime_type: String,
    pub data_base64: String,
}

pub(super) async fn generate_creative(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<GenerateCreativeRequest>,
) -> Result<Json<ApiResponse<CreativeItem>>, ApiError> {
    validate_non_empty(&req_id.0, "prompt", &body.prompt)?;
    let gemini = require_gemini(&state, &req_id.0)?;

    let prompt = match body.client_name.as_deref().filter(|c| !c.trim().is_empty()) {
        Some(client) => format!("Ad creative for \"{client}\": {}", body.prompt),
        None => body.prompt.clone(),
    };

    let image = gemini.generate_image(&prompt).await.map_err(|e| {
        tracing::warn!(error = %e, "creative generation failed");
        ApiError::new(
            req_id.0.clone(),
            "upstream_error",
            format!("creative generation failed: {e}"),
        )
    })?;

    Ok(Json(ApiResponse {
        data: CreativeItem {
            mime_type: image.mime_type,
            data_base64: image.data_base64,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
