//! Ad-set aggregate listing for an ad account.

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use adlens_insights::{aggregate_ad_sets, AdRecord, AdSetAggregate};

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

pub(super) async fn list_ad_sets(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(account): Path<String>,
) -> Result<Json<ApiResponse<Vec<AdSetAggregate>>>, ApiError> {
    let data = load_aggregates(&state, &req_id.0, &account).await?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Fetches an account's ads and mappings, then aggregates per ad set.
///
/// Shared with the funnel handler; both views are request-scoped builds over
/// the same rows.
pub(super) async fn load_aggregates(
    state: &AppState,
    req_id: &str,
    account: &str,
) -> Result<Vec<AdSetAggregate>, ApiError> {
    let ads = adlens_db::list_ads_for_account(&state.pool, account)
        .await
        .map_err(|e| map_db_error(req_id.to_owned(), &e))?;
    let mappings = adlens_db::stage_map_for_account(&state.pool, account)
        .await
        .map_err(|e| map_db_error(req_id.to_owned(), &e))?;

    let records: Vec<AdRecord> = ads.into_iter().map(to_record).collect();
    Ok(aggregate_ad_sets(&records, &mappings))
}

fn to_record(row: adlens_db::AdDetailRow) -> AdRecord {
    AdRecord {
        ad_id: row.ad_id,
        ad_name: row.ad_name,
        ad_set_id: row.ad_set_id,
        ad_set_name: row.ad_set_name,
        impressions: row.impressions,
        reach: row.reach,
        spend: row.spend,
        clicks: row.clicks,
        frequency: row.frequency,
        roas: row.roas,
        ctr: row.ctr,
        cpc: row.cpc,
        thumbnail_url: row.thumbnail_url,
        audience: row.audience,
    }
}
