//! Pricing tier REST API handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::dto::{
    CreatePricingTierRequest, DeleteTierParams, NewTierDefaultsResponse, PricingTierResponse,
    TierAnalysisResponse, UpdatePricingTierRequest,
};
use crate::application::PricingTierService;
use crate::domain::ServiceCode;
use crate::interfaces::http::common::{domain_error, ApiError, ApiResponse, ApiResult, ValidatedJson};

#[derive(Clone)]
pub struct PricingTierState {
    pub service: Arc<PricingTierService>,
}

#[utoipa::path(
    get,
    path = "/api/v1/services/{code}/pricing-tiers",
    tag = "Pricing Tiers",
    params(("code" = String, Path, description = "Service code, e.g. ELECTRIC")),
    responses(
        (status = 200, description = "Tiers ordered by tierOrder", body = ApiResponse<Vec<PricingTierResponse>>),
        (status = 422, description = "Unknown service code")
    )
)]
pub async fn list_tiers(
    State(state): State<PricingTierState>,
    Path(code): Path<String>,
) -> ApiResult<Vec<PricingTierResponse>> {
    let tiers = state
        .service
        .list(&ServiceCode::new(code))
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(
        tiers.into_iter().map(Into::into).collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/services/{code}/pricing-tiers",
    tag = "Pricing Tiers",
    params(("code" = String, Path, description = "Service code")),
    request_body = CreatePricingTierRequest,
    responses(
        (status = 201, description = "Created", body = ApiResponse<PricingTierResponse>),
        (status = 409, description = "Ladder already ends in an unbounded tier, or tierOrder taken"),
        (status = 422, description = "Invalid tier")
    )
)]
pub async fn create_tier(
    State(state): State<PricingTierState>,
    Path(code): Path<String>,
    ValidatedJson(req): ValidatedJson<CreatePricingTierRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PricingTierResponse>>), ApiError> {
    let tier = state
        .service
        .create(&ServiceCode::new(code), req.into())
        .await
        .map_err(domain_error)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(tier.into()))))
}

#[utoipa::path(
    get,
    path = "/api/v1/services/{code}/pricing-tiers/analysis",
    tag = "Pricing Tiers",
    params(("code" = String, Path, description = "Service code")),
    responses(
        (status = 200, description = "Gaps, overlaps and final-tier status of the active ladder", body = ApiResponse<TierAnalysisResponse>)
    )
)]
pub async fn analyze_tiers(
    State(state): State<PricingTierState>,
    Path(code): Path<String>,
) -> ApiResult<TierAnalysisResponse> {
    let code = ServiceCode::new(code);
    let report = state.service.analyze(&code).await.map_err(domain_error)?;
    Ok(Json(ApiResponse::success(TierAnalysisResponse::new(
        code.to_string(),
        report,
    ))))
}

#[utoipa::path(
    get,
    path = "/api/v1/services/{code}/pricing-tiers/defaults",
    tag = "Pricing Tiers",
    params(("code" = String, Path, description = "Service code")),
    responses(
        (status = 200, description = "Prefill for the next tier", body = ApiResponse<NewTierDefaultsResponse>)
    )
)]
pub async fn new_tier_defaults(
    State(state): State<PricingTierState>,
    Path(code): Path<String>,
) -> ApiResult<NewTierDefaultsResponse> {
    let defaults = state
        .service
        .draft_defaults(&ServiceCode::new(code))
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(defaults.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/pricing-tiers/{id}",
    tag = "Pricing Tiers",
    params(("id" = i32, Path, description = "Tier ID")),
    responses(
        (status = 200, description = "Tier details", body = ApiResponse<PricingTierResponse>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_tier(
    State(state): State<PricingTierState>,
    Path(id): Path<i32>,
) -> ApiResult<PricingTierResponse> {
    let tier = state.service.get(id).await.map_err(domain_error)?;
    Ok(Json(ApiResponse::success(tier.into())))
}

#[utoipa::path(
    put,
    path = "/api/v1/pricing-tiers/{id}",
    tag = "Pricing Tiers",
    params(("id" = i32, Path, description = "Tier ID")),
    request_body = UpdatePricingTierRequest,
    responses(
        (status = 200, description = "Updated", body = ApiResponse<PricingTierResponse>),
        (status = 404, description = "Not found"),
        (status = 422, description = "Invalid tier")
    )
)]
pub async fn update_tier(
    State(state): State<PricingTierState>,
    Path(id): Path<i32>,
    ValidatedJson(req): ValidatedJson<UpdatePricingTierRequest>,
) -> ApiResult<PricingTierResponse> {
    let tier = state
        .service
        .update(id, req.into())
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(tier.into())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/pricing-tiers/{id}",
    tag = "Pricing Tiers",
    params(("id" = i32, Path, description = "Tier ID"), DeleteTierParams),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Ambiguous last tier, retry with force=true")
    )
)]
pub async fn delete_tier(
    State(state): State<PricingTierState>,
    Path(id): Path<i32>,
    Query(params): Query<DeleteTierParams>,
) -> ApiResult<String> {
    state
        .service
        .delete(id, params.force)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(format!("Pricing tier {} deleted", id))))
}
