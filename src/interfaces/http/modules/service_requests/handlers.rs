//! Service request REST API handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::dto::{
    CreateServiceRequestRequest, ListServiceRequestsParams, ServiceRequestResponse,
    UpdateRequestStatusRequest,
};
use crate::application::{RequestListQuery, ServiceRequestService};
use crate::config::PaginationConfig;
use crate::domain::RequestStatus;
use crate::interfaces::http::common::{
    domain_error, ApiError, ApiResponse, ApiResult, PaginatedResponse, ValidatedJson,
};
use crate::shared::validate_pagination;

#[derive(Clone)]
pub struct ServiceRequestState {
    pub service: Arc<ServiceRequestService>,
    pub pagination: PaginationConfig,
}

#[utoipa::path(
    get,
    path = "/api/v1/service-requests",
    tag = "Service Requests",
    params(ListServiceRequestsParams),
    responses(
        (status = 200, description = "Newest requests first", body = ApiResponse<PaginatedResponse<ServiceRequestResponse>>),
        (status = 422, description = "Unknown status filter")
    )
)]
pub async fn list_requests(
    State(state): State<ServiceRequestState>,
    Query(params): Query<ListServiceRequestsParams>,
) -> ApiResult<PaginatedResponse<ServiceRequestResponse>> {
    let (page, limit) = validate_pagination(
        params.page,
        params.limit,
        state.pagination.default_page_size,
        state.pagination.max_page_size,
    );

    let query = RequestListQuery {
        status: params.status,
        from_date: params.from_date,
        to_date: params.to_date,
        text: params.q,
        page,
        page_size: limit,
    };
    let result = state.service.list(&query).await.map_err(domain_error)?;

    Ok(Json(ApiResponse::success(PaginatedResponse::from_page(
        result, page, limit,
    ))))
}

#[utoipa::path(
    post,
    path = "/api/v1/service-requests",
    tag = "Service Requests",
    request_body = CreateServiceRequestRequest,
    responses(
        (status = 201, description = "Created", body = ApiResponse<ServiceRequestResponse>),
        (status = 422, description = "Invalid request")
    )
)]
pub async fn create_request(
    State(state): State<ServiceRequestState>,
    ValidatedJson(req): ValidatedJson<CreateServiceRequestRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ServiceRequestResponse>>), ApiError> {
    let created = state
        .service
        .create(req.into())
        .await
        .map_err(domain_error)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created.into()))))
}

#[utoipa::path(
    get,
    path = "/api/v1/service-requests/{id}",
    tag = "Service Requests",
    params(("id" = i32, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request details", body = ApiResponse<ServiceRequestResponse>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_request(
    State(state): State<ServiceRequestState>,
    Path(id): Path<i32>,
) -> ApiResult<ServiceRequestResponse> {
    let request = state.service.get(id).await.map_err(domain_error)?;
    Ok(Json(ApiResponse::success(request.into())))
}

#[utoipa::path(
    put,
    path = "/api/v1/service-requests/{id}/status",
    tag = "Service Requests",
    params(("id" = i32, Path, description = "Request ID")),
    request_body = UpdateRequestStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = ApiResponse<ServiceRequestResponse>),
        (status = 404, description = "Not found"),
        (status = 409, description = "Request is already closed")
    )
)]
pub async fn update_request_status(
    State(state): State<ServiceRequestState>,
    Path(id): Path<i32>,
    ValidatedJson(req): ValidatedJson<UpdateRequestStatusRequest>,
) -> ApiResult<ServiceRequestResponse> {
    let status: RequestStatus = req.status.parse().map_err(domain_error)?;
    let request = state
        .service
        .update_status(id, status)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(request.into())))
}
