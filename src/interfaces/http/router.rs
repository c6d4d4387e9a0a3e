//! API router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::FromRef,
    middleware,
    routing::{get, put},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::common::{ApiResponse, PaginatedResponse};
use super::modules::health::{self, HealthState};
use super::modules::metrics::{http_metrics_middleware, prometheus_metrics, MetricsState};
use super::modules::pricing_tiers::{self, PricingTierState};
use super::modules::request_id::request_id_middleware;
use super::modules::service_requests::{self, ServiceRequestState};
use crate::application::{PricingTierService, ServiceRequestService};
use crate::config::PaginationConfig;
use crate::domain::ServiceCode;

/// Shared state for every route. Handlers pick their slice via `FromRef`.
#[derive(Clone)]
pub struct AppState {
    pub pricing: PricingTierState,
    pub requests: ServiceRequestState,
    pub health: HealthState,
    pub metrics: MetricsState,
}

impl AppState {
    pub fn new(
        pricing: Arc<PricingTierService>,
        requests: Arc<ServiceRequestService>,
        service_codes: &[ServiceCode],
        pagination: PaginationConfig,
        metrics_handle: PrometheusHandle,
    ) -> Self {
        Self {
            pricing: PricingTierState { service: pricing },
            requests: ServiceRequestState {
                service: requests,
                pagination,
            },
            health: HealthState {
                started_at: Arc::new(Instant::now()),
                service_codes: Arc::new(service_codes.iter().map(|c| c.to_string()).collect()),
            },
            metrics: MetricsState {
                handle: metrics_handle,
            },
        }
    }
}

impl FromRef<AppState> for PricingTierState {
    fn from_ref(s: &AppState) -> Self {
        s.pricing.clone()
    }
}

impl FromRef<AppState> for ServiceRequestState {
    fn from_ref(s: &AppState) -> Self {
        s.requests.clone()
    }
}

impl FromRef<AppState> for HealthState {
    fn from_ref(s: &AppState) -> Self {
        s.health.clone()
    }
}

impl FromRef<AppState> for MetricsState {
    fn from_ref(s: &AppState) -> Self {
        s.metrics.clone()
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::handlers::health_check,
        pricing_tiers::handlers::list_tiers,
        pricing_tiers::handlers::create_tier,
        pricing_tiers::handlers::analyze_tiers,
        pricing_tiers::handlers::new_tier_defaults,
        pricing_tiers::handlers::get_tier,
        pricing_tiers::handlers::update_tier,
        pricing_tiers::handlers::delete_tier,
        service_requests::handlers::list_requests,
        service_requests::handlers::create_request,
        service_requests::handlers::get_request,
        service_requests::handlers::update_request_status,
    ),
    components(
        schemas(
            ApiResponse<String>,
            PaginatedResponse<service_requests::ServiceRequestResponse>,
            health::HealthResponse,
            pricing_tiers::PricingTierResponse,
            pricing_tiers::CreatePricingTierRequest,
            pricing_tiers::UpdatePricingTierRequest,
            pricing_tiers::TierAnalysisResponse,
            pricing_tiers::TierLabelDto,
            pricing_tiers::GapDto,
            pricing_tiers::OverlapDto,
            pricing_tiers::TierWarningDto,
            pricing_tiers::NewTierDefaultsResponse,
            service_requests::ServiceRequestResponse,
            service_requests::CreateServiceRequestRequest,
            service_requests::UpdateRequestStatusRequest,
        )
    ),
    tags(
        (name = "Health", description = "Liveness and version"),
        (name = "Pricing Tiers", description = "Tiered unit pricing per billable service, with gap/overlap analysis"),
        (name = "Service Requests", description = "Tenant service requests with filtered, paginated listing"),
    ),
    info(
        title = "Utility Pricing API",
        version = "1.0.0",
        description = "Pricing tier administration and consistency checks for utility billing",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

pub fn create_api_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route(
            "/api/v1/services/{code}/pricing-tiers",
            get(pricing_tiers::handlers::list_tiers).post(pricing_tiers::handlers::create_tier),
        )
        .route(
            "/api/v1/services/{code}/pricing-tiers/analysis",
            get(pricing_tiers::handlers::analyze_tiers),
        )
        .route(
            "/api/v1/services/{code}/pricing-tiers/defaults",
            get(pricing_tiers::handlers::new_tier_defaults),
        )
        .route(
            "/api/v1/pricing-tiers/{id}",
            get(pricing_tiers::handlers::get_tier)
                .put(pricing_tiers::handlers::update_tier)
                .delete(pricing_tiers::handlers::delete_tier),
        )
        .route(
            "/api/v1/service-requests",
            get(service_requests::handlers::list_requests)
                .post(service_requests::handlers::create_request),
        )
        .route(
            "/api/v1/service-requests/{id}",
            get(service_requests::handlers::get_request),
        )
        .route(
            "/api/v1/service-requests/{id}/status",
            put(service_requests::handlers::update_request_status),
        )
        .route("/health", get(health::health_check))
        .route("/metrics", get(prometheus_metrics))
        .layer(middleware::from_fn(http_metrics_middleware))
        .with_state(state);

    Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .merge(api_routes)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

// ── Tests ──────────────────────────────────────────────────────
