//! Common HTTP types: response envelope, pagination and error mapping

pub mod validated_json;

pub use validated_json::ValidatedJson;

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;

use crate::domain::DomainError;
use crate::shared::PageResult;

/// Standard API response envelope.
///
/// Success: `{"success": true, "data": {...}}`,
/// failure: `{"success": false, "data": null, "error": "..."}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    /// Payload, `null` on error
    pub data: Option<T>,
    /// Error description, omitted on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// One page of a filtered list
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    /// Items matching the filters across all pages
    pub total: usize,
    /// Current page (1-based)
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
}

impl<T> PaginatedResponse<T> {
    pub fn from_page<S>(result: PageResult<S>, page: usize, limit: usize) -> Self
    where
        T: From<S>,
    {
        Self {
            items: result.page_items.into_iter().map(T::from).collect(),
            total: result.total_items,
            page,
            limit,
            total_pages: result.total_pages,
        }
    }
}

/// Error half of every handler result
pub type ApiError = (StatusCode, Json<ApiResponse<()>>);

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

pub fn error_response(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(ApiResponse::error(message)))
}

impl From<DomainError> for ApiResponse<()> {
    fn from(err: DomainError) -> Self {
        ApiResponse::error(err.to_string())
    }
}

/// Map a domain failure onto its HTTP status.
pub fn domain_error(err: DomainError) -> ApiError {
    let status = match &err {
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        DomainError::Conflict(_) | DomainError::AppendBlocked { .. } => StatusCode::CONFLICT,
    };
    if status == StatusCode::CONFLICT {
        warn!(error = %err, "Request rejected");
    }
    (status, Json(err.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ServiceCode;

    #[test]
    fn domain_errors_map_to_statuses() {
        let (status, Json(body)) = domain_error(DomainError::NotFound {
            entity: "PricingTier",
            field: "id",
            value: "3".into(),
        });
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(!body.success);
        assert_eq!(body.error.as_deref(), Some("Not found: PricingTier with id=3"));

        let (status, _) = domain_error(DomainError::validation("bad"));
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, _) = domain_error(DomainError::AppendBlocked {
            service_code: ServiceCode::new("WATER"),
            tier_order: 2,
        });
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[test]
    fn paginated_response_keeps_page_metadata() {
        let result = PageResult {
            page_items: vec![1_i32, 2],
            total_items: 5,
            total_pages: 3,
        };
        let page: PaginatedResponse<i64> = PaginatedResponse::from_page(result, 1, 2);
        assert_eq!(page.items, vec![1_i64, 2]);
        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 3);
    }
}
