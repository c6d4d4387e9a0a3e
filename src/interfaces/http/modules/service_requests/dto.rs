//! Service request DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::application::NewServiceRequest;
use crate::domain::ServiceRequest;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequestResponse {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub requester: String,
    pub unit: Option<String>,
    /// PENDING, IN_PROGRESS, COMPLETED or CANCELLED
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ServiceRequest> for ServiceRequestResponse {
    fn from(r: ServiceRequest) -> Self {
        Self {
            status: r.status.to_string(),
            id: r.id,
            title: r.title,
            description: r.description,
            requester: r.requester,
            unit: r.unit,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceRequestRequest {
    #[validate(length(min = 1, max = 200, message = "title is required"))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 100, message = "requester is required"))]
    pub requester: String,
    #[validate(length(max = 50))]
    pub unit: Option<String>,
}

impl From<CreateServiceRequestRequest> for NewServiceRequest {
    fn from(req: CreateServiceRequestRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            requester: req.requester,
            unit: req.unit,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateRequestStatusRequest {
    #[validate(length(min = 1, message = "status is required"))]
    pub status: String,
}

/// Filters for the request list. Dates bound `createdAt` inclusively.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListServiceRequestsParams {
    /// Page number, starting at 1
    pub page: Option<usize>,
    /// Page size, capped by the server's configured maximum
    pub limit: Option<usize>,
    pub status: Option<String>,
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
    /// Free text matched against title, description, requester and unit
    pub q: Option<String>,
}
