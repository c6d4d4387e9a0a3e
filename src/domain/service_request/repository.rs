//! Service request repository interface

use async_trait::async_trait;

use super::model::ServiceRequest;
use crate::domain::DomainResult;

#[async_trait]
pub trait ServiceRequestRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<ServiceRequest>>;
    async fn find_all(&self) -> DomainResult<Vec<ServiceRequest>>;
    async fn save(&self, request: ServiceRequest) -> DomainResult<ServiceRequest>;
    async fn update(&self, request: ServiceRequest) -> DomainResult<()>;
}
