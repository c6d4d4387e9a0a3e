//! Application services

mod pricing;
mod service_requests;

pub use pricing::PricingTierService;
pub use service_requests::{NewServiceRequest, RequestListQuery, ServiceRequestService};
