//! Tenant service request endpoints

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::ServiceRequestState;
