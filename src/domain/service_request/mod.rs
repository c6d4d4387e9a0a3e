//! Customer service request aggregate

pub mod model;
pub mod repository;

pub use model::{RequestStatus, ServiceRequest};
pub use repository::ServiceRequestRepository;
