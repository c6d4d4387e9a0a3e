//! # Utility Pricing Service
//!
//! Tiered unit pricing for utility billing, with a consistency engine that
//! finds gaps and overlaps in a service's tier ladder and works out where
//! the next tier has to start.
//!
//! ## Architecture
//!
//! - **domain**: pricing tiers, the consistency engine, service requests
//! - **application**: services that guard writes and run analyses
//! - **infrastructure**: in-memory storage and the seed loader
//! - **interfaces**: REST API with Swagger documentation
//! - **shared**: errors, clock, pagination/filter helper, shutdown

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};
pub use interfaces::http::create_api_router;
