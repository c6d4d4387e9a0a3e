//! Server bootstrap
//!
//! Wires configuration, storage, services and the REST router together and
//! runs the HTTP server until a shutdown signal arrives.

use std::sync::{Arc, OnceLock};

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::application::{PricingTierService, ServiceRequestService};
use crate::config::{AppConfig, ConfigError, LogFormat};
use crate::infrastructure::{
    load_seed_tiers, InMemoryPricingTierRepository, InMemoryServiceRequestRepository,
};
use crate::interfaces::http::{create_api_router, AppState};
use crate::shared::{InfraError, ShutdownCoordinator, SystemClock};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to load seed tiers: {0}")]
    Seed(#[from] InfraError),

    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error("HTTP server error: {0}")]
    Serve(std::io::Error),

    #[error("Failed to install Prometheus recorder: {0}")]
    Metrics(String),
}

/// Install the global tracing subscriber. `RUST_LOG` wins over the
/// configured level.
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = match config.logging.format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).try_init(),
    };
    if result.is_err() {
        warn!("Tracing subscriber already installed");
    }
}

/// The global recorder can only be installed once per process.
fn prometheus_handle() -> Result<PrometheusHandle, ServerError> {
    static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

    if let Some(handle) = HANDLE.get() {
        return Ok(handle.clone());
    }
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| ServerError::Metrics(e.to_string()))?;
    info!("Prometheus metrics recorder installed");
    Ok(HANDLE.get_or_init(|| handle).clone())
}

/// Build repositories and services, seeding the tier store when configured.
pub fn build_state(
    config: &AppConfig,
    metrics_handle: PrometheusHandle,
) -> Result<AppState, ServerError> {
    let tiers = match &config.storage.seed_tiers_path {
        Some(path) => load_seed_tiers(path)?,
        None => Vec::new(),
    };

    let service_codes = config.pricing.codes();
    let pricing = PricingTierService::new(
        Arc::new(InMemoryPricingTierRepository::with_tiers(tiers)),
        Arc::new(SystemClock),
        service_codes.clone(),
    );
    let requests = ServiceRequestService::new(Arc::new(InMemoryServiceRequestRepository::new()));

    Ok(AppState::new(
        Arc::new(pricing),
        Arc::new(requests),
        &service_codes,
        config.pagination.clone(),
        metrics_handle,
    ))
}

/// Serve the REST API until SIGINT/SIGTERM, then drain in-flight requests
/// for at most `server.shutdown_timeout` seconds.
pub async fn run(config: AppConfig) -> Result<(), ServerError> {
    config.validate()?;

    let state = build_state(&config, prometheus_handle()?)?;
    let router = create_api_router(state);

    let address = config.server.address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(|source| ServerError::Bind {
            address: address.clone(),
            source,
        })?;
    info!("REST API listening on http://{}", address);
    info!("Swagger UI available at http://{}/docs/", address);

    let shutdown = ShutdownCoordinator::new(config.server.shutdown_timeout);
    shutdown.start_signal_listener();

    let signal = shutdown.signal();
    let server = axum::serve(listener, router).with_graceful_shutdown(async move {
        signal.wait().await;
        info!("REST API received shutdown signal");
    });

    let (tx, rx) = tokio::sync::oneshot::channel();
    let finished = shutdown
        .drain(async move {
            let _ = tx.send(server.await);
        })
        .await;

    if !finished {
        warn!("In-flight requests abandoned after shutdown timeout");
        return Ok(());
    }

    match rx.await {
        Ok(Err(e)) => {
            error!("REST API server error: {}", e);
            Err(ServerError::Serve(e))
        }
        _ => {
            info!("Utility pricing service stopped");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ServiceCode;

    #[test]
    fn missing_seed_file_fails_startup() {
        let mut config = AppConfig::default();
        config.storage.seed_tiers_path = Some("/nonexistent/tiers.json".into());
        let handle = PrometheusBuilder::new().build_recorder().handle();
        assert!(matches!(
            build_state(&config, handle),
            Err(ServerError::Seed(_))
        ));
    }

    #[tokio::test]
    async fn state_uses_configured_service_codes() {
        let mut config = AppConfig::default();
        config.pricing.service_codes = vec!["heating".into()];
        let handle = PrometheusBuilder::new().build_recorder().handle();
        let state = build_state(&config, handle).unwrap();

        assert!(state
            .pricing
            .service
            .list(&ServiceCode::new("HEATING"))
            .await
            .unwrap()
            .is_empty());
        assert!(state
            .pricing
            .service
            .list(&ServiceCode::new("ELECTRIC"))
            .await
            .is_err());
    }
}
