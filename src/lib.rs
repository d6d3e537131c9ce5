pub mod backend;
pub mod config;
pub mod error;
pub mod patient;
pub mod resilience;
pub mod routes;
pub mod sanitize;

use crate::backend::FhirBackend;
use crate::config::BridgeConfig;
use crate::error::Result;
use crate::patient::PatientService;
use crate::resilience::{CircuitBreaker, ResilientExecutor, RetryExecutor};
use crate::routes::{router, AppState};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Wire configuration into the application state: transport, retry policy,
/// circuit breaker, executor, and the patient facade. Composed once here;
/// the breaker lives for the life of the process.
pub fn build_state(config: &BridgeConfig) -> Result<AppState> {
    let backend = FhirBackend::new(&config.backend)?;
    let retry = RetryExecutor::new(config.retry.clone());
    let breaker = Arc::new(CircuitBreaker::new(
        config.backend.base_url.clone(),
        config.circuit_breaker.clone(),
    ));
    let executor = ResilientExecutor::new(backend, retry, breaker);

    Ok(AppState {
        patients: Arc::new(PatientService::new(executor)),
    })
}

/// Initialize the bridge server
pub async fn init_bridge(config: BridgeConfig) -> Result<()> {
    // Validate configuration
    config.validate()?;

    info!("Starting FHIR bridge");
    info!(backend = %config.backend.base_url, "Proxying Patient operations");
    info!(
        "Server listening on {}:{}",
        config.server.host, config.server.port
    );

    let state = build_state(&config)?;
    let app = router(state).layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(crate::error::BridgeError::Io)?;

    info!("Bridge ready to accept connections");

    axum::serve(listener, app)
        .await
        .map_err(|e| crate::error::BridgeError::Unknown(format!("Server error: {}", e)))?;

    Ok(())
}

/// Initialize tracing/logging
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fhir_bridge=debug,tower_http=debug".into()),
        )
        .with_target(false)
        .compact()
        .init();
}
