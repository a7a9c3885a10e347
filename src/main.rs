use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{patient_service_path, router, AppState, CDS_SERVICES_PATH, OPENAPI_PATH};
use cds_core::config::{
    fhir_timeout_from_env_value, openapi_enabled_from_env_value, rest_addr_from_env_value,
};
use cds_core::CoreConfig;

/// Main entry point for the CDS Hooks service
///
/// Resolves configuration once, then serves the REST API until Ctrl+C.
///
/// # Environment Variables
/// - `CDS_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `CDS_FHIR_TIMEOUT_SECS`: budget for each FHIR search, in seconds (default: 10)
/// - `CDS_OPENAPI`: serve the OpenAPI document when true (default: false)
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - any environment value is invalid,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cds_run=info".parse()?)
                .add_directive("api_rest=info".parse()?)
                .add_directive("cds_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = rest_addr_from_env_value(std::env::var("CDS_REST_ADDR").ok())?;
    let fhir_timeout = fhir_timeout_from_env_value(std::env::var("CDS_FHIR_TIMEOUT_SECS").ok())?;
    let openapi_enabled = openapi_enabled_from_env_value(std::env::var("CDS_OPENAPI").ok())?;

    let cfg = Arc::new(CoreConfig::new(rest_addr, fhir_timeout, openapi_enabled)?);
    let app = router(AppState::new(cfg.clone())?);

    tracing::info!("++ Starting CDS Hooks REST on {}", cfg.rest_addr());
    tracing::info!("++ Discovery at {}", CDS_SERVICES_PATH);
    tracing::info!("++ patient-view at {}", patient_service_path());
    tracing::info!("++ FHIR timeout {:?}", cfg.fhir_timeout());
    if cfg.openapi_enabled() {
        tracing::info!("++ OpenAPI at {}", OPENAPI_PATH);
    }

    let listener = tokio::net::TcpListener::bind(cfg.rest_addr()).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("-- CDS Hooks REST stopped");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
