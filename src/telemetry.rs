use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use crate::config::ObservabilityConfig;

/// Initialize tracing with JSON output for structured logging. This provides
/// the correlation IDs and structured data needed to follow a form session
/// across the fetch, save and transition workflows.
pub fn init_telemetry(config: &ObservabilityConfig) -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true),
        )
        .with(telemetry_filter(&config.log_level))
        .init();

    tracing::info!("gwr-workflow telemetry initialized with structured logging");
    Ok(())
}

/// RUST_LOG wins when set; otherwise the configured level applies.
fn telemetry_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Generate a correlation ID for linking the operations of one form session.
pub fn generate_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

/// Create a span with common workflow attributes.
pub fn create_workflow_span(
    operation: &str,
    project_id: Option<u64>,
    egid: Option<u64>,
    correlation_id: Option<&str>,
) -> tracing::Span {
    tracing::info_span!(
        "building_workflow",
        operation = operation,
        project.id = project_id,
        building.egid = egid,
        correlation.id = correlation_id,
    )
}
