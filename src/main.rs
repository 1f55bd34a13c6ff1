use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{AppState, router};
use ctakes_core::{CoreConfig, config::verify_spans_from_env_value, constants::ENV_VERIFY_SPANS};
use fhir::NlpSource;

/// Main entry point for the cTAKES FHIR REST server
///
/// Resolves configuration once from the environment (and `.env`), then serves the REST API.
///
/// # Environment Variables
/// - `CTAKES_FHIR_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `CTAKES_VERIFY_SPANS`: Check reconciled spans against the document (default: true)
/// - `NLP_ALGORITHM` / `NLP_VERSION`: Override the `nlp-source` provenance extension
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - `CTAKES_VERIFY_SPANS` is not a boolean,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ctakes_fhir_run=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("CTAKES_FHIR_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let verify_spans = verify_spans_from_env_value(std::env::var(ENV_VERIFY_SPANS).ok())?;
    let source = NlpSource::from_env_values(
        std::env::var("NLP_ALGORITHM").ok(),
        std::env::var("NLP_VERSION").ok(),
    );

    tracing::info!(
        verify_spans,
        algorithm = %source.algorithm,
        version = %source.version,
        "++ Starting cTAKES FHIR REST on {}",
        addr
    );

    let app = router(AppState::new(CoreConfig::new(verify_spans), source));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
