use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use study_score_service::application::services::PredictionService;
use study_score_service::infrastructure::config::AppConfig;
use study_score_service::infrastructure::postgres::{create_pool, PostgresPredictionRepository};
use study_score_service::interfaces::web::health::HealthState;
use study_score_service::interfaces::web::metrics::MetricsState;
use study_score_service::interfaces::web::server::{shutdown_signal, start_web_server, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting study score service");

    // Load configuration
    let config = AppConfig::load()?;
    info!("Loaded configuration: {:#?}", config);

    let metrics_state = Arc::new(MetricsState::install()?);
    debug!("Installed Prometheus recorder");

    let pool = create_pool(&config.database)?;
    let repository = Arc::new(PostgresPredictionRepository::new(pool));

    // Continue even if the database is not up yet; the schema is retried on first use
    info!("Preparing schema on {}", config.database.display_target());
    match repository.ensure_schema().await {
        Ok(()) => info!("Successfully connected to the database"),
        Err(e) => warn!("Failed to prepare schema: {} - will retry on first request", e),
    }

    let model = config.scoring.model()?;
    info!("Using score model {:?}", model);
    let prediction_service = Arc::new(PredictionService::new(repository.clone(), model));

    // Create health check state
    let health_state = Arc::new(
        HealthState::new(Arc::clone(&prediction_service), config.health.interval())
            .with_metrics(Arc::clone(&metrics_state)),
    );
    health_state.refresh().await;
    let health_task = health_state.start_background_health_check();
    debug!("Started background health check");

    let app_state = Arc::new(AppState::new(
        prediction_service,
        health_state,
        metrics_state,
    ));

    start_web_server(&config.server, app_state, shutdown_signal()).await?;

    health_task.abort();
    repository.close().await;

    Ok(())
}
