use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use super::handlers::{fallback_handler, predict_handler, summary_handler};
use crate::application::services::PredictionService;
use crate::infrastructure::config::ServerConfig;
use crate::interfaces::web::health::{create_health_router, HealthState};
use crate::interfaces::web::metrics::{create_metrics_router, track_metrics, MetricsState};

/// アプリケーションの状態を管理する構造体
pub struct AppState {
    pub prediction_service: Arc<PredictionService>,
    pub health_state: Arc<HealthState>,
    pub metrics_state: Arc<MetricsState>,
}

impl AppState {
    pub fn new(
        service: Arc<PredictionService>,
        health_state: Arc<HealthState>,
        metrics_state: Arc<MetricsState>,
    ) -> Self {
        Self {
            prediction_service: service,
            health_state,
            metrics_state,
        }
    }
}

/// Build the application router
pub fn build_router(app_state: Arc<AppState>) -> Router {
    let health_router = create_health_router(app_state.health_state.clone());
    let metrics_router = create_metrics_router(app_state.metrics_state.clone());

    Router::new()
        .route("/predict", post(predict_handler))
        .route("/metrics/summary", get(summary_handler))
        // ヘルスチェックとメトリクスのルーターを追加
        .merge(health_router)
        .merge(metrics_router)
        .route_layer(middleware::from_fn_with_state(
            app_state.metrics_state.clone(),
            track_metrics,
        ))
        // その他のパスは404を返す
        .fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

/// Webサーバーを起動する関数
pub async fn start_web_server<F>(
    config: &ServerConfig,
    app_state: Arc<AppState>,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(app_state);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Server shutdown gracefully");
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
