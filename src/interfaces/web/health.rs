use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::application::services::PredictionService;
use crate::domain::models::PoolStats;
use crate::interfaces::web::metrics::MetricsState;

// ヘルスチェックの状態
pub struct HealthState {
    pub start_time: Instant,
    pub database_status: RwLock<DatabaseStatus>,
    prediction_service: Arc<PredictionService>,
    metrics: Option<Arc<MetricsState>>,
    check_interval: Duration,
}

// データベースの状態
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseStatus {
    pub available: bool,
    /// `None` until the first check has run
    pub last_checked: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
    pub pool: Option<PoolStats>,
}

// ヘルスチェックのレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_seconds: u64,
    pub version: String,
    pub services: ServiceStatus,
}

// サービスの状態
#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub database: DatabaseStatus,
}

impl HealthState {
    pub fn new(prediction_service: Arc<PredictionService>, check_interval: Duration) -> Self {
        Self {
            start_time: Instant::now(),
            database_status: RwLock::new(DatabaseStatus {
                available: false,
                last_checked: None,
                error_message: Some("Not checked yet".to_string()),
                pool: None,
            }),
            prediction_service,
            metrics: None,
            check_interval,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsState>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    // データベースの状態を更新する
    pub async fn update_database_status(&self, available: bool, error_message: Option<String>) {
        let pool = self.prediction_service.pool_stats();

        if let Some(metrics) = &self.metrics {
            metrics.update_database_available(available);
            if let Some(stats) = &pool {
                metrics.update_pool_stats(stats);
            }
        }

        if available {
            debug!("Database connection is available");
        } else {
            error!("Database connection is not available: {:?}", error_message);
        }

        let mut status = self.database_status.write().await;
        status.available = available;
        status.last_checked = Some(Utc::now());
        status.error_message = error_message;
        status.pool = pool;
    }

    /// Ping the database once and record the outcome
    pub async fn refresh(&self) {
        match self.prediction_service.check_database().await {
            Ok(()) => self.update_database_status(true, None).await,
            Err(e) => {
                self.update_database_status(false, Some(e.to_string()))
                    .await
            }
        }
    }

    // バックグラウンドでヘルスチェックを開始する
    pub fn start_background_health_check(self: &Arc<Self>) -> JoinHandle<()> {
        let health_state = Arc::clone(self);

        tokio::spawn(async move {
            info!(
                "Starting background health check with interval {:?}",
                health_state.check_interval
            );
            let mut interval = tokio::time::interval(health_state.check_interval);

            loop {
                interval.tick().await;
                debug!("Performing database health check");
                health_state.refresh().await;
            }
        })
    }
}

// ヘルスチェックのハンドラー
pub async fn health_handler(
    State(state): State<Arc<HealthState>>,
) -> (StatusCode, Json<HealthResponse>) {
    let uptime = state.start_time.elapsed().as_secs();
    let database_status = state.database_status.read().await.clone();

    let (code, status) = if database_status.available {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        code,
        Json(HealthResponse {
            status: status.to_string(),
            uptime_seconds: uptime,
            version: env!("CARGO_PKG_VERSION").to_string(),
            services: ServiceStatus {
                database: database_status,
            },
        }),
    )
}

// ヘルスチェックのルーターを作成
pub fn create_health_router<S>(state: Arc<HealthState>) -> Router<S> {
    Router::new()
        .route("/health", get(health_handler))
        .with_state(state)
}
