use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
    routing::get,
    Router,
};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::Arc;
use std::time::Instant;

use crate::domain::models::PoolStats;

// メトリクスの状態
pub struct MetricsState {
    recorder_handle: PrometheusHandle,
}

impl MetricsState {
    /// Install the global Prometheus recorder. Only one recorder may be
    /// installed per process.
    pub fn install() -> Result<Self, BuildError> {
        let recorder_handle = PrometheusBuilder::new()
            .add_global_label("service", "study_score_service")
            .set_buckets_for_metric(
                Matcher::Full("http_request_duration_seconds".to_string()),
                &[0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0],
            )?
            .set_buckets_for_metric(
                Matcher::Full("predicted_score".to_string()),
                &[10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0],
            )?
            .install_recorder()?;

        Ok(Self { recorder_handle })
    }

    pub fn render(&self) -> String {
        self.recorder_handle.render()
    }

    // HTTPリクエストをカウント
    pub fn record_request(&self, path: &str, method: &str, status: u16) {
        let labels = [
            ("path", path.to_string()),
            ("method", method.to_string()),
            ("status", status.to_string()),
        ];
        counter!("http_requests_total", &labels).increment(1);
    }

    // レスポンス時間を記録
    pub fn record_request_duration(&self, path: &str, method: &str, start: Instant) {
        let duration = start.elapsed().as_secs_f64();
        let labels = [("path", path.to_string()), ("method", method.to_string())];
        histogram!("http_request_duration_seconds", &labels).record(duration);
    }

    /// Count a prediction attempt; `result` is `success`, `invalid` or `failure`
    pub fn record_prediction(&self, result: &'static str, score: Option<f64>) {
        counter!("predictions_total", "result" => result).increment(1);
        if let Some(score) = score {
            histogram!("predicted_score").record(score);
        }
    }

    // コネクションプールの状態を更新
    pub fn update_pool_stats(&self, stats: &PoolStats) {
        let in_use = stats.size.saturating_sub(stats.idle);
        gauge!("db_pool_connections", "state" => "idle").set(f64::from(stats.idle));
        gauge!("db_pool_connections", "state" => "in_use").set(f64::from(in_use));
        gauge!("db_pool_connections", "state" => "max").set(f64::from(stats.max_connections));
    }

    pub fn update_database_available(&self, available: bool) {
        gauge!("database_up").set(if available { 1.0 } else { 0.0 });
    }
}

/// Record count and latency for every routed request
pub async fn track_metrics(
    State(state): State<Arc<MetricsState>>,
    req: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| req.uri().path().to_owned());
    let method = req.method().to_string();

    let response = next.run(req).await;

    state.record_request(&path, &method, response.status().as_u16());
    state.record_request_duration(&path, &method, start);
    response
}

// メトリクスのハンドラー
async fn metrics_handler(State(state): State<Arc<MetricsState>>) -> String {
    state.render()
}

// メトリクスのルーターを作成
pub fn create_metrics_router<S>(state: Arc<MetricsState>) -> Router<S> {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}
