use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::models::{DomainError, PredictionRequest, PredictionResponse, PredictionSummary};
use crate::interfaces::web::error::{ApiError, ErrorBody};
use crate::interfaces::web::server::AppState;

/// Score the submitted study hours and record the prediction
pub async fn predict_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PredictionRequest>, JsonRejection>,
) -> Result<Json<PredictionResponse>, ApiError> {
    // Generate a request ID for tracking
    let request_id = Uuid::new_v4();
    debug!("New prediction request: {}", request_id);

    let Json(request) = payload.inspect_err(|_| {
        state.metrics_state.record_prediction("invalid", None);
    })?;

    match state.prediction_service.predict(request).await {
        Ok(prediction) => {
            state
                .metrics_state
                .record_prediction("success", Some(prediction.score));
            debug!("Request {} stored as {}", request_id, prediction.id);
            Ok(Json(PredictionResponse::from(&prediction)))
        }
        Err(e) => {
            let result = match e {
                DomainError::Validation(_) => "invalid",
                _ => "failure",
            };
            state.metrics_state.record_prediction(result, None);
            Err(e.into())
        }
    }
}

/// Aggregate statistics over stored predictions
pub async fn summary_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PredictionSummary>, ApiError> {
    let summary = state.prediction_service.summary().await?;
    Ok(Json(summary))
}

/// フォールバックハンドラー
pub async fn fallback_handler() -> impl IntoResponse {
    info!("404 Not Found");
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            detail: "Not Found".to_string(),
        }),
    )
}
