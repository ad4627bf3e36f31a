use std::sync::Arc;

use tracing::{debug, error, info};

use crate::domain::{
    models::{DomainError, NewPrediction, PoolStats, Prediction, PredictionRequest, PredictionSummary},
    scoring::ScoreModel,
    services::PredictionRepository,
};
use crate::utils::truncate_string;

/// Service for scoring and recording predictions
pub struct PredictionService {
    repo: Arc<dyn PredictionRepository>,
    model: ScoreModel,
}

impl PredictionService {
    pub fn new(repo: Arc<dyn PredictionRepository>, model: ScoreModel) -> Self {
        Self { repo, model }
    }

    pub fn model(&self) -> &ScoreModel {
        &self.model
    }

    /// Validate a request, score it and persist the result.
    /// The score is only returned once the row has been written.
    pub async fn predict(&self, request: PredictionRequest) -> Result<Prediction, DomainError> {
        let input = request.validate()?;
        let score = self.model.predict(input.hours, &mut rand::thread_rng());
        debug!(
            "Scored {} hours for {} as {}",
            input.hours,
            truncate_string(&input.name, 32),
            score
        );

        let prediction = NewPrediction::new(input, score);
        let id = prediction.id;

        match self.repo.record_prediction(prediction).await {
            Ok(saved) => {
                info!("Recorded prediction {} with score {}", saved.id, saved.score);
                Ok(saved)
            }
            Err(e) => {
                error!("Failed to record prediction {}: {}", id, e);
                Err(e)
            }
        }
    }

    pub async fn summary(&self) -> Result<PredictionSummary, DomainError> {
        self.repo.summary().await
    }

    pub async fn check_database(&self) -> Result<(), DomainError> {
        self.repo.ping().await
    }

    pub fn pool_stats(&self) -> Option<PoolStats> {
        self.repo.pool_stats()
    }
}
