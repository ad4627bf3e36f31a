use async_trait::async_trait;

use crate::domain::models::{
    DomainError, NewPrediction, PoolStats, Prediction, PredictionSummary,
};

/// Repository interface for prediction storage
#[async_trait]
pub trait PredictionRepository: Send + Sync {
    /// Persist a scored prediction
    async fn record_prediction(&self, prediction: NewPrediction)
        -> Result<Prediction, DomainError>;

    /// Aggregate statistics over every stored prediction
    async fn summary(&self) -> Result<PredictionSummary, DomainError>;

    /// Check that the store answers queries
    async fn ping(&self) -> Result<(), DomainError>;

    /// Current pool occupancy, if the backend is pooled
    fn pool_stats(&self) -> Option<PoolStats>;
}
