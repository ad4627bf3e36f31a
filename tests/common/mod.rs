#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use mockall::mock;
use study_score_service::domain::models::{
    DomainError, NewPrediction, PoolStats, Prediction, PredictionSummary,
};
use study_score_service::domain::services::PredictionRepository;

// リポジトリのモック
mock! {
    pub PredictionRepo {}

    #[async_trait]
    impl PredictionRepository for PredictionRepo {
        async fn record_prediction(&self, prediction: NewPrediction) -> Result<Prediction, DomainError>;
        async fn summary(&self) -> Result<PredictionSummary, DomainError>;
        async fn ping(&self) -> Result<(), DomainError>;
        fn pool_stats(&self) -> Option<PoolStats>;
    }
}

/// A repository that stores whatever it is given
pub fn echo_repo() -> MockPredictionRepo {
    let mut repo = MockPredictionRepo::new();
    repo.expect_record_prediction()
        .returning(|p| Ok(Prediction::from(p)));
    repo
}

pub fn sample_summary() -> PredictionSummary {
    PredictionSummary {
        total_predictions: 3,
        average_score: Some(52.5),
        average_hours: Some(5.0),
        min_score: Some(20.0),
        max_score: Some(90.0),
        last_prediction_at: Some(Utc::now()),
    }
}

pub fn sample_pool_stats() -> PoolStats {
    PoolStats {
        size: 2,
        idle: 1,
        max_connections: 10,
    }
}
