mod common;

use std::sync::Arc;

use common::{sample_summary, MockPredictionRepo};
use study_score_service::application::services::PredictionService;
use study_score_service::domain::models::{DomainError, Prediction, PredictionRequest};
use study_score_service::domain::scoring::ScoreModel;

fn quiet_model() -> ScoreModel {
    ScoreModel::new(10.0, 0.0, 0, None, 100.0).unwrap()
}

fn request(name: &str, hours: f64) -> PredictionRequest {
    PredictionRequest {
        name: name.to_string(),
        hours_studied: hours,
    }
}

#[tokio::test]
async fn test_predict_records_scored_input() {
    let mut repo = MockPredictionRepo::new();
    repo.expect_record_prediction()
        .withf(|p| p.name == "Ada" && p.hours == 4.5 && p.score == 45.0)
        .times(1)
        .returning(|p| Ok(Prediction::from(p)));

    let service = PredictionService::new(Arc::new(repo), quiet_model());

    let prediction = service.predict(request(" Ada ", 4.5)).await.unwrap();
    assert_eq!(prediction.name, "Ada");
    assert_eq!(prediction.score, 45.0);
}

#[tokio::test]
async fn test_predict_clamps_to_upper_bound() {
    let mut repo = MockPredictionRepo::new();
    repo.expect_record_prediction()
        .withf(|p| p.score == 100.0)
        .times(1)
        .returning(|p| Ok(Prediction::from(p)));

    let service = PredictionService::new(Arc::new(repo), quiet_model());

    let prediction = service.predict(request("Ada", 40.0)).await.unwrap();
    assert_eq!(prediction.score, 100.0);
}

#[tokio::test]
async fn test_noisy_prediction_stays_near_linear_score() {
    let mut repo = MockPredictionRepo::new();
    repo.expect_record_prediction()
        .times(20)
        .returning(|p| Ok(Prediction::from(p)));

    let service = PredictionService::new(Arc::new(repo), ScoreModel::default());

    for _ in 0..20 {
        let prediction = service.predict(request("Ada", 5.0)).await.unwrap();
        assert!((45.0..=55.0).contains(&prediction.score));
    }
}

#[tokio::test]
async fn test_invalid_request_never_reaches_repository() {
    // 期待値を設定しないので、呼び出されるとパニックする
    let repo = MockPredictionRepo::new();
    let service = PredictionService::new(Arc::new(repo), quiet_model());

    let result = service.predict(request("", 3.0)).await;
    assert!(matches!(result, Err(DomainError::Validation(_))));

    let result = service.predict(request("Ada", -1.0)).await;
    assert!(matches!(result, Err(DomainError::Validation(_))));
}

#[tokio::test]
async fn test_database_failure_is_propagated() {
    let mut repo = MockPredictionRepo::new();
    repo.expect_record_prediction()
        .times(1)
        .returning(|_| Err(DomainError::Database("connection refused".to_string())));

    let service = PredictionService::new(Arc::new(repo), quiet_model());

    let result = service.predict(request("Ada", 2.0)).await;
    match result {
        Err(DomainError::Database(msg)) => assert_eq!(msg, "connection refused"),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_summary_and_ping_delegate_to_repository() {
    let summary = sample_summary();
    let expected = summary.clone();

    let mut repo = MockPredictionRepo::new();
    repo.expect_summary()
        .times(1)
        .returning(move || Ok(summary.clone()));
    repo.expect_ping().times(1).returning(|| Ok(()));
    repo.expect_pool_stats().times(1).returning(|| None);

    let service = PredictionService::new(Arc::new(repo), quiet_model());

    assert_eq!(service.summary().await.unwrap(), expected);
    assert!(service.check_database().await.is_ok());
    assert!(service.pool_stats().is_none());
}
