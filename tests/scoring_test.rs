use rand::rngs::StdRng;
use rand::SeedableRng;
use rstest::rstest;
use study_score_service::domain::models::DomainError;
use study_score_service::domain::scoring::ScoreModel;
use tokio_test::{assert_err, assert_ok};

#[rstest]
#[case(0.0, 0, 0.0)]
#[case(4.5, 0, 45.0)]
#[case(4.5, 3, 48.0)]
#[case(4.5, -5, 40.0)]
#[case(9.8, 5, 100.0)]
#[case(0.2, -5, -3.0)]
#[case(0.0, -5, -5.0)]
#[case(-3.0, 0, -30.0)]
#[case(1000.0, 0, 100.0)]
fn test_default_model_scores(#[case] hours: f64, #[case] noise: i32, #[case] expected: f64) {
    let model = ScoreModel::default();
    assert_eq!(model.score(hours, noise), expected);
}

#[rstest]
#[case(0.2, -5, 0.0)]
#[case(-3.0, 0, 0.0)]
#[case(4.5, 0, 45.0)]
#[case(20.0, 0, 100.0)]
fn test_optional_floor_is_applied(#[case] hours: f64, #[case] noise: i32, #[case] expected: f64) {
    let model = assert_ok!(ScoreModel::new(10.0, 0.0, 5, Some(0.0), 100.0));
    assert_eq!(model.score(hours, noise), expected);
}

#[test]
fn test_offset_and_weight_are_applied() {
    let model = assert_ok!(ScoreModel::new(7.0, 12.0, 0, Some(0.0), 100.0));
    assert_eq!(model.score(2.0, 0), 26.0);
    assert_eq!(model.score(2.0, -4), 22.0);
}

#[test]
fn test_default_model_has_no_floor() {
    assert_eq!(ScoreModel::default().range(), (None, 100.0));
}

#[test]
fn test_noise_stays_within_amplitude() {
    let model = ScoreModel::default();
    let mut rng = StdRng::seed_from_u64(42);

    let draws: Vec<i32> = (0..500).map(|_| model.sample_noise(&mut rng)).collect();

    assert!(draws.iter().all(|n| (-5..=5).contains(n)));
    // 500回の試行で両端の値が出ることを確認
    assert!(draws.contains(&-5));
    assert!(draws.contains(&5));
}

#[test]
fn test_predict_is_capped_and_near_linear() {
    let model = ScoreModel::default();
    let mut rng = StdRng::seed_from_u64(7);

    for hours in [-2.0, 0.0, 0.3, 5.0, 9.7, 10.0, 250.0] {
        let score = model.predict(hours, &mut rng);
        assert!(score <= 100.0, "score {} above cap", score);
        assert!(
            (score - hours * 10.0).abs() <= 5.0 || score == 100.0,
            "score {} too far from {}",
            score,
            hours * 10.0
        );
    }
}

#[test]
fn test_zero_noise_is_deterministic() {
    let model = assert_ok!(ScoreModel::new(10.0, 0.0, 0, None, 100.0));
    let mut rng = StdRng::seed_from_u64(1);
    assert_eq!(model.predict(3.3, &mut rng), 33.0);
    assert_eq!(model.predict(3.3, &mut rng), 33.0);
}

#[rstest]
#[case(f64::NAN, 0.0, 5, None, 100.0)]
#[case(10.0, f64::INFINITY, 5, None, 100.0)]
#[case(10.0, 0.0, -1, None, 100.0)]
#[case(10.0, 0.0, 5, Some(100.0), 0.0)]
#[case(10.0, 0.0, 5, Some(f64::NEG_INFINITY), 100.0)]
#[case(10.0, 0.0, 5, None, f64::INFINITY)]
fn test_invalid_models_are_rejected(
    #[case] weight: f64,
    #[case] offset: f64,
    #[case] noise: i32,
    #[case] min: Option<f64>,
    #[case] max: f64,
) {
    let err = assert_err!(ScoreModel::new(weight, offset, noise, min, max));
    assert!(matches!(err, DomainError::Configuration(_)));
}
