use rand::Rng;
use serde::Serialize;

use crate::domain::models::DomainError;

/// Linear study-hours score with bounded integer noise.
///
/// `score = min(hours * hours_weight + offset + noise, max_score)`, floored at
/// `min_score` when one is set. `noise` is drawn uniformly from `[-noise, noise]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreModel {
    hours_weight: f64,
    offset: f64,
    noise: i32,
    min_score: Option<f64>,
    max_score: f64,
}

impl Default for ScoreModel {
    fn default() -> Self {
        Self {
            hours_weight: 10.0,
            offset: 0.0,
            noise: 5,
            min_score: None,
            max_score: 100.0,
        }
    }
}

impl ScoreModel {
    pub fn new(
        hours_weight: f64,
        offset: f64,
        noise: i32,
        min_score: Option<f64>,
        max_score: f64,
    ) -> Result<Self, DomainError> {
        if !hours_weight.is_finite() || !offset.is_finite() {
            return Err(DomainError::Configuration(
                "score weight and offset must be finite".to_string(),
            ));
        }
        if noise < 0 {
            return Err(DomainError::Configuration(format!(
                "score noise must not be negative, got {}",
                noise
            )));
        }
        if !max_score.is_finite() {
            return Err(DomainError::Configuration(format!(
                "score maximum must be finite, got {}",
                max_score
            )));
        }
        if let Some(min) = min_score {
            if !min.is_finite() || min > max_score {
                return Err(DomainError::Configuration(format!(
                    "invalid score range [{}, {}]",
                    min, max_score
                )));
            }
        }

        Ok(Self {
            hours_weight,
            offset,
            noise,
            min_score,
            max_score,
        })
    }

    pub fn noise(&self) -> i32 {
        self.noise
    }

    pub fn range(&self) -> (Option<f64>, f64) {
        (self.min_score, self.max_score)
    }

    /// Deterministic part of the model for a given noise draw
    pub fn score(&self, hours: f64, noise: i32) -> f64 {
        let raw = hours * self.hours_weight + self.offset + f64::from(noise);
        let capped = raw.min(self.max_score);
        match self.min_score {
            Some(min) => capped.max(min),
            None => capped,
        }
    }

    pub fn sample_noise<R: Rng + ?Sized>(&self, rng: &mut R) -> i32 {
        rng.gen_range(-self.noise..=self.noise)
    }

    pub fn predict<R: Rng + ?Sized>(&self, hours: f64, rng: &mut R) -> f64 {
        let noise = self.sample_noise(rng);
        self.score(hours, noise)
    }
}
