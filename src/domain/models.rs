use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum accepted length of a student name, in characters
pub const MAX_NAME_LENGTH: usize = 100;

/// Request body of `POST /predict`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub name: String,
    pub hours_studied: f64,
}

/// A request that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedInput {
    pub name: String,
    pub hours: f64,
}

impl PredictionRequest {
    pub fn validate(&self) -> Result<ValidatedInput, DomainError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(DomainError::Validation("name must not be empty".to_string()));
        }
        if name.chars().count() > MAX_NAME_LENGTH {
            return Err(DomainError::Validation(format!(
                "name must be at most {} characters",
                MAX_NAME_LENGTH
            )));
        }
        if !self.hours_studied.is_finite() {
            return Err(DomainError::Validation(
                "hours_studied must be a finite number".to_string(),
            ));
        }

        Ok(ValidatedInput {
            name: name.to_string(),
            hours: self.hours_studied,
        })
    }
}

/// A prediction that has not been written yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewPrediction {
    pub id: Uuid,
    pub name: String,
    pub hours: f64,
    pub score: f64,
    pub created_at: DateTime<Utc>,
}

impl NewPrediction {
    pub fn new(input: ValidatedInput, score: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: input.name,
            hours: input.hours,
            score,
            created_at: Utc::now(),
        }
    }
}

/// A stored prediction row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub id: Uuid,
    pub name: String,
    pub hours: f64,
    pub score: f64,
    pub created_at: DateTime<Utc>,
}

impl From<NewPrediction> for Prediction {
    fn from(new: NewPrediction) -> Self {
        Self {
            id: new.id,
            name: new.name,
            hours: new.hours,
            score: new.score,
            created_at: new.created_at,
        }
    }
}

/// Response body of `POST /predict`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub id: Uuid,
    pub predicted_score: f64,
}

impl From<&Prediction> for PredictionResponse {
    fn from(prediction: &Prediction) -> Self {
        Self {
            id: prediction.id,
            predicted_score: prediction.score,
        }
    }
}

/// Aggregates over every stored prediction.
/// Averages and extrema are `None` while the table is empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionSummary {
    pub total_predictions: i64,
    pub average_score: Option<f64>,
    pub average_hours: Option<f64>,
    pub min_score: Option<f64>,
    pub max_score: Option<f64>,
    pub last_prediction_at: Option<DateTime<Utc>>,
}

/// Connection pool occupancy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    pub size: u32,
    pub idle: u32,
    pub max_connections: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}
