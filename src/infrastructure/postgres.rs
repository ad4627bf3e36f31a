use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use tokio::sync::OnceCell;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::models::{DomainError, NewPrediction, PoolStats, Prediction, PredictionSummary};
use crate::domain::services::PredictionRepository;
use crate::infrastructure::config::DatabaseConfig;

const CREATE_PREDICTIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS predictions (
    id UUID PRIMARY KEY,
    name TEXT NOT NULL,
    hours DOUBLE PRECISION NOT NULL,
    score DOUBLE PRECISION NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

const INSERT_PREDICTION: &str = r#"
INSERT INTO predictions (id, name, hours, score, created_at)
VALUES ($1, $2, $3, $4, $5)
RETURNING id, name, hours, score, created_at
"#;

const SUMMARY_QUERY: &str = r#"
SELECT
    COUNT(*) AS total_predictions,
    AVG(score) AS average_score,
    AVG(hours) AS average_hours,
    MIN(score) AS min_score,
    MAX(score) AS max_score,
    MAX(created_at) AS last_prediction_at
FROM predictions
"#;

/// Create a PostgreSQL connection pool.
///
/// The pool connects lazily so the server can come up before the
/// database does; the first query or health check opens connections.
pub fn create_pool(config: &DatabaseConfig) -> Result<PgPool, DomainError> {
    let options = connect_options(config)?;

    debug!(
        "Creating pool for {} (max {}, min {})",
        config.display_target(),
        config.max_connections,
        config.min_connections
    );

    Ok(PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout())
        .connect_lazy_with(options))
}

fn connect_options(config: &DatabaseConfig) -> Result<PgConnectOptions, DomainError> {
    match &config.url {
        Some(url) => PgConnectOptions::from_str(url)
            .map_err(|e| DomainError::Configuration(format!("Invalid database URL: {}", e))),
        None => Ok(PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .database(&config.name)
            .username(&config.username)
            .password(&config.password)),
    }
}

fn db_error(e: sqlx::Error) -> DomainError {
    DomainError::Database(e.to_string())
}

#[derive(sqlx::FromRow)]
struct PredictionRow {
    id: Uuid,
    name: String,
    hours: f64,
    score: f64,
    created_at: DateTime<Utc>,
}

impl From<PredictionRow> for Prediction {
    fn from(row: PredictionRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            hours: row.hours,
            score: row.score,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SummaryRow {
    total_predictions: i64,
    average_score: Option<f64>,
    average_hours: Option<f64>,
    min_score: Option<f64>,
    max_score: Option<f64>,
    last_prediction_at: Option<DateTime<Utc>>,
}

impl From<SummaryRow> for PredictionSummary {
    fn from(row: SummaryRow) -> Self {
        Self {
            total_predictions: row.total_predictions,
            average_score: row.average_score,
            average_hours: row.average_hours,
            min_score: row.min_score,
            max_score: row.max_score,
            last_prediction_at: row.last_prediction_at,
        }
    }
}

/// PostgreSQL implementation of the prediction repository
pub struct PostgresPredictionRepository {
    pool: PgPool,
    schema: OnceCell<()>,
}

impl PostgresPredictionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            schema: OnceCell::new(),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the predictions table once per process.
    /// A failed attempt is retried on the next call.
    pub async fn ensure_schema(&self) -> Result<(), DomainError> {
        self.schema
            .get_or_try_init(|| async {
                sqlx::query(CREATE_PREDICTIONS_TABLE)
                    .execute(&self.pool)
                    .await
                    .map_err(db_error)?;
                info!("Predictions table is ready");
                Ok::<(), DomainError>(())
            })
            .await?;
        Ok(())
    }

    pub async fn close(&self) {
        info!("Closing database pool");
        self.pool.close().await;
    }
}

#[async_trait]
impl PredictionRepository for PostgresPredictionRepository {
    async fn record_prediction(
        &self,
        prediction: NewPrediction,
    ) -> Result<Prediction, DomainError> {
        self.ensure_schema().await?;

        let row = sqlx::query_as::<_, PredictionRow>(INSERT_PREDICTION)
            .bind(prediction.id)
            .bind(&prediction.name)
            .bind(prediction.hours)
            .bind(prediction.score)
            .bind(prediction.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(row.into())
    }

    async fn summary(&self) -> Result<PredictionSummary, DomainError> {
        self.ensure_schema().await?;

        let row = sqlx::query_as::<_, SummaryRow>(SUMMARY_QUERY)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(row.into())
    }

    async fn ping(&self) -> Result<(), DomainError> {
        let (one,): (i32,) = sqlx::query_as("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?;

        if one == 1 {
            Ok(())
        } else {
            Err(DomainError::Database(format!(
                "Unexpected ping result: {}",
                one
            )))
        }
    }

    fn pool_stats(&self) -> Option<PoolStats> {
        Some(PoolStats {
            size: self.pool.size(),
            idle: u32::try_from(self.pool.num_idle()).unwrap_or(u32::MAX),
            max_connections: self.pool.options().get_max_connections(),
        })
    }
}
