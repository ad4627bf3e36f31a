use std::env;
use std::fmt;
use std::time::Duration;

use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;

use crate::domain::models::DomainError;
use crate::domain::scoring::ScoreModel;
use crate::utils::redact_password;

/// Plain environment variables accepted for containerized deployment,
/// mapped onto configuration keys.
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("HOST", "server.host"),
    ("PORT", "server.port"),
    ("DATABASE_URL", "database.url"),
    ("DB_HOST", "database.host"),
    ("DB_PORT", "database.port"),
    ("DB_NAME", "database.name"),
    ("DB_USER", "database.username"),
    ("DB_PASSWORD", "database.password"),
    ("DB_MAX_CONNECTIONS", "database.max_connections"),
    ("DB_MIN_CONNECTIONS", "database.min_connections"),
    ("DB_ACQUIRE_TIMEOUT_SECS", "database.acquire_timeout_secs"),
    ("SCORE_HOURS_WEIGHT", "scoring.hours_weight"),
    ("SCORE_OFFSET", "scoring.offset"),
    ("SCORE_NOISE", "scoring.noise"),
    ("SCORE_MIN", "scoring.min_score"),
    ("SCORE_MAX", "scoring.max_score"),
    ("HEALTH_CHECK_INTERVAL_SECS", "health.interval_secs"),
];

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub scoring: ScoringConfig,
    pub health: HealthConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Clone)]
pub struct DatabaseConfig {
    /// Full connection URL; takes precedence over the discrete fields
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub name: String,
    pub username: String,
    pub password: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScoringConfig {
    pub hours_weight: f64,
    pub offset: f64,
    pub noise: i32,
    /// Optional lower floor; scores are only capped from above when unset
    pub min_score: Option<f64>,
    pub max_score: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HealthConfig {
    pub interval_secs: u64,
}

impl AppConfig {
    /// Load configuration from defaults, optional files under `config/`,
    /// `APP__SECTION__KEY` variables and the plain container variables.
    pub fn load() -> Result<Self, ConfigError> {
        // Get the environment (default is development)
        let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "development".into());

        let builder = Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_env)).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            );

        Self::finish(Self::apply_overrides(builder, |key| env::var(key).ok())?)
    }

    /// Build configuration from defaults plus the plain variables returned by `lookup`
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::finish(Self::apply_overrides(Self::defaults()?, lookup)?)
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("database.host", "db")?
            .set_default("database.port", 5432)?
            .set_default("database.name", "predictions")?
            .set_default("database.username", "user")?
            .set_default("database.password", "password")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 0)?
            .set_default("database.acquire_timeout_secs", 5)?
            .set_default("scoring.hours_weight", 10.0)?
            .set_default("scoring.offset", 0.0)?
            .set_default("scoring.noise", 5)?
            .set_default("scoring.max_score", 100.0)?
            .set_default("health.interval_secs", 30)
    }

    fn apply_overrides<F>(
        mut builder: ConfigBuilder<DefaultState>,
        lookup: F,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        for (var, key) in ENV_OVERRIDES {
            let value = lookup(var).filter(|v| !v.trim().is_empty());
            builder = builder.set_override_option(*key, value)?;
        }
        Ok(builder)
    }

    fn finish(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database.max_connections == 0 {
            return Err(ConfigError::Message(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigError::Message(format!(
                "database.min_connections ({}) exceeds database.max_connections ({})",
                self.database.min_connections, self.database.max_connections
            )));
        }
        if self.health.interval_secs == 0 {
            return Err(ConfigError::Message(
                "health.interval_secs must be at least 1".to_string(),
            ));
        }
        self.scoring
            .model()
            .map_err(|e| ConfigError::Message(e.to_string()))?;
        Ok(())
    }
}

impl DatabaseConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    /// Connection target safe for logs
    pub fn display_target(&self) -> String {
        match &self.url {
            Some(url) => redact_password(url),
            None => format!(
                "postgres://{}@{}:{}/{}",
                self.username, self.host, self.port, self.name
            ),
        }
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("target", &self.display_target())
            .field("password", &"****")
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .finish()
    }
}

impl ScoringConfig {
    pub fn model(&self) -> Result<ScoreModel, DomainError> {
        ScoreModel::new(
            self.hours_weight,
            self.offset,
            self.noise,
            self.min_score,
            self.max_score,
        )
    }
}

impl HealthConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}
