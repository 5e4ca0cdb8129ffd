use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use storage::services::rating::RatingConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Comma separated; empty leaves every protected route closed
    pub api_keys: String,
    pub request_timeout: Duration,
    pub rating: RatingConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: std::env::var("HOST").context("Cannot load HOST env variable")?,
            port: std::env::var("PORT")
                .context("Cannot load PORT env variable")?
                .parse()
                .context("PORT must be a number")?,
            database_url: std::env::var("DATABASE_URL")
                .context("Cannot load DATABASE_URL env variable")?,
            api_keys: std::env::var("API_KEYS").unwrap_or_default(),
            request_timeout: Duration::from_secs(optional_env("REQUEST_TIMEOUT_SECS")?.unwrap_or(30)),
            rating: rating_config_from_env()?,
        })
    }
}

/// Rating constants, each overridable through a `RATING_*` variable
fn rating_config_from_env() -> Result<RatingConfig> {
    let defaults = RatingConfig::default();

    let config = RatingConfig {
        k_factor_base: optional_env("RATING_K_FACTOR_BASE")?.unwrap_or(defaults.k_factor_base),
        expectation_spread: optional_env("RATING_EXPECTATION_SPREAD")?
            .unwrap_or(defaults.expectation_spread),
        time_decay: optional_env("RATING_TIME_DECAY")?.unwrap_or(defaults.time_decay),
        base_decay_rate: optional_env("RATING_BASE_DECAY_RATE")?.unwrap_or(defaults.base_decay_rate),
        min_decay_factor: optional_env("RATING_MIN_DECAY_FACTOR")?
            .unwrap_or(defaults.min_decay_factor),
        rank_bonus: optional_env("RATING_RANK_BONUS")?.unwrap_or(defaults.rank_bonus),
        max_delta: optional_env("RATING_MAX_DELTA")?.unwrap_or(defaults.max_delta),
        ..defaults
    };

    if config.expectation_spread <= 0.0 || config.max_delta < 0.0 {
        anyhow::bail!("RATING_EXPECTATION_SPREAD must be positive and RATING_MAX_DELTA non-negative");
    }

    Ok(config)
}

fn optional_env<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{name} has an invalid value")),
        _ => Ok(None),
    }
}
