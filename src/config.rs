use std::env;
use thiserror::Error;

/// Errors raised while reading configuration from the environment
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Invalid clamp band '{0}', expected <min>-<max> in minutes")]
    InvalidClampBand(String),
}

/// Rules of the rotation engine
#[derive(Debug, Clone, PartialEq)]
pub struct RotationConfig {
    /// Consecutive wins after which a team leaves the court
    pub win_out_threshold: u32,
    /// Number of most recent history records captured in an undo snapshot
    pub undo_history_depth: usize,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            win_out_threshold: 2,
            undo_history_depth: 5,
        }
    }
}

/// Inclusive band applied to the computed average match duration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DurationBand {
    pub min_ms: i64,
    pub max_ms: i64,
}

impl DurationBand {
    pub fn from_minutes(min: i64, max: i64) -> Self {
        Self {
            min_ms: min * 60_000,
            max_ms: max * 60_000,
        }
    }

    pub fn apply(&self, duration_ms: i64) -> i64 {
        duration_ms.clamp(self.min_ms, self.max_ms)
    }
}

/// Settings for the queue wait-time estimator
#[derive(Debug, Clone, PartialEq)]
pub struct EstimatorConfig {
    /// Used when history is too short to derive an average
    pub default_match_duration_ms: i64,
    /// Maximum number of consecutive gaps averaged
    pub duration_window: usize,
    /// Optional clamp of the computed average; `None` keeps it unclamped
    pub clamp: Option<DurationBand>,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            default_match_duration_ms: 10 * 60 * 1000, // 10 minutes
            duration_window: 10,
            clamp: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// PostgreSQL connection string; the in-memory store is used when absent
    pub database_url: Option<String>,
    pub history_limit: usize,
    pub event_channel_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            database_url: None,
            history_limit: 200,
            event_channel_capacity: 100,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub rotation: RotationConfig,
    pub estimator: EstimatorConfig,
}

impl AppConfig {
    /// Loads configuration from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = AppConfig::default();

        let server = ServerConfig {
            host: lookup("HOST").unwrap_or(defaults.server.host),
            port: parse_or(&lookup, "PORT", defaults.server.port)?,
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            history_limit: parse_or(&lookup, "HISTORY_LIMIT", defaults.server.history_limit)?,
            event_channel_capacity: parse_or(
                &lookup,
                "EVENT_CHANNEL_CAPACITY",
                defaults.server.event_channel_capacity,
            )?,
        };

        let rotation = RotationConfig {
            win_out_threshold: parse_or(
                &lookup,
                "WIN_OUT_THRESHOLD",
                defaults.rotation.win_out_threshold,
            )?,
            undo_history_depth: parse_or(
                &lookup,
                "UNDO_HISTORY_DEPTH",
                defaults.rotation.undo_history_depth,
            )?,
        };
        if rotation.win_out_threshold == 0 {
            return Err(ConfigError::InvalidValue {
                key: "WIN_OUT_THRESHOLD",
                value: "0".to_string(),
            });
        }

        let default_secs = defaults.estimator.default_match_duration_ms / 1000;
        let estimator = EstimatorConfig {
            default_match_duration_ms: parse_or(
                &lookup,
                "DEFAULT_MATCH_DURATION_SECS",
                default_secs,
            )? * 1000,
            duration_window: parse_or(
                &lookup,
                "ESTIMATE_WINDOW",
                defaults.estimator.duration_window,
            )?,
            clamp: match lookup("ESTIMATE_CLAMP_MINUTES") {
                Some(raw) => Some(parse_band(&raw)?),
                None => None,
            },
        };

        Ok(Self {
            server,
            rotation,
            estimator,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
        None => Ok(default),
    }
}

fn parse_band(raw: &str) -> Result<DurationBand, ConfigError> {
    let invalid = || ConfigError::InvalidClampBand(raw.to_string());
    let (min, max) = raw.trim().split_once('-').ok_or_else(invalid)?;
    let min: i64 = min.trim().parse().map_err(|_| invalid())?;
    let max: i64 = max.trim().parse().map_err(|_| invalid())?;
    if min <= 0 || max < min {
        return Err(invalid());
    }
    Ok(DurationBand::from_minutes(min, max))
}
