//! Configuration: scheduling policy knobs and the web server bind address.
//!
//! Every value comes from an environment variable with a default; see
//! [`ServerConfig::from_env`].

use serde::{Deserialize, Serialize};

/// Policy inputs for slot, group and bracket generation.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SchedulingConfig {
    /// Length of a regular slot.
    pub match_duration_minutes: u32,
    /// Shortest trailing slot worth creating at the end of a window.
    pub min_slot_minutes: u32,
    pub group_min_size: usize,
    pub group_max_size: usize,
    /// Group size the generator aims for when several group counts are feasible.
    pub group_preferred_size: usize,
    /// Default qualification after a group stage: top N per group ...
    pub qualifiers_per_group: u32,
    /// ... plus this many best-placed non-qualifiers.
    pub wildcards: u32,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            match_duration_minutes: 90,
            min_slot_minutes: 60,
            group_min_size: 3,
            group_max_size: 5,
            group_preferred_size: 4,
            qualifiers_per_group: 2,
            wildcards: 0,
        }
    }
}

impl SchedulingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.match_duration_minutes == 0 {
            return Err(ConfigError::invalid("MATCH_DURATION_MINUTES", "must be positive"));
        }
        if self.min_slot_minutes == 0 || self.min_slot_minutes > self.match_duration_minutes {
            return Err(ConfigError::invalid(
                "MIN_SLOT_MINUTES",
                format!("must be in 1..={}", self.match_duration_minutes),
            ));
        }
        if self.group_min_size < 2 {
            return Err(ConfigError::invalid("GROUP_MIN_SIZE", "must be at least 2"));
        }
        if self.group_max_size < self.group_min_size {
            return Err(ConfigError::invalid(
                "GROUP_MAX_SIZE",
                format!("cannot be below GROUP_MIN_SIZE ({})", self.group_min_size),
            ));
        }
        if !(self.group_min_size..=self.group_max_size).contains(&self.group_preferred_size) {
            return Err(ConfigError::invalid(
                "GROUP_PREFERRED_SIZE",
                format!("must be in {}..={}", self.group_min_size, self.group_max_size),
            ));
        }
        if self.qualifiers_per_group == 0 {
            return Err(ConfigError::invalid("QUALIFIERS_PER_GROUP", "must be positive"));
        }
        Ok(())
    }
}

/// Complete server configuration loaded from environment variables.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub scheduling: SchedulingConfig,
    /// How many times a transaction re-runs after losing a commit race.
    pub tx_max_retries: u32,
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set but does not parse, or if a value
    /// parses but violates a policy constraint.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = SchedulingConfig::default();
        let scheduling = SchedulingConfig {
            match_duration_minutes: parse_env_or("MATCH_DURATION_MINUTES", defaults.match_duration_minutes)?,
            min_slot_minutes: parse_env_or("MIN_SLOT_MINUTES", defaults.min_slot_minutes)?,
            group_min_size: parse_env_or("GROUP_MIN_SIZE", defaults.group_min_size)?,
            group_max_size: parse_env_or("GROUP_MAX_SIZE", defaults.group_max_size)?,
            group_preferred_size: parse_env_or("GROUP_PREFERRED_SIZE", defaults.group_preferred_size)?,
            qualifiers_per_group: parse_env_or("QUALIFIERS_PER_GROUP", defaults.qualifiers_per_group)?,
            wildcards: parse_env_or("WILDCARDS", defaults.wildcards)?,
        };
        let config = Self {
            host: env_or("HOST", "0.0.0.0".to_string(), |raw| Ok(raw.to_string()))?,
            port: parse_env_or("PORT", 8080)?,
            scheduling,
            tx_max_retries: parse_env_or("TX_MAX_RETRIES", 5)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tx_max_retries == 0 {
            return Err(ConfigError::invalid("TX_MAX_RETRIES", "must be positive"));
        }
        self.scheduling.validate()
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

impl ConfigError {
    fn invalid(var: &str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            var: var.to_string(),
            reason: reason.into(),
        }
    }
}

/// Helper to parse environment variable with default fallback.
///
/// Only an unset variable falls back to `default`; a set but malformed value is an error.
fn parse_env_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    env_or(key, default, |raw| parse_value(key, raw))
}

fn env_or<T>(
    key: &str,
    default: T,
    parse: impl FnOnce(&str) -> Result<T, ConfigError>,
) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => parse(&raw),
        Err(std::env::VarError::NotPresent) => Ok(default),
        Err(e) => Err(ConfigError::invalid(key, e.to_string())),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| ConfigError::invalid(key, format!("cannot parse {raw:?}: {e}")))
}
