//! Retry configuration: the resolved `RetryConfig` value and the partial
//! `RetryOptions` surface it is built from.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Default retry budget: one attempt, no retries.
pub const DEFAULT_RETRIES: u32 = 0;
/// Default backoff base in seconds.
pub const DEFAULT_BACKOFF_SECS: f64 = 1.0;

/// How the delay between attempts grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffType {
    /// Same delay before every retry.
    #[default]
    Fixed,
    /// Delay doubles with each retry, starting at the base.
    Exponential,
}

impl std::str::FromStr for BackoffType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed" => Ok(BackoffType::Fixed),
            "exponential" => Ok(BackoffType::Exponential),
            other => Err(ConfigError::UnknownBackoffType(other.to_string())),
        }
    }
}

/// Invalid retry configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("backoff base must be greater than zero")]
    NonPositiveBackoff,
    #[error("backoff must be a finite number of seconds, got {0}")]
    InvalidBackoff(f64),
    #[error("max delay must be a finite, non-negative number of seconds, got {0}")]
    InvalidMaxDelay(f64),
    #[error("unknown backoff type {0:?} (expected \"fixed\" or \"exponential\")")]
    UnknownBackoffType(String),
}

/// Resolved, immutable retry parameters for one fetch.
///
/// Each fetch holds its own copy; nothing mutates it after construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    max_retries: u32,
    backoff_base: Duration,
    backoff_type: BackoffType,
    max_delay: Option<Duration>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_RETRIES,
            backoff_base: Duration::from_secs(1),
            backoff_type: BackoffType::Fixed,
            max_delay: None,
        }
    }
}

impl RetryConfig {
    /// Builds a config; `backoff_base` must be non-zero.
    pub fn new(
        max_retries: u32,
        backoff_base: Duration,
        backoff_type: BackoffType,
    ) -> Result<Self, ConfigError> {
        if backoff_base.is_zero() {
            return Err(ConfigError::NonPositiveBackoff);
        }
        Ok(Self {
            max_retries,
            backoff_base,
            backoff_type,
            max_delay: None,
        })
    }

    /// Caps every computed delay at `max_delay`.
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = Some(max_delay);
        self
    }

    /// Retries allowed after the first attempt.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn backoff_base(&self) -> Duration {
        self.backoff_base
    }

    pub fn backoff_type(&self) -> BackoffType {
        self.backoff_type
    }

    pub fn max_delay(&self) -> Option<Duration> {
        self.max_delay
    }
}

/// Partially specified retry options, as found in `config.toml` or on the
/// command line. Unset fields fall back to the defaults on `resolve`.
///
/// Times are in seconds; fractions are allowed (`backoff = 0.25`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryOptions {
    /// Retries after the first attempt (default 0).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retries: Option<u32>,
    /// Backoff base in seconds (default 1).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backoff: Option<f64>,
    /// "fixed" (default) or "exponential".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backoff_type: Option<BackoffType>,
    /// Optional ceiling on a single delay, in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_delay: Option<f64>,
}

impl RetryOptions {
    /// Overlay `other` on top of `self`: fields set in `other` win.
    pub fn merge(self, other: RetryOptions) -> RetryOptions {
        RetryOptions {
            retries: other.retries.or(self.retries),
            backoff: other.backoff.or(self.backoff),
            backoff_type: other.backoff_type.or(self.backoff_type),
            max_delay: other.max_delay.or(self.max_delay),
        }
    }

    /// Fill unset fields with defaults and validate into a fresh `RetryConfig`.
    pub fn resolve(&self) -> Result<RetryConfig, ConfigError> {
        let backoff = self.backoff.unwrap_or(DEFAULT_BACKOFF_SECS);
        let base = secs_to_duration(backoff).ok_or(ConfigError::InvalidBackoff(backoff))?;
        let mut cfg = RetryConfig::new(
            self.retries.unwrap_or(DEFAULT_RETRIES),
            base,
            self.backoff_type.unwrap_or_default(),
        )?;
        if let Some(max) = self.max_delay {
            let max_delay = secs_to_duration(max).ok_or(ConfigError::InvalidMaxDelay(max))?;
            cfg = cfg.with_max_delay(max_delay);
        }
        Ok(cfg)
    }
}

fn secs_to_duration(secs: f64) -> Option<Duration> {
    if !secs.is_finite() || secs < 0.0 {
        return None;
    }
    Duration::try_from_secs_f64(secs).ok()
}
