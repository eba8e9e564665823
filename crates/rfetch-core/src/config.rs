use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::retry::{RetryConfig, RetryOptions};
use crate::transport::CurlOptions;

/// Global configuration loaded from `~/.config/rfetch/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RfetchConfig {
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Abort a transfer that stays below 1 KiB/s for this many seconds.
    pub low_speed_time_secs: u64,
    /// Optional User-Agent header.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Optional proxy URL; unset defers to the `*_proxy` environment variables.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
    /// Optional retry section; unset fields fall back to one attempt, 1s fixed backoff.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry: Option<RetryOptions>,
}

impl Default for RfetchConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            low_speed_time_secs: 60,
            user_agent: None,
            proxy: None,
            retry: None,
        }
    }
}

impl RfetchConfig {
    /// Retry options from the file, with `overrides` (e.g. CLI flags) on top,
    /// resolved into a fresh config for one fetch.
    pub fn retry_config(&self, overrides: RetryOptions) -> Result<RetryConfig> {
        let opts = self.retry.unwrap_or_default().merge(overrides);
        opts.resolve().context("invalid retry settings")
    }

    pub fn curl_options(&self) -> CurlOptions {
        CurlOptions {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            low_speed_time: Duration::from_secs(self.low_speed_time_secs),
            user_agent: self.user_agent.clone(),
            proxy: self.proxy.clone(),
            ..CurlOptions::default()
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("rfetch")?;
    Ok(xdg_dirs.get_config_home().join("rfetch").join("config.toml"))
}

/// Load configuration from `path`; a missing file yields the defaults.
pub fn load_from_path(path: &Path) -> Result<RfetchConfig> {
    if !path.exists() {
        tracing::debug!("no config at {}, using defaults", path.display());
        return Ok(RfetchConfig::default());
    }
    let data =
        fs::read_to_string(path).with_context(|| format!("read config: {}", path.display()))?;
    let cfg: RfetchConfig =
        toml::from_str(&data).with_context(|| format!("parse config: {}", path.display()))?;
    Ok(cfg)
}

/// Load configuration from the XDG config dir, or defaults if there is none.
pub fn load_or_default() -> Result<RfetchConfig> {
    load_from_path(&config_path()?)
}
