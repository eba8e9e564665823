//! `rfetch config` – show where config is read from and what it resolves to.

use anyhow::Result;
use rfetch_core::config::{self, RfetchConfig};
use rfetch_core::retry::RetryOptions;

pub fn run_config(cfg: &RfetchConfig, overrides: RetryOptions) -> Result<()> {
    let path = config::config_path()?;
    let state = if path.exists() { "" } else { " (not present, using defaults)" };
    println!("config: {}{}", path.display(), state);

    let retry = cfg.retry_config(overrides)?;
    println!("retries:       {}", retry.max_retries());
    println!("backoff:       {:?}", retry.backoff_base());
    println!("backoff type:  {:?}", retry.backoff_type());
    match retry.max_delay() {
        Some(max) => println!("max delay:     {:?}", max),
        None => println!("max delay:     unbounded"),
    }
    println!("connect timeout: {}s", cfg.connect_timeout_secs);
    Ok(())
}
