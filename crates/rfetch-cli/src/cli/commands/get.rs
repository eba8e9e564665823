//! `rfetch get <url>` – fetch with retry and save the body.

use anyhow::{Context, Result};
use rfetch_core::config::RfetchConfig;
use rfetch_core::retriable_fetch;
use rfetch_core::retry::RetryOptions;
use rfetch_core::transport::CurlTransport;
use std::path::Path;
use tokio::sync::oneshot;

use crate::cli::output::default_output_name;

pub async fn run_get(
    cfg: &RfetchConfig,
    url: &str,
    output: Option<&Path>,
    overrides: RetryOptions,
) -> Result<()> {
    let retry = cfg.retry_config(overrides)?;
    let transport = CurlTransport::new(cfg.curl_options());
    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output_name(url));

    tracing::info!(
        "fetching {} (retries={}, backoff={:?}, type={:?})",
        url,
        retry.max_retries(),
        retry.backoff_base(),
        retry.backoff_type()
    );

    let (tx, rx) = oneshot::channel();
    let handle = retriable_fetch(transport, url, retry, move |outcome| {
        let _ = tx.send(outcome);
    })?;

    let token = handle.cancellation_token();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, cancelling fetch");
            token.cancel();
        }
    });

    let outcome = rx.await.context("fetch task ended without reporting")?;
    let response = match outcome {
        Ok(response) => response,
        Err(e) => {
            ctrl_c.abort();
            return Err(e).with_context(|| format!("fetching {}", url));
        }
    };
    let attempts = response.attempts();

    let token = handle.cancellation_token();
    let written = tokio::select! {
        res = response.save_to(&path) => {
            res.with_context(|| format!("saving body to {}", path.display()))?
        }
        _ = token.cancelled() => {
            ctrl_c.abort();
            anyhow::bail!("interrupted while saving {}", path.display());
        }
    };
    ctrl_c.abort();

    println!(
        "saved {} ({} bytes, {} attempt{})",
        path.display(),
        written,
        attempts,
        if attempts == 1 { "" } else { "s" }
    );
    Ok(())
}
