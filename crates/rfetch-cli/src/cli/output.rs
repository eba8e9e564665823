//! Output file naming.

use std::path::PathBuf;

/// Fallback when the URL path gives no usable name.
pub const FALLBACK_NAME: &str = "download.bin";

/// Last non-empty path segment of `url`, or `None` for roots and `.`/`..`.
fn filename_from_url_path(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed.path().split('/').filter(|s| !s.is_empty()).last()?;
    if segment == "." || segment == ".." {
        return None;
    }
    Some(segment.to_string())
}

/// File name to save `url` under when `--output` is not given.
pub fn default_output_name(url: &str) -> PathBuf {
    PathBuf::from(filename_from_url_path(url).unwrap_or_else(|| FALLBACK_NAME.to_string()))
}
