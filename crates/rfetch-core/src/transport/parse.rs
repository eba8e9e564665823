//! Parse raw header lines delivered by curl.

/// Status code from an HTTP status line (`HTTP/1.1 503 Service Unavailable`,
/// `HTTP/2 200`). Returns `None` for ordinary header lines.
pub(crate) fn parse_status_line(line: &str) -> Option<u16> {
    let line = line.trim();
    let rest = line.strip_prefix("HTTP/")?;
    let mut parts = rest.split_whitespace();
    let _version = parts.next()?;
    let code = parts.next()?;
    if code.len() != 3 {
        return None;
    }
    code.parse::<u16>().ok().filter(|c| (100..=999).contains(c))
}
