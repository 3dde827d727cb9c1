use std::time::Duration;
use tracing::warn;

/// Parse a token TTL such as `15m`, `1h 30m` or `7d`.
///
/// A bare `<days>d` is handled here; everything else goes through
/// `humantime`. Unparsable input yields `Duration::ZERO`, which callers must
/// reject as a configuration error.
pub fn parse_ttl(raw: &str) -> Duration {
    let raw = raw.trim();
    let parsed = match raw.strip_suffix('d').and_then(|n| n.parse::<u64>().ok()) {
        Some(days) => Ok(Duration::from_secs(days.saturating_mul(24 * 60 * 60))),
        None => humantime::parse_duration(raw),
    };

    match parsed {
        Ok(ttl) => ttl,
        Err(e) => {
            warn!(ttl = raw, error = %e, "unparsable ttl, treating as zero");
            Duration::ZERO
        }
    }
}
