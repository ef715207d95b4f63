//! Duration literals as written in `update_interval`.

use crate::error::{LocateError, Result};

/// Interval used when the literal is empty.
pub const DEFAULT_INTERVAL_MS: u32 = 50;

/// Literal used when an effect has no `update_interval` field.
pub const DEFAULT_UPDATE_INTERVAL: &str = "100ms";

/// Parse a duration literal into milliseconds.
///
/// Accepts the empty string (50ms), `<n>ms` and `<n>s`. Anything else is an
/// error; bare numbers are rejected since their unit is ambiguous.
pub fn parse_interval(literal: &str) -> Result<u32> {
    if literal.is_empty() {
        return Ok(DEFAULT_INTERVAL_MS);
    }
    let unknown = || LocateError::UnknownInterval(literal.to_string());
    if let Some(ms) = literal.strip_suffix("ms") {
        return ms.parse().map_err(|_| unknown());
    }
    if let Some(secs) = literal.strip_suffix('s') {
        let secs: u32 = secs.parse().map_err(|_| unknown())?;
        return secs.checked_mul(1000).ok_or_else(unknown);
    }
    Err(unknown())
}

/// Parse a duration literal and raise it to at least `min_ms`.
pub fn resolve_interval(literal: &str, min_ms: u32) -> Result<u32> {
    Ok(parse_interval(literal)?.max(min_ms))
}
