//! Serde helper for human-readable duration strings like "500ms" or "30s".

use serde::{self, Deserialize, Deserializer};
use std::time::Duration;

pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) => parse_duration(&s).map_err(serde::de::Error::custom),
        None => Ok(Duration::ZERO),
    }
}

/// Parses "500ms", "30s", "5m", "1h" or a bare number of seconds. An empty
/// string maps to `Duration::ZERO`, which callers treat as "use the default".
pub(crate) fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(Duration::ZERO);
    }

    let (number, scale) = if let Some(n) = s.strip_suffix("ms") {
        (n, 1e-3)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1.0)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60.0)
    } else if let Some(n) = s.strip_suffix('h') {
        (n, 3600.0)
    } else if s.chars().all(|c| c.is_ascii_digit() || c == '.') {
        (s, 1.0)
    } else {
        let unit_start = s
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .unwrap_or(s.len());
        return Err(format!("unknown duration unit: {}", &s[unit_start..]));
    };

    let value: f64 = number
        .trim()
        .parse()
        .map_err(|_| format!("invalid duration number: {}", number))?;
    Ok(Duration::from_secs_f64(value * scale))
}
