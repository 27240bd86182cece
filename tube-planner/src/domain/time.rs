//! Trip duration handling.
//!
//! Observed trip durations arrive as "minutes:seconds" strings (e.g. "03:25").
//! This module parses them into [`chrono::Duration`] and renders modelled
//! travel times back into the same shape, or into a human-readable phrase.

use chrono::Duration;

/// Error returned when parsing an invalid duration string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid duration: {reason}")]
pub struct DurationError {
    reason: &'static str,
}

impl DurationError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// Parse a trip duration from "M:SS" / "MM:SS" format.
///
/// Minutes may have any number of digits; seconds must be two digits in
/// the range 0-59.
///
/// # Examples
///
/// ```
/// use tube_planner::domain::parse_mmss;
///
/// assert_eq!(parse_mmss("03:25").unwrap().num_seconds(), 205);
/// assert_eq!(parse_mmss("112:00").unwrap().num_seconds(), 6720);
///
/// assert!(parse_mmss("0325").is_err());
/// assert!(parse_mmss("03:75").is_err());
/// ```
pub fn parse_mmss(s: &str) -> Result<Duration, DurationError> {
    let s = s.trim();
    let (minutes, seconds) = s
        .split_once(':')
        .ok_or_else(|| DurationError::new("expected MM:SS format"))?;

    if minutes.is_empty() || !minutes.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DurationError::new("invalid minute digits"));
    }
    if seconds.len() != 2 || !seconds.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DurationError::new("invalid second digits"));
    }

    let minutes: i64 = minutes
        .parse()
        .map_err(|_| DurationError::new("minutes out of range"))?;
    let seconds: i64 = seconds
        .parse()
        .map_err(|_| DurationError::new("invalid second digits"))?;
    if seconds > 59 {
        return Err(DurationError::new("seconds must be 0-59"));
    }

    minutes
        .checked_mul(60)
        .and_then(|m| m.checked_add(seconds))
        .and_then(Duration::try_seconds)
        .ok_or_else(|| DurationError::new("minutes out of range"))
}

/// Format a number of seconds as "MM:SS", truncating fractional seconds.
///
/// Negative and non-finite inputs render as "00:00".
pub fn format_mmss(seconds: f64) -> String {
    let total = whole_seconds(seconds);
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Format a number of seconds as a phrase such as "1 hour, 1 minute, 7 seconds".
///
/// Zero-valued components are omitted; a zero duration reads "0 seconds".
pub fn humanize(seconds: f64) -> String {
    let total = whole_seconds(seconds);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    let parts: Vec<String> = [(hours, "hour"), (minutes, "minute"), (secs, "second")]
        .into_iter()
        .filter(|(n, _)| *n > 0)
        .map(|(n, unit)| format!("{n} {unit}{}", if n > 1 { "s" } else { "" }))
        .collect();

    if parts.is_empty() {
        "0 seconds".to_string()
    } else {
        parts.join(", ")
    }
}

fn whole_seconds(seconds: f64) -> u64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    }
}
