//! Issuance timestamps.

use crate::{
    config::TokenParameters,
    error::{validate_condition, InvalidTokenKind, ValidationError},
};
use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};

/// The textual timestamp format: UTC with second precision, e.g. `20250301T142501Z`.
pub const TIME_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// An error when parsing a timestamp.
#[derive(Debug, thiserror::Error)]
#[error("invalid timestamp: {0}")]
pub struct ParseTimestampError(#[from] chrono::ParseError);

/// Format an instant as a timestamp.
///
/// Anything below a second is dropped.
pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.format(TIME_FORMAT).to_string()
}

/// Parse a timestamp.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, ParseTimestampError> {
    let datetime = NaiveDateTime::parse_from_str(s, TIME_FORMAT)?;
    Ok(datetime.and_utc())
}

/// Check whether a timestamp is still inside its validity window at `now`.
///
/// Only the upper bound is checked: a timestamp ahead of `now` is considered valid.
pub fn timestamp_is_valid(s: &str, window: TimeDelta, now: DateTime<Utc>) -> bool {
    match parse_timestamp(s) {
        Ok(timestamp) => within_window(timestamp, window, now),
        Err(_) => false,
    }
}

pub(crate) fn validate_timestamp(s: &str, parameters: &TokenParameters) -> Result<(), ValidationError> {
    let now = parameters.current_time;
    let timestamp = parse_timestamp(s).map_err(|_| InvalidTokenKind::Malformed)?;
    let policy = &parameters.policy;
    validate_condition(within_window(timestamp, policy.validity_window, now), InvalidTokenKind::TimestampExpired)?;
    if let Some(skew) = policy.max_future_skew {
        let in_range = now.checked_add_signed(skew).map_or(true, |limit| timestamp <= limit);
        validate_condition(in_range, InvalidTokenKind::TimestampInFuture)?;
    }
    Ok(())
}

// A window end past the representable range is as good as no end at all.
fn within_window(timestamp: DateTime<Utc>, window: TimeDelta, now: DateTime<Utc>) -> bool {
    timestamp.checked_add_signed(window).map_or(true, |end| now <= end)
}
