//! Apple epoch timestamp conversion.
//!
//! `message.date` holds nanoseconds since 2001-01-01 00:00:00 UTC (the
//! Core Data epoch).  The Unix epoch is 978,307,200 seconds earlier.

use chrono::{DateTime, Local, TimeZone, Utc};
use thiserror::Error;

/// Seconds between the Unix epoch and the Apple (Core Data) epoch.
pub const APPLE_EPOCH_OFFSET: i64 = 978_307_200;

const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Raw `message.date` value that does not map to a representable instant.
#[derive(Debug, Error)]
#[error("timestamp out of range: {0}")]
pub struct TimestampError(pub i64);

/// Convert a raw `message.date` value to local wall-clock time.
///
/// The sub-second part is preserved exactly; a raw value of `0` maps to
/// the Apple epoch itself.
pub fn from_apple_timestamp(raw: i64) -> Result<DateTime<Local>, TimestampError> {
    let secs = raw.div_euclid(NANOS_PER_SECOND) + APPLE_EPOCH_OFFSET;
    let nanos = raw.rem_euclid(NANOS_PER_SECOND) as u32;

    Utc.timestamp_opt(secs, nanos)
        .single()
        .map(|utc| utc.with_timezone(&Local))
        .ok_or(TimestampError(raw))
}
