//! Julian day arithmetic and sidereal time.

use chrono::{DateTime, Utc};

/// Milliseconds in one day.
const MS_PER_DAY: f64 = 86_400_000.0;
/// Julian date of the Unix epoch.
const JD_UNIX_EPOCH: f64 = 2_440_587.5;
/// Julian date of J2000.0.
pub const JD_J2000: f64 = 2_451_545.0;

/// Julian date for a UTC instant.
pub fn julian_date(at: DateTime<Utc>) -> f64 {
    at.timestamp_millis() as f64 / MS_PER_DAY + JD_UNIX_EPOCH
}

/// Days elapsed since J2000.0 (fractional).
pub fn days_since_j2000(at: DateTime<Utc>) -> f64 {
    julian_date(at) - JD_J2000
}

/// Local sidereal time in radians.
///
/// `west_longitude` is the observer longitude in radians, positive west.
pub fn sidereal_time(days: f64, west_longitude: f64) -> f64 {
    (280.16 + 360.985_623_5 * days).to_radians() - west_longitude
}
