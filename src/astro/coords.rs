//! Observer location, horizontal coordinates and timestamp parsing.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};

/// Bodies the position provider knows about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CelestialBody {
    Sun,
    Moon,
}

/// Geographic position of the observer, in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObserverLocation {
    latitude: f64,
    longitude: f64,
}

impl ObserverLocation {
    /// Create a location, rejecting non-finite or out-of-range values.
    ///
    /// Latitude must lie in `[-90, 90]`, longitude in `[-180, 180]`.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        if !valid {
            return Err(Error::InvalidObserver { latitude, longitude });
        }
        Ok(Self { latitude, longitude })
    }

    /// Latitude in degrees (north positive).
    #[inline]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees (east positive).
    #[inline]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// Apparent position of a body in the observer's sky.
///
/// Both angles are radians. Azimuth is measured from south, positive toward
/// west, so `0` is due south and `π/2` due west.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HorizontalCoordinate {
    /// Angle above the horizon, `[-π/2, π/2]`.
    pub altitude: f64,
    /// Angle along the horizon from south, westward positive.
    pub azimuth: f64,
}

impl HorizontalCoordinate {
    pub fn new(altitude: f64, azimuth: f64) -> Self {
        Self { altitude, azimuth }
    }

    /// Build from degrees. This is the one place degree inputs become radians.
    pub fn from_degrees(altitude_deg: f64, azimuth_deg: f64) -> Self {
        Self {
            altitude: altitude_deg.to_radians(),
            azimuth: azimuth_deg.to_radians(),
        }
    }

    /// Whether both angles are finite numbers.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.altitude.is_finite() && self.azimuth.is_finite()
    }

    /// Whether the body is above the horizon.
    #[inline]
    pub fn is_above_horizon(&self) -> bool {
        self.altitude > 0.0
    }

    /// Altitude in degrees.
    pub fn altitude_degrees(&self) -> f64 {
        self.altitude.to_degrees()
    }

    /// Azimuth in degrees.
    pub fn azimuth_degrees(&self) -> f64 {
        self.azimuth.to_degrees()
    }
}

/// Parse a timestamp as RFC 3339, or a bare `YYYY-MM-DD` date taken as
/// midnight UTC.
pub fn parse_timestamp(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| Error::InvalidTimestamp(input.to_string()))
}
