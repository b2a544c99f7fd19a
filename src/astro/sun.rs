//! Sun position.
//!
//! Mean anomaly plus a three-term equation of centre; good to roughly a
//! hundredth of a degree over a few centuries around J2000.

use std::f64::consts::PI;

use super::Equatorial;

/// Mean Earth–Sun distance in kilometres.
pub const SUN_DISTANCE_KM: f64 = 149_598_000.0;

/// Longitude of perihelion (radians).
const PERIHELION: f64 = 102.9372 * PI / 180.0;

/// Solar mean anomaly (radians) for a day number relative to J2000.
pub fn mean_anomaly(days: f64) -> f64 {
    (357.5291 + 0.985_600_28 * days).to_radians()
}

/// Ecliptic longitude of the sun (radians) from its mean anomaly.
pub fn ecliptic_longitude(mean_anomaly: f64) -> f64 {
    let m = mean_anomaly;
    let centre = (1.9148 * m.sin() + 0.02 * (2.0 * m).sin() + 0.0003 * (3.0 * m).sin())
        .to_radians();
    m + centre + PERIHELION + PI
}

/// Geocentric equatorial position of the sun.
pub fn sun_equatorial(days: f64) -> Equatorial {
    let longitude = ecliptic_longitude(mean_anomaly(days));
    Equatorial::from_ecliptic(longitude, 0.0, SUN_DISTANCE_KM)
}
