//! Moon position and illumination.
//!
//! Truncated lunar theory: the largest term of each series for longitude,
//! latitude and distance. Good to a few tenths of a degree, which is well below
//! what anyone can see on a rendered terminator.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use super::sun::{sun_equatorial, SUN_DISTANCE_KM};
use super::Equatorial;

/// Geocentric equatorial position of the moon.
pub fn moon_equatorial(days: f64) -> Equatorial {
    let mean_longitude = (218.316 + 13.176_396 * days).to_radians();
    let mean_anomaly = (134.963 + 13.064_993 * days).to_radians();
    let node_distance = (93.272 + 13.229_350 * days).to_radians();

    let longitude = mean_longitude + 6.289_f64.to_radians() * mean_anomaly.sin();
    let latitude = 5.128_f64.to_radians() * node_distance.sin();
    let distance_km = 385_001.0 - 20_905.0 * mean_anomaly.cos();

    Equatorial::from_ecliptic(longitude, latitude, distance_km)
}

/// Atmospheric refraction (radians) for a true altitude in radians.
///
/// Altitudes below the horizon are treated as zero so the formula never
/// blows up.
pub fn refraction(altitude: f64) -> f64 {
    let h = altitude.max(0.0);
    0.000_296_7 / (h + 0.003_125_36 / (h + 0.089_011_79)).tan()
}

/// How much of the moon is lit, and from which side.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoonIllumination {
    /// Illuminated fraction of the disc, 0 (new) to 1 (full).
    pub fraction: f64,
    /// Phase in `[0, 1)`: 0 new, 0.25 first quarter, 0.5 full, 0.75 last quarter.
    pub phase: f64,
    /// Position angle of the bright limb midpoint (radians, from north toward east).
    pub angle: f64,
}

impl MoonIllumination {
    /// Illumination for a day number relative to J2000.
    pub fn at_days(days: f64) -> Self {
        let sun = sun_equatorial(days);
        let moon = moon_equatorial(days);

        let elongation = sun.separation(&moon);
        let phase_angle = (SUN_DISTANCE_KM * elongation.sin())
            .atan2(moon.distance_km - SUN_DISTANCE_KM * elongation.cos());

        let ra_delta = sun.right_ascension - moon.right_ascension;
        let angle = (sun.declination.cos() * ra_delta.sin()).atan2(
            sun.declination.sin() * moon.declination.cos()
                - sun.declination.cos() * moon.declination.sin() * ra_delta.cos(),
        );

        let waxing_sign = if angle < 0.0 { -1.0 } else { 1.0 };

        Self {
            fraction: (1.0 + phase_angle.cos()) / 2.0,
            phase: 0.5 + 0.5 * phase_angle * waxing_sign / PI,
            angle,
        }
    }

    /// Human readable name of the phase.
    pub fn phase_name(&self) -> &'static str {
        // Eight equal sectors centred on the principal phases
        match ((self.phase * 8.0).round() as u32) % 8 {
            0 => "new moon",
            1 => "waxing crescent",
            2 => "first quarter",
            3 => "waxing gibbous",
            4 => "full moon",
            5 => "waning gibbous",
            6 => "last quarter",
            _ => "waning crescent",
        }
    }
}
