//! Sun and moon positions as seen by an observer on Earth.
//!
//! The entry point is the [`PositionProvider`] trait; [`LowPrecisionEphemeris`]
//! is the bundled implementation (arc-minute class accuracy, plenty for
//! placing a light on a rendered moon).
//!
//! All angles leaving this module are radians. Azimuth is measured from south,
//! positive toward west.

pub mod coords;
pub mod moon;
pub mod provider;
pub mod sun;
pub mod time;

// Re-exports
pub use coords::{parse_timestamp, CelestialBody, HorizontalCoordinate, ObserverLocation};
pub use moon::MoonIllumination;
pub use provider::{LowPrecisionEphemeris, PositionProvider};

/// Obliquity of the ecliptic at J2000 (radians).
pub(crate) const OBLIQUITY: f64 = 23.4397 * std::f64::consts::PI / 180.0;

/// Position on the celestial sphere in equatorial coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Equatorial {
    /// Right ascension (radians).
    pub right_ascension: f64,
    /// Declination (radians).
    pub declination: f64,
    /// Geocentric distance in kilometres.
    pub distance_km: f64,
}

impl Equatorial {
    /// Convert ecliptic longitude/latitude (radians) to equatorial coordinates.
    pub fn from_ecliptic(longitude: f64, latitude: f64, distance_km: f64) -> Self {
        let (sin_e, cos_e) = OBLIQUITY.sin_cos();
        let right_ascension = (longitude.sin() * cos_e - latitude.tan() * sin_e)
            .atan2(longitude.cos());
        let declination =
            (latitude.sin() * cos_e + latitude.cos() * sin_e * longitude.sin()).asin();

        Self {
            right_ascension,
            declination,
            distance_km,
        }
    }

    /// Angular separation to another equatorial position (radians).
    pub fn separation(&self, other: &Equatorial) -> f64 {
        let cos_d = self.declination.sin() * other.declination.sin()
            + self.declination.cos()
                * other.declination.cos()
                * (self.right_ascension - other.right_ascension).cos();
        cos_d.clamp(-1.0, 1.0).acos()
    }
}
