//! Position provider trait and the bundled low-precision ephemeris.

use chrono::{DateTime, Utc};

use super::coords::{CelestialBody, HorizontalCoordinate, ObserverLocation};
use super::moon::{moon_equatorial, refraction, MoonIllumination};
use super::sun::sun_equatorial;
use super::time::{days_since_j2000, sidereal_time};
use super::Equatorial;

/// Source of apparent sun/moon positions for an observer.
///
/// Implementations must be deterministic: the same instant and location always
/// yield the same coordinate.
pub trait PositionProvider {
    /// Apparent altitude/azimuth of `body` at `at`, seen from `observer`.
    fn position(
        &self,
        body: CelestialBody,
        at: DateTime<Utc>,
        observer: ObserverLocation,
    ) -> HorizontalCoordinate;

    /// Illuminated fraction and phase of the moon at `at`.
    fn illumination(&self, at: DateTime<Utc>) -> MoonIllumination;
}

/// Closed-form sun and moon ephemeris.
#[derive(Clone, Copy, Debug, Default)]
pub struct LowPrecisionEphemeris;

impl LowPrecisionEphemeris {
    pub fn new() -> Self {
        Self
    }
}

impl PositionProvider for LowPrecisionEphemeris {
    fn position(
        &self,
        body: CelestialBody,
        at: DateTime<Utc>,
        observer: ObserverLocation,
    ) -> HorizontalCoordinate {
        let days = days_since_j2000(at);
        match body {
            CelestialBody::Sun => to_horizontal(&sun_equatorial(days), days, observer),
            CelestialBody::Moon => {
                let mut coord = to_horizontal(&moon_equatorial(days), days, observer);
                coord.altitude += refraction(coord.altitude);
                coord
            }
        }
    }

    fn illumination(&self, at: DateTime<Utc>) -> MoonIllumination {
        MoonIllumination::at_days(days_since_j2000(at))
    }
}

/// Convert an equatorial position to the observer's horizontal frame.
pub fn to_horizontal(
    eq: &Equatorial,
    days: f64,
    observer: ObserverLocation,
) -> HorizontalCoordinate {
    let west_longitude = (-observer.longitude()).to_radians();
    let phi = observer.latitude().to_radians();
    let hour_angle = sidereal_time(days, west_longitude) - eq.right_ascension;
    let dec = eq.declination;

    let azimuth = hour_angle
        .sin()
        .atan2(hour_angle.cos() * phi.sin() - dec.tan() * phi.cos());
    let altitude =
        (phi.sin() * dec.sin() + phi.cos() * dec.cos() * hour_angle.cos()).asin();

    HorizontalCoordinate { altitude, azimuth }
}
