//! The world's one coordinate convention.
//!
//! - Right-handed, +Y up.
//! - `x = cos(alt)·cos(az)`, `y = sin(alt)`, `z = cos(alt)·sin(az)`.
//! - Azimuth 0 (south) is +X, azimuth π/2 (west) is +Z; north is −X, east −Z.

use glam::DVec3;

use crate::astro::HorizontalCoordinate;

/// The world "up" axis.
pub const UP: DVec3 = DVec3::Y;

/// Below this, `cos(altitude)` is treated as zero and the direction snaps to a pole.
const POLE_EPSILON: f64 = 1e-12;

/// Unit direction for a horizontal coordinate.
///
/// At the zenith or nadir the azimuth is meaningless and the result is exactly
/// `±UP`. The caller is expected to have rejected non-finite input.
pub fn horizontal_to_direction(coord: HorizontalCoordinate) -> DVec3 {
    let (sin_alt, cos_alt) = coord.altitude.sin_cos();
    if cos_alt.abs() < POLE_EPSILON {
        return if sin_alt >= 0.0 { UP } else { -UP };
    }

    let (sin_az, cos_az) = coord.azimuth.sin_cos();
    DVec3::new(cos_alt * cos_az, sin_alt, cos_alt * sin_az)
        .try_normalize()
        .unwrap_or(UP)
}

/// Inverse of [`horizontal_to_direction`]. Azimuth comes back in `(-π, π]`.
///
/// The input need not be normalized; a zero vector maps to the zenith.
pub fn direction_to_horizontal(direction: DVec3) -> HorizontalCoordinate {
    let dir = direction.try_normalize().unwrap_or(UP);
    let altitude = dir.y.clamp(-1.0, 1.0).asin();
    let azimuth = if dir.x.abs() < POLE_EPSILON && dir.z.abs() < POLE_EPSILON {
        0.0
    } else {
        dir.z.atan2(dir.x)
    };
    HorizontalCoordinate { altitude, azimuth }
}
