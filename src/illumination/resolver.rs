//! Light placement around the illuminated body.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::convention::horizontal_to_direction;
use crate::astro::HorizontalCoordinate;

/// Why a placement could not be computed.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum IlluminationError {
    #[error("non-finite sky position (altitude {altitude}, azimuth {azimuth})")]
    InvalidCoordinate { altitude: f64, azimuth: f64 },

    #[error("illuminated body has no position yet")]
    MissingBody,

    #[error("light distance must be positive and finite, got {0}")]
    InvalidDistance(f64),
}

/// Where the light goes, and what it points at.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LightPlacement {
    /// World-space light position.
    pub position: DVec3,
    /// World-space position of the illuminated body.
    pub target: DVec3,
    /// Unit direction from the body toward the light.
    pub direction: DVec3,
    /// Distance between light and body.
    pub distance: f64,
}

impl LightPlacement {
    /// Offset of the light from its target.
    #[inline]
    pub fn offset(&self) -> DVec3 {
        self.position - self.target
    }
}

/// Place a light so it shines on `body` from the direction of `source`.
///
/// `source` is the sky position of whatever lights the body (normally the
/// sun). The light ends up at `body + direction(source) * distance`, i.e. on
/// the side of the body facing the source.
///
/// Checks run in order: non-finite coordinate, missing body, bad distance.
/// Nothing is computed until all three pass.
pub fn resolve(
    source: HorizontalCoordinate,
    body: Option<DVec3>,
    distance: f64,
) -> Result<LightPlacement, IlluminationError> {
    let (direction, target) = validated(source, body, distance)?;

    Ok(LightPlacement {
        position: target + direction * distance,
        target,
        direction,
        distance,
    })
}

/// Where an observer looking at `body` stands, `distance` away from it.
///
/// `body_sky` is the sky position of the body itself. The observer sits on the
/// opposite side of the body from where it appears in the sky, using the same
/// conversion as [`resolve`].
pub fn observer_placement(
    body_sky: HorizontalCoordinate,
    body: Option<DVec3>,
    distance: f64,
) -> Result<DVec3, IlluminationError> {
    let (direction, target) = validated(body_sky, body, distance)?;
    Ok(target - direction * distance)
}

fn validated(
    coord: HorizontalCoordinate,
    body: Option<DVec3>,
    distance: f64,
) -> Result<(DVec3, DVec3), IlluminationError> {
    if !coord.is_finite() {
        return Err(IlluminationError::InvalidCoordinate {
            altitude: coord.altitude,
            azimuth: coord.azimuth,
        });
    }
    let target = body.ok_or(IlluminationError::MissingBody)?;
    if !distance.is_finite() || distance <= 0.0 {
        return Err(IlluminationError::InvalidDistance(distance));
    }
    Ok((horizontal_to_direction(coord), target))
}
