//! Orbit camera controller
//!
//! Keeps the camera on a sphere around a target, like a turntable. Pan and zoom
//! are not supported: the radius only changes when the scene says so.

use std::f64::consts::{FRAC_PI_2, TAU};

use glam::DVec3;

use crate::astro::HorizontalCoordinate;
use crate::core::camera::Camera;
use crate::illumination::{direction_to_horizontal, horizontal_to_direction, UP};

/// Keep the camera just shy of the poles so `look_at` has a usable up vector.
const MAX_ALTITUDE: f64 = FRAC_PI_2 - 1e-3;

/// Turntable camera controller with optional auto-rotation and damping
#[derive(Clone, Debug)]
pub struct OrbitController {
    /// Point the camera orbits and looks at
    pub target: DVec3,
    /// Distance from target to camera
    pub radius: f64,
    /// Spin around the target on every update
    pub auto_rotate: bool,
    /// 1.0 = one full turn per minute
    pub auto_rotate_speed: f64,
    /// Ease toward the goal instead of jumping
    pub enable_damping: bool,
    /// Fraction of the remaining distance covered per 60 Hz frame
    pub damping_factor: f64,
    goal: HorizontalCoordinate,
    current: HorizontalCoordinate,
}

impl OrbitController {
    /// Create a controller looking at `target` from `radius` away, starting on
    /// the +Z side (the default camera's position).
    pub fn new(target: DVec3, radius: f64) -> Self {
        let start = HorizontalCoordinate::new(0.0, FRAC_PI_2);
        Self {
            target,
            radius,
            auto_rotate: false,
            auto_rotate_speed: 2.0,
            enable_damping: false,
            damping_factor: 0.05,
            goal: start,
            current: start,
        }
    }

    /// Jump the camera so it sits at `eye`, looking at the target.
    pub fn set_eye(&mut self, eye: DVec3) {
        let offset = eye - self.target;
        if offset.length_squared() > 0.0 {
            self.radius = offset.length();
        }
        let mut coord = direction_to_horizontal(offset);
        coord.altitude = coord.altitude.clamp(-MAX_ALTITUDE, MAX_ALTITUDE);
        self.goal = coord;
        self.current = coord;
    }

    /// Advance auto-rotation and damping by `dt` seconds.
    pub fn update(&mut self, dt: f64) {
        if self.auto_rotate {
            self.goal.azimuth = (self.goal.azimuth + self.auto_rotation_rate() * dt) % TAU;
            // Keep current on the same branch as the wrapped goal
            if (self.goal.azimuth - self.current.azimuth).abs() > std::f64::consts::PI {
                self.current.azimuth += TAU * (self.goal.azimuth - self.current.azimuth).signum();
            }
        }

        if self.enable_damping {
            let blend = 1.0 - (1.0 - self.damping_factor).powf(dt * 60.0);
            self.current.altitude += (self.goal.altitude - self.current.altitude) * blend;
            self.current.azimuth += (self.goal.azimuth - self.current.azimuth) * blend;
        } else {
            self.current = self.goal;
        }
    }

    /// Radians of azimuth per second while auto-rotating.
    #[inline]
    pub fn auto_rotation_rate(&self) -> f64 {
        TAU / 60.0 * self.auto_rotate_speed
    }

    /// Current camera position in world space.
    pub fn eye(&self) -> DVec3 {
        self.target + horizontal_to_direction(self.current) * self.radius
    }

    /// Where the camera is, expressed as a sky position around the target.
    pub fn orbit_coordinate(&self) -> HorizontalCoordinate {
        self.current
    }

    /// Write the controller's pose into a camera.
    pub fn apply(&self, camera: &mut Camera) {
        camera.look_at(
            self.eye().as_vec3(),
            self.target.as_vec3(),
            UP.as_vec3(),
        );
    }
}
