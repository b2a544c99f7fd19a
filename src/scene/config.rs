//! Scene configuration

use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::astro::{CelestialBody, ObserverLocation};
use crate::core::Result;

/// Which body's sky position drives the light.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightSource {
    /// Light comes from the sun, so the lit side matches the real phase.
    #[default]
    Sun,
    /// Light sits where the moon appears in the sky.
    Moon,
}

impl LightSource {
    pub fn body(self) -> CelestialBody {
        match self {
            LightSource::Sun => CelestialBody::Sun,
            LightSource::Moon => CelestialBody::Moon,
        }
    }
}

/// Configuration for the moon scene
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Observer latitude in degrees
    pub latitude: f64,
    /// Observer longitude in degrees (east positive)
    pub longitude: f64,
    pub light_source: LightSource,
    /// Distance from the moon to its light
    pub light_distance: f64,
    /// Where the light sits before the first placement
    pub initial_light_position: Vec3,
    pub light_color: [f32; 3],
    pub light_intensity: f32,
    /// Distance from the moon to the camera
    pub camera_distance: f64,
    pub model_path: PathBuf,
    /// Uniform scale applied to the model
    pub model_scale: f32,
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub auto_rotate: bool,
    /// 1.0 = one orbit per minute
    pub auto_rotate_speed: f64,
    pub enable_damping: bool,
    pub damping_factor: f64,
    pub control_port: u16,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            latitude: 53.0,
            longitude: -2.0,
            light_source: LightSource::Sun,
            light_distance: 6.0,
            initial_light_position: Vec3::new(0.0, 0.0, 3.0),
            light_color: [1.0, 1.0, 1.0],
            light_intensity: 1.0,
            camera_distance: 3.0,
            model_path: PathBuf::from("./assets/moon.glb"),
            model_scale: 0.0025,
            fov_degrees: 75.0,
            near: 0.1,
            far: 100.0,
            auto_rotate: true,
            auto_rotate_speed: 5.0,
            enable_damping: true,
            damping_factor: 0.05,
            control_port: lunalight_control::DEFAULT_PORT,
        }
    }
}

impl SceneConfig {
    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&text)?;
        log::info!("Loaded scene config from {}", path.display());
        Ok(config)
    }

    /// The configured observer, validated.
    pub fn observer(&self) -> Result<ObserverLocation> {
        ObserverLocation::new(self.latitude, self.longitude)
    }
}
