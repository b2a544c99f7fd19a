//! Drives a [`MoonScene`] from dates and observer locations.
//!
//! [`SceneController`] is the glue between the outside world (command line,
//! control protocol) and the scene: it remembers the current instant and
//! observer, and re-runs illumination and camera placement whenever either
//! changes.

use chrono::{DateTime, SecondsFormat, Utc};
use lunalight_control::{ControlCommand, ControlHandler, ControlResponse, ResponseData};
use serde::Serialize;

use super::flatten::FlatEntry;
use super::manager::MoonScene;
use crate::astro::{
    parse_timestamp, CelestialBody, HorizontalCoordinate, MoonIllumination, ObserverLocation,
    PositionProvider,
};
use crate::core::Result;
use crate::illumination::LightPlacement;

/// Everything worth printing about the scene at one instant.
#[derive(Debug, Serialize)]
pub struct SceneReport {
    pub timestamp: DateTime<Utc>,
    pub observer: ObserverLocation,
    pub sun: HorizontalCoordinate,
    pub moon: HorizontalCoordinate,
    pub illumination: MoonIllumination,
    pub phase_name: &'static str,
    pub light: Option<LightPlacement>,
    pub camera_position: [f32; 3],
    pub entries: Vec<FlatEntry>,
}

pub struct SceneController<P> {
    scene: MoonScene,
    provider: P,
    at: DateTime<Utc>,
    observer: ObserverLocation,
}

impl<P: PositionProvider> SceneController<P> {
    pub fn new(scene: MoonScene, provider: P, at: DateTime<Utc>, observer: ObserverLocation) -> Self {
        Self { scene, provider, at, observer }
    }

    /// Re-place light and camera for the current instant and observer.
    pub fn refresh(&mut self) -> Result<()> {
        self.scene.illuminate(&self.provider, self.at, self.observer)?;
        self.scene.point_camera_at_moon(&self.provider, self.at, self.observer)?;
        Ok(())
    }

    /// Move to instant `at`. On failure the previous instant, light and
    /// camera are kept.
    pub fn set_date(&mut self, at: DateTime<Utc>) -> Result<()> {
        let previous = std::mem::replace(&mut self.at, at);
        self.refresh_or_revert(|ctl| ctl.at = previous)
    }

    /// Move the observer. On failure the previous observer, light and camera
    /// are kept.
    pub fn set_observer(&mut self, observer: ObserverLocation) -> Result<()> {
        let previous = std::mem::replace(&mut self.observer, observer);
        self.refresh_or_revert(|ctl| ctl.observer = previous)
    }

    /// Refresh, and if that fails undo the change with `revert` and place
    /// everything for the old state again.
    fn refresh_or_revert(&mut self, revert: impl FnOnce(&mut Self)) -> Result<()> {
        let Err(e) = self.refresh() else {
            return Ok(());
        };
        revert(self);
        if let Err(again) = self.refresh() {
            log::warn!("Could not restore the previous scene: {}", again);
        }
        Err(e)
    }

    /// Advance the scene clock by `dt` seconds.
    pub fn tick(&mut self, dt: f64) {
        self.scene.update(dt);
    }

    pub fn report(&mut self) -> SceneReport {
        let illumination = self.provider.illumination(self.at);
        SceneReport {
            timestamp: self.at,
            observer: self.observer,
            sun: self.provider.position(CelestialBody::Sun, self.at, self.observer),
            moon: self.provider.position(CelestialBody::Moon, self.at, self.observer),
            illumination,
            phase_name: illumination.phase_name(),
            light: self.scene.light_placement(),
            camera_position: self.scene.camera().position.to_array(),
            entries: self.scene.flatten(),
        }
    }

    pub fn scene(&self) -> &MoonScene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut MoonScene {
        &mut self.scene
    }

    fn light_state(&self) -> ControlResponse {
        let Some(light) = self.scene.light_placement() else {
            return ControlResponse::error("light has not been placed yet");
        };
        let source = self.scene.config().light_source;
        let sky = self.provider.position(source.body(), self.at, self.observer);
        ControlResponse::ok(ResponseData::LightState {
            position: light.position.to_array(),
            target: light.target.to_array(),
            direction: light.direction.to_array(),
            distance: light.distance,
            source: format!("{:?}", source).to_lowercase(),
            source_altitude_degrees: sky.altitude_degrees(),
            source_azimuth_degrees: sky.azimuth_degrees(),
        })
    }

    fn scene_info(&self) -> ControlResponse {
        let moon = self.provider.position(CelestialBody::Moon, self.at, self.observer);
        ControlResponse::ok(ResponseData::SceneInfo {
            timestamp: self.at.to_rfc3339_opts(SecondsFormat::Secs, true),
            latitude: self.observer.latitude(),
            longitude: self.observer.longitude(),
            model_loaded: self.scene.has_model(),
            node_count: self.scene.graph().node_count() as u32,
            moon_altitude_degrees: moon.altitude_degrees(),
            moon_azimuth_degrees: moon.azimuth_degrees(),
        })
    }
}

impl<P: PositionProvider + Send + Sync + 'static> ControlHandler for SceneController<P> {
    fn handle_command(&mut self, cmd: ControlCommand) -> ControlResponse {
        match cmd {
            ControlCommand::Ping => ControlResponse::pong(),
            ControlCommand::SetDate { timestamp } => {
                match parse_timestamp(&timestamp).and_then(|at| self.set_date(at)) {
                    Ok(()) => ControlResponse::updated(format!("date set to {}", self.at)),
                    Err(e) => ControlResponse::error(e.to_string()),
                }
            }
            ControlCommand::SetObserver { latitude, longitude } => {
                match ObserverLocation::new(latitude, longitude).and_then(|o| self.set_observer(o)) {
                    Ok(()) => ControlResponse::updated(format!(
                        "observer set to {:.4}, {:.4}",
                        latitude, longitude
                    )),
                    Err(e) => ControlResponse::error(e.to_string()),
                }
            }
            ControlCommand::GetLight => self.light_state(),
            ControlCommand::GetCamera => {
                let camera = self.scene.camera();
                ControlResponse::ok(ResponseData::CameraState {
                    position: camera.position.to_array(),
                    forward: camera.forward().to_array(),
                    fov_degrees: camera.fov_y.to_degrees(),
                    aspect: camera.aspect,
                })
            }
            ControlCommand::GetIllumination => {
                let illumination = self.provider.illumination(self.at);
                ControlResponse::ok(ResponseData::Illumination {
                    fraction: illumination.fraction,
                    phase: illumination.phase,
                    angle: illumination.angle,
                    phase_name: illumination.phase_name().to_string(),
                })
            }
            ControlCommand::Resize { width, height } => {
                self.scene.resize(width, height);
                ControlResponse::updated(format!("viewport {}x{}", width, height))
            }
            ControlCommand::GetSceneInfo => self.scene_info(),
        }
    }
}
