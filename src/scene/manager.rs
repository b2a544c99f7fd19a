//! The moon scene: model, light, camera, and the code that moves them.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use glam::{DVec3, Vec3};

use super::config::SceneConfig;
use super::flatten::FlatEntry;
use super::graph::SceneGraph;
use super::node::{LocalTransform, NodeContent, SceneNodeId};
use crate::asset::MoonAsset;
use crate::astro::{CelestialBody, ObserverLocation, PositionProvider};
use crate::core::camera::Camera;
use crate::core::orbit_controller::OrbitController;
use crate::core::Result;
use crate::illumination::{observer_placement, resolve, IlluminationError, LightPlacement};

/// Owns the scene graph, the light, the camera and its orbit.
///
/// The model is absent until [`attach_model`](Self::attach_model) is called;
/// until then every placement that needs the body is skipped.
pub struct MoonScene {
    config: SceneConfig,
    graph: SceneGraph,
    light_node: SceneNodeId,
    model_node: Option<SceneNodeId>,
    camera: Camera,
    orbit: OrbitController,
    light_placement: Option<LightPlacement>,
}

impl MoonScene {
    /// Build the scene with its light at the configured start position.
    pub fn new(config: SceneConfig) -> Self {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let light_node = graph.add_child(
            root,
            "light",
            NodeContent::PointLight {
                color: config.light_color,
                intensity: config.light_intensity,
            },
        );
        graph.set_transform(light_node, LocalTransform::from_position(config.initial_light_position));
        graph.update_transforms();

        let mut camera = Camera::new(
            Vec3::new(0.0, 0.0, config.camera_distance as f32),
            config.fov_degrees,
            1.0,
        );
        camera.near = config.near;
        camera.far = config.far;

        let mut orbit = OrbitController::new(DVec3::ZERO, config.camera_distance);
        orbit.auto_rotate = config.auto_rotate;
        orbit.auto_rotate_speed = config.auto_rotate_speed;
        orbit.enable_damping = config.enable_damping;
        orbit.damping_factor = config.damping_factor;
        orbit.apply(&mut camera);

        Self {
            config,
            graph,
            light_node,
            model_node: None,
            camera,
            orbit,
            light_placement: None,
        }
    }

    /// Insert the moon model, replacing any previous one.
    pub fn attach_model(&mut self, asset: Arc<MoonAsset>) {
        if let Some(old) = self.model_node.take() {
            self.graph.remove(old);
        }

        let root = self.graph.root();
        let bounds_radius = asset.info.bounding_radius() as f32;
        let node = self.graph.add_child(root, "moon", NodeContent::Model { asset, bounds_radius });
        self.graph.set_transform(node, LocalTransform::from_scale(self.config.model_scale));
        self.graph.update_transforms();
        self.model_node = Some(node);

        if let Some(body) = self.body_position() {
            log::info!("Moon attached at {:?}", body);
            let eye = self.orbit.eye() - self.orbit.target + body;
            self.orbit.target = body;
            self.orbit.set_eye(eye);
            self.orbit.apply(&mut self.camera);
        }
    }

    /// World-space centre of the model, once one is attached.
    pub fn body_position(&self) -> Option<DVec3> {
        let node = self.graph.get(self.model_node?)?;
        let NodeContent::Model { asset, .. } = &node.content else {
            return None;
        };
        let centre = asset.info.centre().as_vec3();
        Some(node.world_transform.transform_point3(centre).as_dvec3())
    }

    /// Move the light to `placement`.
    pub fn apply_light(&mut self, placement: LightPlacement) {
        self.graph.set_position(self.light_node, placement.position.as_vec3());
        self.graph.update_transforms();
        self.light_placement = Some(placement);
        log::debug!("Light placed at {:?}", placement.position);
    }

    /// Place the light for instant `at` as seen from `observer`.
    ///
    /// Returns `Ok(None)` and keeps the previous light if the model is not
    /// attached yet. Bad sky coordinates are errors.
    pub fn illuminate<P: PositionProvider + ?Sized>(
        &mut self,
        provider: &P,
        at: DateTime<Utc>,
        observer: ObserverLocation,
    ) -> Result<Option<LightPlacement>> {
        let source = provider.position(self.config.light_source.body(), at, observer);
        match resolve(source, self.body_position(), self.config.light_distance) {
            Ok(placement) => {
                self.apply_light(placement);
                Ok(Some(placement))
            }
            Err(IlluminationError::MissingBody) => {
                log::warn!("Moon not loaded yet, skipping light update for {}", at);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Put the camera where `observer` would see the moon from, at the
    /// configured camera distance.
    pub fn point_camera_at_moon<P: PositionProvider + ?Sized>(
        &mut self,
        provider: &P,
        at: DateTime<Utc>,
        observer: ObserverLocation,
    ) -> Result<Option<DVec3>> {
        let moon = provider.position(CelestialBody::Moon, at, observer);
        match observer_placement(moon, self.body_position(), self.config.camera_distance) {
            Ok(eye) => {
                self.orbit.set_eye(eye);
                self.orbit.apply(&mut self.camera);
                Ok(Some(eye))
            }
            Err(IlluminationError::MissingBody) => {
                log::warn!("Moon not loaded yet, leaving camera in place");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Advance the orbit by `dt` seconds and move the camera with it.
    pub fn update(&mut self, dt: f64) {
        self.orbit.update(dt);
        self.orbit.apply(&mut self.camera);
    }

    /// Viewport changed size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_aspect(width as f32, height as f32);
    }

    /// Flatten the scene into renderer-ready entries.
    pub fn flatten(&mut self) -> Vec<FlatEntry> {
        self.graph.flatten()
    }

    /// The most recent light placement, if any has been applied.
    pub fn light_placement(&self) -> Option<LightPlacement> {
        self.light_placement
    }

    /// Current light position in the graph.
    pub fn light_position(&self) -> Vec3 {
        self.graph
            .world_transform(self.light_node)
            .map(|m| m.transform_point3(Vec3::ZERO))
            .unwrap_or(self.config.initial_light_position)
    }

    pub fn has_model(&self) -> bool {
        self.model_node.is_some()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn orbit(&self) -> &OrbitController {
        &self.orbit
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::glb::fixtures::{encode_glb, mesh_json, moon_glb};
    use crate::asset::GlbInfo;
    use crate::astro::{parse_timestamp, HorizontalCoordinate, LowPrecisionEphemeris, MoonIllumination};
    use crate::core::Error;
    use crate::illumination::horizontal_to_direction;
    use crate::scene::config::LightSource;
    use crate::scene::flatten::EntryKind;

    fn moon_asset() -> Arc<MoonAsset> {
        Arc::new(MoonAsset {
            path: "moon.glb".into(),
            byte_len: moon_glb().len(),
            info: GlbInfo::parse(&moon_glb()).unwrap(),
        })
    }

    fn reference() -> (DateTime<Utc>, ObserverLocation) {
        (
            parse_timestamp("2023-07-06T00:00:00Z").unwrap(),
            ObserverLocation::new(53.0, -2.0).unwrap(),
        )
    }

    /// Returns the same sky position for every body.
    struct Fixed(HorizontalCoordinate);

    impl PositionProvider for Fixed {
        fn position(&self, _: CelestialBody, _: DateTime<Utc>, _: ObserverLocation) -> HorizontalCoordinate {
            self.0
        }

        fn illumination(&self, _: DateTime<Utc>) -> MoonIllumination {
            MoonIllumination { fraction: 0.5, phase: 0.25, angle: 0.0 }
        }
    }

    #[test]
    fn test_new_scene() {
        let scene = MoonScene::new(SceneConfig::default());
        assert!(!scene.has_model());
        assert!(scene.body_position().is_none());
        assert!(scene.light_placement().is_none());
        assert_eq!(scene.light_position(), Vec3::new(0.0, 0.0, 3.0));
        assert_eq!(scene.graph().node_count(), 2);
        assert!((scene.camera().position - Vec3::new(0.0, 0.0, 3.0)).length() < 1e-5);
        assert!((scene.camera().fov_y - 75f32.to_radians()).abs() < 1e-6);
    }

    #[test]
    fn test_illuminate_skipped_without_model() {
        let mut scene = MoonScene::new(SceneConfig::default());
        let (at, observer) = reference();

        let placed = scene.illuminate(&LowPrecisionEphemeris, at, observer).unwrap();
        assert!(placed.is_none());
        assert_eq!(scene.light_position(), Vec3::new(0.0, 0.0, 3.0));

        let eye = scene.point_camera_at_moon(&LowPrecisionEphemeris, at, observer).unwrap();
        assert!(eye.is_none());
    }

    #[test]
    fn test_reference_light_position() {
        let mut scene = MoonScene::new(SceneConfig::default());
        scene.attach_model(moon_asset());
        let (at, observer) = reference();

        let placement = scene
            .illuminate(&LowPrecisionEphemeris, at, observer)
            .unwrap()
            .unwrap();
        let expected = DVec3::new(-5.808928390121962, -1.469146515938968, 0.31298478100293003);
        assert!((placement.position - expected).length() < 1e-9);
        assert_eq!(placement.target, DVec3::ZERO);
        assert!((scene.light_position() - expected.as_vec3()).length() < 1e-5);
        assert_eq!(scene.light_placement(), Some(placement));
    }

    #[test]
    fn test_invalid_coordinate_surfaces() {
        let mut scene = MoonScene::new(SceneConfig::default());
        scene.attach_model(moon_asset());
        let (at, observer) = reference();

        let err = scene
            .illuminate(&Fixed(HorizontalCoordinate::new(f64::NAN, 0.0)), at, observer)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Illumination(IlluminationError::InvalidCoordinate { .. })
        ));
        // Previous light stays where it was
        assert_eq!(scene.light_position(), Vec3::new(0.0, 0.0, 3.0));
    }

    #[test]
    fn test_invalid_coordinate_reported_before_missing_body() {
        let mut scene = MoonScene::new(SceneConfig::default());
        let (at, observer) = reference();
        let result = scene.illuminate(&Fixed(HorizontalCoordinate::new(0.0, f64::INFINITY)), at, observer);
        assert!(result.is_err());
    }

    #[test]
    fn test_camera_and_moon_light_antipodal() {
        let config = SceneConfig { light_source: LightSource::Moon, ..Default::default() };
        let mut scene = MoonScene::new(config);
        scene.attach_model(moon_asset());

        let coord = HorizontalCoordinate::from_degrees(20.0, -40.0);
        let provider = Fixed(coord);
        let (at, observer) = reference();

        let light = scene.illuminate(&provider, at, observer).unwrap().unwrap();
        let eye = scene.point_camera_at_moon(&provider, at, observer).unwrap().unwrap();

        let light_dir = light.offset().normalize();
        let eye_dir = eye.normalize();
        assert!((light_dir + eye_dir).length() < 1e-9);
        assert!((eye.length() - 3.0).abs() < 1e-9);
        assert!((scene.orbit().eye() - eye).length() < 1e-9);
    }

    #[test]
    fn test_lit_fraction_matches_ephemeris() {
        let provider = LowPrecisionEphemeris;
        let observer = ObserverLocation::new(53.0, -2.0).unwrap();
        let config = SceneConfig { enable_damping: false, auto_rotate: false, ..Default::default() };

        for date in [
            "2023-07-06T00:00:00Z",
            "2024-01-25T17:00:00Z",
            "2024-01-11T12:00:00Z",
            "2023-03-15T06:30:00Z",
            "2023-10-01T20:00:00Z",
        ] {
            let at = parse_timestamp(date).unwrap();
            let mut scene = MoonScene::new(config.clone());
            scene.attach_model(moon_asset());
            let light = scene.illuminate(&provider, at, observer).unwrap().unwrap();
            scene.point_camera_at_moon(&provider, at, observer).unwrap();

            let to_camera = (scene.orbit().eye() - light.target).normalize();
            let implied = (1.0 + to_camera.dot(light.direction)) / 2.0;
            let fraction = provider.illumination(at).fraction;
            assert!(
                (implied - fraction).abs() < 0.02,
                "{date}: implied {implied}, ephemeris {fraction}"
            );
        }
    }

    #[test]
    fn test_update_orbits_camera() {
        let mut scene = MoonScene::new(SceneConfig::default());
        scene.attach_model(moon_asset());
        let start = scene.camera().position;

        for _ in 0..60 {
            scene.update(1.0 / 60.0);
        }
        let moved = scene.camera().position;
        assert!((moved - start).length() > 0.1);
        assert!((moved.length() - 3.0).abs() < 1e-4);
        // Still looking at the moon
        assert!((scene.camera().forward() + moved.normalize()).length() < 1e-4);
    }

    #[test]
    fn test_resize_sets_aspect() {
        let mut scene = MoonScene::new(SceneConfig::default());
        scene.resize(1920, 1080);
        assert!((scene.camera().aspect - 16.0 / 9.0).abs() < 1e-6);
        scene.resize(800, 0);
        assert!((scene.camera().aspect - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn test_attach_replaces_model() {
        let mut scene = MoonScene::new(SceneConfig::default());
        scene.attach_model(moon_asset());
        scene.attach_model(moon_asset());
        assert_eq!(scene.graph().node_count(), 3);

        let entries = scene.flatten();
        let models = entries
            .iter()
            .filter(|e| matches!(e.kind, EntryKind::Model { .. }))
            .count();
        assert_eq!(models, 1);
    }

    #[test]
    fn test_body_position_uses_scaled_centre() {
        // Model placed by its node: mesh centre (400, 200, 0) shifted by +400 in x
        let json = mesh_json(
            [0.0, 0.0, 0.0],
            [800.0, 400.0, 0.0],
            r#"[{"mesh": 0, "translation": [400, 0, 0]}]"#,
        );
        let info = GlbInfo::parse(&encode_glb(&json, None)).unwrap();
        let asset = Arc::new(MoonAsset { path: "offset.glb".into(), byte_len: 0, info });

        let mut scene = MoonScene::new(SceneConfig::default());
        scene.attach_model(asset);
        let body = scene.body_position().unwrap();
        assert!((body - DVec3::new(2.0, 0.5, 0.0)).length() < 1e-6);

        let light = scene
            .illuminate(&Fixed(HorizontalCoordinate::new(0.0, 0.0)), reference().0, reference().1)
            .unwrap()
            .unwrap();
        assert!((light.position - (body + horizontal_to_direction(HorizontalCoordinate::new(0.0, 0.0)) * 6.0)).length() < 1e-9);
        assert!((scene.orbit().target - body).length() < 1e-9);
    }
}
