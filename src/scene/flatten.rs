//! Flattened scene graph output.
//!
//! `FlatEntry` is the result of walking the scene graph: one entry per
//! model or light, with its world-space pose, ready for a renderer.

use glam::Vec3;
use serde::Serialize;

use super::node::SceneNodeId;

/// What kind of thing an entry draws.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntryKind {
    /// A model; radius is in world units after scaling.
    Model { path: String, bounding_radius: f32 },
    /// A point light.
    PointLight { color: [f32; 3], intensity: f32 },
}

/// One entry in the flattened scene.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FlatEntry {
    #[serde(skip)]
    pub id: SceneNodeId,
    pub name: String,
    #[serde(flatten)]
    pub kind: EntryKind,
    /// World-space position after transform propagation.
    pub world_position: Vec3,
    /// Accumulated uniform scale.
    pub scale: f32,
}
