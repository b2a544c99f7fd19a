//! The moon scene: graph, light, camera, and what moves them.

pub mod config;
pub mod control;
pub mod flatten;
pub mod graph;
pub mod manager;
pub mod node;

pub use config::{LightSource, SceneConfig};
pub use control::{SceneController, SceneReport};
pub use flatten::{EntryKind, FlatEntry};
pub use graph::SceneGraph;
pub use manager::MoonScene;
pub use node::{LocalTransform, NodeContent, SceneNode, SceneNodeId};
