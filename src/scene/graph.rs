//! Scene graph: CPU-side hierarchy of nodes.
//!
//! Nodes are organised with parent/child relationships. `flatten()` walks the
//! tree and produces a flat `Vec<FlatEntry>` a renderer can consume directly.

use std::collections::HashMap;

use glam::{Mat4, Vec3};

use super::flatten::{EntryKind, FlatEntry};
use super::node::{LocalTransform, NodeContent, SceneNode, SceneNodeId};

/// CPU-side scene graph holding the moon, its light, and any grouping nodes.
pub struct SceneGraph {
    nodes: HashMap<SceneNodeId, SceneNode>,
    root: SceneNodeId,
    next_id: u64,
    dirty: bool,
}

impl SceneGraph {
    /// Create a new scene graph with a root Group node.
    pub fn new() -> Self {
        let root_id = SceneNodeId(0);
        let root_node = SceneNode::new(root_id, "root", NodeContent::Group);

        let mut nodes = HashMap::new();
        nodes.insert(root_id, root_node);

        Self {
            nodes,
            root: root_id,
            next_id: 1,
            dirty: true,
        }
    }

    /// Get the root node ID.
    pub fn root(&self) -> SceneNodeId {
        self.root
    }

    fn alloc_id(&mut self) -> SceneNodeId {
        let id = SceneNodeId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Add a child node under `parent`. Returns the new node's ID.
    pub fn add_child(
        &mut self,
        parent: SceneNodeId,
        name: impl Into<String>,
        content: NodeContent,
    ) -> SceneNodeId {
        let id = self.alloc_id();
        let mut node = SceneNode::new(id, name, content);
        node.parent = Some(parent);

        self.nodes.insert(id, node);

        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            parent_node.children.push(id);
        }

        self.dirty = true;
        id
    }

    /// Remove a node and its entire subtree. Cannot remove the root.
    pub fn remove(&mut self, id: SceneNodeId) {
        if id == self.root {
            return;
        }

        // Collect subtree IDs (BFS)
        let mut to_remove = vec![id];
        let mut i = 0;
        while i < to_remove.len() {
            let current = to_remove[i];
            if let Some(node) = self.nodes.get(&current) {
                to_remove.extend_from_slice(&node.children);
            }
            i += 1;
        }

        if let Some(parent_id) = self.nodes.get(&id).and_then(|n| n.parent) {
            if let Some(parent) = self.nodes.get_mut(&parent_id) {
                parent.children.retain(|c| *c != id);
            }
        }

        for nid in to_remove {
            self.nodes.remove(&nid);
        }

        self.dirty = true;
    }

    /// Set the local transform of a node.
    pub fn set_transform(&mut self, id: SceneNodeId, transform: LocalTransform) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.local_transform = transform;
            self.dirty = true;
        }
    }

    /// Move a node without touching its rotation or scale.
    pub fn set_position(&mut self, id: SceneNodeId, position: Vec3) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.local_transform.position = position;
            self.dirty = true;
        }
    }

    /// Get an immutable reference to a node.
    pub fn get(&self, id: SceneNodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    /// Total number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Recompute world transforms if anything moved.
    pub fn update_transforms(&mut self) {
        if self.dirty {
            self.propagate_transforms(self.root, Mat4::IDENTITY);
            self.dirty = false;
        }
    }

    /// World transform of a node as of the last propagation.
    pub fn world_transform(&self, id: SceneNodeId) -> Option<Mat4> {
        self.nodes.get(&id).map(|n| n.world_transform)
    }

    /// Walk the tree, propagate transforms, and collect every model and light.
    pub fn flatten(&mut self) -> Vec<FlatEntry> {
        self.propagate_transforms(self.root, Mat4::IDENTITY);
        self.dirty = false;

        let mut out = Vec::new();
        self.collect_entries(self.root, &mut out);
        out
    }

    fn propagate_transforms(&mut self, node_id: SceneNodeId, parent_world: Mat4) {
        let (local_mat, children) = {
            let node = match self.nodes.get(&node_id) {
                Some(n) => n,
                None => return,
            };
            (node.local_transform.to_mat4(), node.children.clone())
        };

        let world = parent_world * local_mat;

        if let Some(node) = self.nodes.get_mut(&node_id) {
            node.world_transform = world;
        }

        for child_id in children {
            self.propagate_transforms(child_id, world);
        }
    }

    fn collect_entries(&self, node_id: SceneNodeId, out: &mut Vec<FlatEntry>) {
        let node = match self.nodes.get(&node_id) {
            Some(n) => n,
            None => return,
        };

        let (scale, _, world_position) = node.world_transform.to_scale_rotation_translation();
        let kind = match &node.content {
            NodeContent::Group => None,
            NodeContent::Model { asset, bounds_radius } => Some(EntryKind::Model {
                path: asset.path.display().to_string(),
                bounding_radius: bounds_radius * scale.x,
            }),
            NodeContent::PointLight { color, intensity } => Some(EntryKind::PointLight {
                color: *color,
                intensity: *intensity,
            }),
        };

        if let Some(kind) = kind {
            out.push(FlatEntry {
                id: node.id,
                name: node.name.clone(),
                kind,
                world_position,
                scale: scale.x,
            });
        }

        for &child_id in &node.children {
            self.collect_entries(child_id, out);
        }
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}
