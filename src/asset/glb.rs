//! Binary glTF (GLB) model inspection.
//!
//! Only what the scene needs is extracted: container metadata and the
//! world-space bounds of the default scene, with every node transform applied.
//! Vertex data is left to the renderer.

use std::collections::HashSet;

use glam::{DMat4, DVec3, Mat4};
use gltf::accessor::Dimensions;
use gltf::{Document, Glb, Gltf, Semantic};

use crate::core::{Error, Result};

/// Node hierarchies deeper than this are rejected (and cycles with them).
const MAX_NODE_DEPTH: usize = 64;

/// What the scene needs to know about a model.
#[derive(Clone, Debug, PartialEq)]
pub struct GlbInfo {
    /// glTF version string from the asset block.
    pub version: String,
    /// Exporter, if recorded.
    pub generator: Option<String>,
    /// Number of meshes in the document.
    pub mesh_count: usize,
    /// Scene-space bounding box minimum.
    pub bounds_min: DVec3,
    /// Scene-space bounding box maximum.
    pub bounds_max: DVec3,
    /// Whether a binary chunk follows the JSON.
    pub has_binary: bool,
}

impl GlbInfo {
    /// Parse a complete GLB file.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let glb = Glb::from_slice(bytes).map_err(invalid)?;
        let declared = glb.header.length as usize;
        if declared != bytes.len() {
            return Err(Error::Asset(format!(
                "GLB length mismatch: header says {declared}, got {}",
                bytes.len()
            )));
        }
        let has_binary = glb.bin.is_some();

        let gltf = Gltf::from_slice(bytes).map_err(invalid)?;
        let document = &gltf.document;
        let (bounds_min, bounds_max) = scene_bounds(document)?;
        let asset = &document.as_json().asset;

        Ok(Self {
            version: asset.version.clone(),
            generator: asset.generator.clone(),
            mesh_count: document.meshes().len(),
            bounds_min,
            bounds_max,
            has_binary,
        })
    }

    /// Centre of the bounding box.
    pub fn centre(&self) -> DVec3 {
        (self.bounds_min + self.bounds_max) * 0.5
    }

    /// Radius of the sphere enclosing the bounding box.
    pub fn bounding_radius(&self) -> f64 {
        (self.bounds_max - self.bounds_min).length() * 0.5
    }
}

fn invalid(e: gltf::Error) -> Error {
    Error::Asset(format!("invalid glTF: {e}"))
}

/// Running union of transformed primitive boxes.
struct Bounds {
    min: DVec3,
    max: DVec3,
}

impl Bounds {
    fn empty() -> Self {
        Self {
            min: DVec3::splat(f64::INFINITY),
            max: DVec3::splat(f64::NEG_INFINITY),
        }
    }

    fn is_empty(&self) -> bool {
        self.min.x > self.max.x
    }

    /// Add a model-space box, transformed into scene space.
    fn add_box(&mut self, min: DVec3, max: DVec3, transform: DMat4) {
        for i in 0..8 {
            let corner = DVec3::new(
                if i & 1 == 0 { min.x } else { max.x },
                if i & 2 == 0 { min.y } else { max.y },
                if i & 4 == 0 { min.z } else { max.z },
            );
            let p = transform.transform_point3(corner);
            self.min = self.min.min(p);
            self.max = self.max.max(p);
        }
    }
}

/// Bounds of the default scene (or the first scene, or the root nodes when
/// the file declares no scenes). Mesh-only files are measured untransformed.
fn scene_bounds(document: &Document) -> Result<(DVec3, DVec3)> {
    let roots: Vec<gltf::Node> = match document.default_scene().or_else(|| document.scenes().next()) {
        Some(scene) => scene.nodes().collect(),
        None => {
            let children: HashSet<usize> = document
                .nodes()
                .flat_map(|n| n.children().map(|c| c.index()).collect::<Vec<_>>())
                .collect();
            document
                .nodes()
                .filter(|n| !children.contains(&n.index()))
                .collect()
        }
    };

    let mut bounds = Bounds::empty();
    if roots.is_empty() {
        for mesh in document.meshes() {
            add_mesh(&mesh, DMat4::IDENTITY, &mut bounds)?;
        }
    } else {
        for node in &roots {
            add_node(node, DMat4::IDENTITY, 0, &mut bounds)?;
        }
    }

    if bounds.is_empty() {
        return Err(Error::Asset("model has no mesh positions".to_string()));
    }
    Ok((bounds.min, bounds.max))
}

fn add_node(node: &gltf::Node, parent: DMat4, depth: usize, bounds: &mut Bounds) -> Result<()> {
    if depth > MAX_NODE_DEPTH {
        return Err(Error::Asset(format!(
            "node {} is nested deeper than {MAX_NODE_DEPTH} levels",
            node.index()
        )));
    }

    let local = Mat4::from_cols_array_2d(&node.transform().matrix()).as_dmat4();
    let world = parent * local;

    if let Some(mesh) = node.mesh() {
        add_mesh(&mesh, world, bounds)?;
    }
    for child in node.children() {
        add_node(&child, world, depth + 1, bounds)?;
    }
    Ok(())
}

fn add_mesh(mesh: &gltf::Mesh, transform: DMat4, bounds: &mut Bounds) -> Result<()> {
    for primitive in mesh.primitives() {
        let Some(accessor) = primitive.get(&Semantic::Positions) else {
            continue;
        };
        // bounding_box() reads these; refuse rather than let it panic
        if !matches!(accessor.dimensions(), Dimensions::Vec3)
            || accessor.min().is_none()
            || accessor.max().is_none()
        {
            return Err(Error::Asset(format!(
                "POSITION accessor {} has no VEC3 bounds",
                accessor.index()
            )));
        }
        let bb = primitive.bounding_box();
        bounds.add_box(to_dvec3(bb.min), to_dvec3(bb.max), transform);
    }
    Ok(())
}

fn to_dvec3(v: [f32; 3]) -> DVec3 {
    DVec3::new(v[0] as f64, v[1] as f64, v[2] as f64)
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    const EPS: f64 = 1e-6;

    fn approx(a: DVec3, b: DVec3) -> bool {
        (a - b).length() < EPS
    }

    #[test]
    fn test_parse_moon() {
        let info = GlbInfo::parse(&moon_glb()).unwrap();
        assert_eq!(info.version, "2.0");
        assert_eq!(info.generator.as_deref(), Some("test"));
        assert_eq!(info.mesh_count, 1);
        assert!(info.has_binary);
        assert_eq!(info.centre(), DVec3::ZERO);
        assert!((info.bounding_radius() - 400.0 * 3f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_node_translation_moves_bounds() {
        let json = mesh_json([-1.0; 3], [1.0; 3], r#"[{"mesh": 0, "translation": [100, 0, 0]}]"#);
        let info = GlbInfo::parse(&encode_glb(&json, None)).unwrap();
        assert!(approx(info.centre(), DVec3::new(100.0, 0.0, 0.0)));
        assert!(approx(info.bounds_min, DVec3::new(99.0, -1.0, -1.0)));
        assert!(!info.has_binary);
    }

    #[test]
    fn test_nested_transforms_compose() {
        let nodes = r#"[
            {"children": [1], "scale": [2, 2, 2]},
            {"mesh": 0, "translation": [0, 5, 0]}
        ]"#;
        let json = mesh_json([-1.0; 3], [1.0; 3], nodes);
        let info = GlbInfo::parse(&encode_glb(&json, None)).unwrap();
        assert!(approx(info.centre(), DVec3::new(0.0, 10.0, 0.0)));
        assert!(approx(info.bounds_max - info.bounds_min, DVec3::splat(4.0)));
    }

    #[test]
    fn test_node_rotation_applied() {
        // Quarter turn about +Y takes +X to -Z
        let h = std::f64::consts::FRAC_1_SQRT_2;
        let nodes = format!(r#"[{{"mesh": 0, "rotation": [0, {h}, 0, {h}]}}]"#);
        let json = mesh_json([1.0, -1.0, -1.0], [3.0, 1.0, 1.0], &nodes);
        let info = GlbInfo::parse(&encode_glb(&json, None)).unwrap();
        assert!(approx(info.centre(), DVec3::new(0.0, 0.0, -2.0)));
    }

    #[test]
    fn test_default_scene_selected() {
        let json = format!(
            r#"{{
                "asset": {{"version": "2.0"}},
                "scene": 1,
                "scenes": [{{"nodes": [0]}}, {{"nodes": [1]}}],
                "nodes": [
                    {{"mesh": 0, "translation": [-50, 0, 0]}},
                    {{"mesh": 0, "translation": [0, 0, 7]}}
                ],
                "meshes": [{{"primitives": [{{"attributes": {{"POSITION": 0}}}}]}}],
                "accessors": [{}]
            }}"#,
            position_accessor([-1.0; 3], [1.0; 3])
        );
        let info = GlbInfo::parse(&encode_glb(&json, None)).unwrap();
        assert!(approx(info.centre(), DVec3::new(0.0, 0.0, 7.0)));
    }

    #[test]
    fn test_mesh_without_nodes_measured_in_place() {
        let info = GlbInfo::parse(&bounded_glb([0.0, 0.0, 0.0], [800.0, 400.0, 0.0])).unwrap();
        assert!(approx(info.centre(), DVec3::new(400.0, 200.0, 0.0)));
    }

    #[test]
    fn test_rejects_bad_magic() {
        let mut bytes = moon_glb();
        bytes[0] = b'X';
        assert!(matches!(GlbInfo::parse(&bytes), Err(Error::Asset(_))));
    }

    #[test]
    fn test_rejects_wrong_version() {
        let mut bytes = moon_glb();
        bytes[4..8].copy_from_slice(&1u32.to_le_bytes());
        assert!(matches!(GlbInfo::parse(&bytes), Err(Error::Asset(_))));
    }

    #[test]
    fn test_rejects_truncated() {
        let bytes = moon_glb();
        assert!(GlbInfo::parse(&bytes[..bytes.len() - 8]).is_err());
        assert!(GlbInfo::parse(&bytes[..6]).is_err());
    }

    #[test]
    fn test_rejects_trailing_bytes() {
        let mut bytes = moon_glb();
        bytes.extend_from_slice(&[0, 0, 0, 0]);
        assert!(matches!(GlbInfo::parse(&bytes), Err(Error::Asset(_))));
    }

    #[test]
    fn test_rejects_model_without_positions() {
        let json = r#"{"asset": {"version": "2.0"}, "meshes": []}"#;
        assert!(matches!(
            GlbInfo::parse(&encode_glb(json, None)),
            Err(Error::Asset(_))
        ));
    }

    #[test]
    fn test_rejects_bad_json() {
        let bytes = encode_glb("{not json", None);
        assert!(matches!(GlbInfo::parse(&bytes), Err(Error::Asset(_))));
    }
}
