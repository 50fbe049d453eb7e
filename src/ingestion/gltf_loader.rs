use std::path::Path;

use glam::{DMat4, Mat4};
use tracing::{debug, warn};

use crate::error::{Result, SegmentationError};
use crate::style::{Color, Style, StyleSet};
use crate::transform::Transform;
use crate::types::Mesh;

/// Load a glTF or GLB file, one `Mesh` per scene node that carries a mesh.
///
/// Each mesh keeps its node's world transform; primitives are concatenated
/// and styled by their material's base color.
pub fn load_gltf(path: &Path) -> Result<Vec<Mesh>> {
    let (document, buffers, _images) = gltf::import(path)
        .map_err(|e| SegmentationError::Input(format!("Failed to load glTF: {e}")))?;

    debug!(
        meshes = document.meshes().len(),
        materials = document.materials().len(),
        nodes = document.nodes().len(),
        "Loaded glTF document"
    );

    let styles: Vec<Style> = document.materials().map(|m| convert_gltf_material(&m)).collect();
    let mut meshes = Vec::new();

    match document.default_scene().or_else(|| document.scenes().next()) {
        Some(scene) => {
            for node in scene.nodes() {
                visit_node(&node, DMat4::IDENTITY, &buffers, &styles, &mut meshes)?;
            }
        }
        None => {
            // Scene-less files: take the meshes untransformed.
            for mesh in document.meshes() {
                let category = mesh.name().unwrap_or("mesh").to_string();
                meshes.push(convert_mesh(&mesh, &category, Transform::identity(), &buffers, &styles)?);
            }
        }
    }

    Ok(meshes)
}

fn visit_node(
    node: &gltf::Node<'_>,
    parent: DMat4,
    buffers: &[gltf::buffer::Data],
    styles: &[Style],
    meshes: &mut Vec<Mesh>,
) -> Result<()> {
    let local = Mat4::from_cols_array_2d(&node.transform().matrix()).as_dmat4();
    let world = parent * local;

    if let Some(mesh) = node.mesh() {
        let category = node
            .name()
            .or_else(|| mesh.name())
            .map(str::to_string)
            .unwrap_or_else(|| format!("node{}", node.index()));
        meshes.push(convert_mesh(&mesh, &category, Transform::from_matrix(world), buffers, styles)?);
    }

    for child in node.children() {
        visit_node(&child, world, buffers, styles, meshes)?;
    }
    Ok(())
}

fn convert_mesh(
    mesh: &gltf::Mesh<'_>,
    category: &str,
    transform: Transform,
    buffers: &[gltf::buffer::Data],
    styles: &[Style],
) -> Result<Mesh> {
    let mut out = Mesh::new(category);
    out.set_transform_matrix(transform);

    let mut style_set = StyleSet::new();
    let mut vertex_offset = 0u32;
    let mut face_offset = 0u32;

    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            warn!(category, mode = ?primitive.mode(), "Skipping non-triangle primitive");
            continue;
        }

        let (positions, indices) = match extract_primitive(&primitive, buffers) {
            Ok(geometry) => geometry,
            Err(e) => {
                warn!(category, "Skipping primitive: {e}");
                continue;
            }
        };

        let style = primitive
            .material()
            .index()
            .and_then(|i| styles.get(i))
            .copied()
            .unwrap_or_default();

        let indices: Vec<u32> = indices.iter().map(|i| i + vertex_offset).collect();
        out.append_vertices(&positions)?;
        out.append_triangles(&indices)?;

        let faces = (indices.len() / 3) as u32;
        for face in face_offset..face_offset + faces {
            style_set.assign(style, face);
        }
        vertex_offset += (positions.len() / 3) as u32;
        face_offset += faces;
    }

    out.set_styles(style_set);
    Ok(out)
}

/// Positions and triangle indices of one primitive.
///
/// Non-indexed primitives get sequential indices.
fn extract_primitive(
    primitive: &gltf::Primitive<'_>,
    buffers: &[gltf::buffer::Data],
) -> Result<(Vec<f32>, Vec<u32>)> {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|d| &d[..]));

    let positions: Vec<f32> = reader
        .read_positions()
        .ok_or_else(|| SegmentationError::Input("Primitive missing positions".into()))?
        .flatten()
        .collect();

    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..(positions.len() / 3) as u32).collect(),
    };
    if indices.len() % 3 != 0 {
        return Err(SegmentationError::Input(format!(
            "Primitive has {} indices, not a multiple of 3",
            indices.len()
        )));
    }

    Ok((positions, indices))
}

/// Base color becomes the diffuse color; glTF has no specular term here.
fn convert_gltf_material(material: &gltf::Material<'_>) -> Style {
    let [r, g, b, a] = material.pbr_metallic_roughness().base_color_factor();
    Style::new(Color::new(r, g, b), Color::BLACK, a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;
    use std::fs;

    /// Parent node translated by +10 x, child node with a two-primitive mesh.
    const WALL_GLTF: &str = r#"{
  "asset": { "version": "2.0" },
  "scene": 0,
  "scenes": [{ "nodes": [0] }],
  "nodes": [
    { "name": "Storey", "translation": [10.0, 0.0, 0.0], "children": [1] },
    { "name": "IfcWall", "mesh": 0 }
  ],
  "meshes": [{
    "name": "wall",
    "primitives": [
      { "attributes": { "POSITION": 0 }, "indices": 1, "material": 0 },
      { "attributes": { "POSITION": 0 }, "indices": 1, "material": 1 }
    ]
  }],
  "materials": [
    { "pbrMetallicRoughness": { "baseColorFactor": [1.0, 0.0, 0.0, 1.0] } },
    { "pbrMetallicRoughness": { "baseColorFactor": [0.0, 0.0, 1.0, 0.5] } }
  ],
  "buffers": [{ "uri": "wall.bin", "byteLength": 42 }],
  "bufferViews": [
    { "buffer": 0, "byteOffset": 0, "byteLength": 36 },
    { "buffer": 0, "byteOffset": 36, "byteLength": 6 }
  ],
  "accessors": [
    { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
      "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] },
    { "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }
  ]
}"#;

    fn wall_buffer() -> Vec<u8> {
        let mut bytes = Vec::with_capacity(42);
        for v in [0.0f32, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0] {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        for i in [0u16, 1, 2] {
            bytes.extend_from_slice(&i.to_le_bytes());
        }
        bytes
    }

    #[test]
    fn load_gltf_node_hierarchy() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("wall.gltf"), WALL_GLTF).unwrap();
        fs::write(dir.path().join("wall.bin"), wall_buffer()).unwrap();

        let meshes = load_gltf(&dir.path().join("wall.gltf")).unwrap();
        assert_eq!(meshes.len(), 1);

        let wall = &meshes[0];
        assert_eq!(wall.category(), "IfcWall");
        assert_eq!(wall.vertex_count(), 6);
        assert_eq!(wall.triangle_count(), 2);
        assert_eq!(wall.triangles()[1].to_array(), [3, 4, 5]);

        // The parent translation reaches the child mesh.
        assert_eq!(wall.transform().apply(DVec3::ZERO), DVec3::new(10.0, 0.0, 0.0));
        let bounds = wall.world_bounds().unwrap();
        assert_eq!(bounds.min(), DVec3::new(10.0, 0.0, 0.0));
        assert_eq!(bounds.max(), DVec3::new(11.0, 1.0, 0.0));

        let styles = wall.styles().unwrap();
        let red = Style::opaque(Color::new(1.0, 0.0, 0.0));
        let blue = Style::new(Color::new(0.0, 0.0, 1.0), Color::BLACK, 0.5);
        assert_eq!(styles.styles_in_order(), &[red, blue]);
        assert_eq!(styles.slot_of(&blue), Some(1));
    }

    /// Second primitive's index accessor holds 4 indices.
    const RAGGED_GLTF: &str = r#"{
  "asset": { "version": "2.0" },
  "scene": 0,
  "scenes": [{ "nodes": [0] }],
  "nodes": [{ "name": "IfcSlab", "mesh": 0 }],
  "meshes": [{
    "primitives": [
      { "attributes": { "POSITION": 0 }, "indices": 1 },
      { "attributes": { "POSITION": 0 }, "indices": 2 }
    ]
  }],
  "buffers": [{ "uri": "slab.bin", "byteLength": 52 }],
  "bufferViews": [
    { "buffer": 0, "byteOffset": 0, "byteLength": 36 },
    { "buffer": 0, "byteOffset": 36, "byteLength": 6 },
    { "buffer": 0, "byteOffset": 44, "byteLength": 8 }
  ],
  "accessors": [
    { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
      "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] },
    { "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" },
    { "bufferView": 2, "componentType": 5123, "count": 4, "type": "SCALAR" }
  ]
}"#;

    #[test]
    fn ragged_index_primitive_is_skipped() {
        let mut buffer = wall_buffer();
        buffer.extend_from_slice(&[0, 0]);
        for i in [0u16, 1, 2, 0] {
            buffer.extend_from_slice(&i.to_le_bytes());
        }
        assert_eq!(buffer.len(), 52);

        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("slab.gltf"), RAGGED_GLTF).unwrap();
        fs::write(dir.path().join("slab.bin"), buffer).unwrap();

        let meshes = load_gltf(&dir.path().join("slab.gltf")).unwrap();
        assert_eq!(meshes.len(), 1);
        assert_eq!(meshes[0].vertex_count(), 3);
        assert_eq!(meshes[0].triangle_count(), 1);
        assert_eq!(meshes[0].styles().unwrap().face_count(), 1);
    }

    #[test]
    fn load_gltf_missing_file() {
        assert!(load_gltf(Path::new("/nonexistent/scene.gltf")).is_err());
    }
}
