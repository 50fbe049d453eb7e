use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use ply_rs::parser::Parser;
use ply_rs::ply::{DefaultElement, Property};
use tracing::debug;

use crate::error::{Result, SegmentationError};
use crate::style::{Style, StyleSet};
use crate::types::{Mesh, PointCloud};

/// Raw vertex, color and face buffers read from a PLY file.
#[derive(Debug, Default)]
pub struct PlyData {
    /// Interleaved `[x, y, z, ...]`.
    pub positions: Vec<f32>,
    /// Interleaved `[r, g, b, ...]` in [0, 1]; empty when the file has no colors.
    pub colors: Vec<f32>,
    /// Fan-triangulated face indices.
    pub indices: Vec<u32>,
}

impl PlyData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Points (and colors when present); faces are ignored.
    pub fn into_point_cloud(self) -> Result<PointCloud> {
        let mut cloud = PointCloud::new();
        cloud.append_points(&self.positions)?;
        cloud.append_colors(&self.colors)?;
        Ok(cloud)
    }

    /// A single mesh styled with the default style on every face.
    pub fn into_mesh(self, category: &str) -> Result<Mesh> {
        let mut mesh = Mesh::new(category);
        mesh.append_vertices(&self.positions)?;
        mesh.append_triangles(&self.indices)?;

        let mut styles = StyleSet::new();
        let style = Style::default();
        styles.register(style);
        for face in 0..mesh.triangle_count() as u32 {
            styles.assign(style, face);
        }
        mesh.set_styles(styles);
        Ok(mesh)
    }
}

/// Parse a PLY file.
pub fn load_ply(path: &Path) -> Result<PlyData> {
    let file = File::open(path)
        .map_err(|e| SegmentationError::Input(format!("Failed to open PLY: {e}")))?;
    let mut reader = BufReader::new(file);

    let parser = Parser::<DefaultElement>::new();
    let ply = parser
        .read_ply(&mut reader)
        .map_err(|e| SegmentationError::Input(format!("Failed to parse PLY: {e}")))?;

    let vertices = ply
        .payload
        .get("vertex")
        .ok_or_else(|| SegmentationError::Input("PLY file missing 'vertex' element".into()))?;

    debug!(vertex_count = vertices.len(), "Parsing PLY vertices");

    let has_colors = vertices
        .first()
        .map(|v| v.contains_key("red") || v.contains_key("r"))
        .unwrap_or(false);

    let mut data = PlyData {
        positions: Vec::with_capacity(vertices.len() * 3),
        colors: Vec::with_capacity(if has_colors { vertices.len() * 3 } else { 0 }),
        indices: Vec::new(),
    };

    for vertex in vertices {
        data.positions.push(get_float_property(vertex, "x")?);
        data.positions.push(get_float_property(vertex, "y")?);
        data.positions.push(get_float_property(vertex, "z")?);

        if has_colors {
            let (r, g, b) = get_color_property(vertex)?;
            data.colors.extend([r, g, b]);
        }
    }

    if let Some(faces) = ply.payload.get("face") {
        debug!(face_count = faces.len(), "Parsing PLY faces");
        for face in faces {
            let face_indices = get_index_list(face)?;
            if face_indices.len() >= 3 {
                for i in 1..face_indices.len() - 1 {
                    data.indices.extend([face_indices[0], face_indices[i], face_indices[i + 1]]);
                }
            }
        }
    }

    Ok(data)
}

/// Extract a numeric property as f32.
fn get_float_property(element: &DefaultElement, key: &str) -> Result<f32> {
    let prop = element.get(key).ok_or_else(|| {
        SegmentationError::Input(format!("PLY vertex missing property '{key}'"))
    })?;

    match prop {
        Property::Float(v) => Ok(*v),
        Property::Double(v) => Ok(*v as f32),
        Property::Int(v) => Ok(*v as f32),
        Property::Short(v) => Ok(*v as f32),
        Property::UInt(v) => Ok(*v as f32),
        Property::UShort(v) => Ok(*v as f32),
        Property::Char(v) => Ok(*v as f32),
        Property::UChar(v) => Ok(*v as f32),
        _ => Err(SegmentationError::Input(format!(
            "PLY property '{key}' has unsupported type"
        ))),
    }
}

/// RGB from `red`/`green`/`blue` or `r`/`g`/`b`.
fn get_color_property(element: &DefaultElement) -> Result<(f32, f32, f32)> {
    let r_key = if element.contains_key("red") { "red" } else { "r" };
    let g_key = if element.contains_key("green") { "green" } else { "g" };
    let b_key = if element.contains_key("blue") { "blue" } else { "b" };

    Ok((
        normalize_color_value(element, r_key)?,
        normalize_color_value(element, g_key)?,
        normalize_color_value(element, b_key)?,
    ))
}

/// Integer channels are 0-255; float channels are taken as-is.
fn normalize_color_value(element: &DefaultElement, key: &str) -> Result<f32> {
    let prop = element.get(key).ok_or_else(|| {
        SegmentationError::Input(format!("PLY vertex missing color property '{key}'"))
    })?;

    match prop {
        Property::UChar(v) => Ok(*v as f32 / 255.0),
        Property::Float(v) => Ok(*v),
        Property::Double(v) => Ok(*v as f32),
        Property::Short(v) => Ok(*v as f32 / 255.0),
        Property::UShort(v) => Ok(*v as f32 / 255.0),
        Property::Int(v) => Ok(*v as f32 / 255.0),
        Property::UInt(v) => Ok(*v as f32 / 255.0),
        _ => Err(SegmentationError::Input(format!(
            "PLY color property '{key}' has unsupported type"
        ))),
    }
}

fn get_index_list(face: &DefaultElement) -> Result<Vec<u32>> {
    let key = if face.contains_key("vertex_indices") {
        "vertex_indices"
    } else {
        "vertex_index"
    };

    let prop = face
        .get(key)
        .ok_or_else(|| SegmentationError::Input("PLY face missing vertex_indices property".into()))?;

    match prop {
        Property::ListInt(v) => v.iter().map(|&i| non_negative_index(i.into())).collect(),
        Property::ListUInt(v) => Ok(v.clone()),
        Property::ListUChar(v) => Ok(v.iter().map(|&i| u32::from(i)).collect()),
        Property::ListShort(v) => v.iter().map(|&i| non_negative_index(i.into())).collect(),
        Property::ListUShort(v) => Ok(v.iter().map(|&i| u32::from(i)).collect()),
        _ => Err(SegmentationError::Input(
            "PLY face vertex_indices has unsupported type".into(),
        )),
    }
}

fn non_negative_index(index: i64) -> Result<u32> {
    u32::try_from(index)
        .map_err(|_| SegmentationError::Input(format!("PLY face has invalid vertex index {index}")))
}
