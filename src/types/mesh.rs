use std::fmt;

use glam::DVec3;
use tracing::{debug, warn};

use crate::error::{Result, SegmentationError};
use crate::style::StyleSet;
use crate::transform::{MatrixLayout, Transform};

use super::bounds::BoundingBox;
use super::material::MaterialStrategy;
use super::renderable::{RenderableMesh, UNASSIGNED_STYLE_SLOT};

/// Three 0-based indices into the owning mesh's vertex list.
///
/// Indices are not range checked; the producer guarantees they are valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Triangle {
    pub i: u32,
    pub j: u32,
    pub k: u32,
}

impl Triangle {
    pub fn new(i: u32, j: u32, k: u32) -> Self {
        Self { i, j, k }
    }

    pub fn to_array(self) -> [u32; 3] {
        [self.i, self.j, self.k]
    }
}

/// A triangle mesh from a reference model, in local coordinates.
///
/// Vertices and triangles are appended from flat buffers; the transform
/// maps them to world space whenever they leave the mesh. Call
/// [`Mesh::build_renderable`] once population is complete; the result is a
/// snapshot and later mutation does not touch it.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    category: String,
    vertices: Vec<DVec3>,
    triangles: Vec<Triangle>,
    transform: Transform,
    styles: Option<StyleSet>,
}

impl Mesh {
    /// Empty mesh tagged with a category (e.g. the source entity type).
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            ..Default::default()
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn vertices(&self) -> &[DVec3] {
        &self.vertices
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn styles(&self) -> Option<&StyleSet> {
        self.styles.as_ref()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Whether the mesh lacks vertices or triangles.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.triangles.is_empty()
    }

    /// Append vertices from an interleaved `[x, y, z, x, y, z, ...]` buffer.
    pub fn append_vertices<T>(&mut self, flat: &[T]) -> Result<()>
    where
        T: Copy + Into<f64>,
    {
        check_triples("vertex", flat.len())?;
        self.vertices.reserve(flat.len() / 3);
        self.vertices.extend(
            flat.chunks_exact(3)
                .map(|c| DVec3::new(c[0].into(), c[1].into(), c[2].into())),
        );
        Ok(())
    }

    /// Append triangles from an `[i, j, k, i, j, k, ...]` index buffer.
    pub fn append_triangles(&mut self, flat: &[u32]) -> Result<()> {
        check_triples("triangle index", flat.len())?;
        self.triangles.reserve(flat.len() / 3);
        self.triangles.extend(
            flat.chunks_exact(3)
                .map(|c| Triangle::new(c[0], c[1], c[2])),
        );
        Ok(())
    }

    /// Set the local-to-world transform from 16 values.
    pub fn set_transform(&mut self, values: &[f64], layout: MatrixLayout) -> Result<()> {
        self.transform = Transform::from_values(values, layout)?;
        Ok(())
    }

    pub fn set_transform_matrix(&mut self, transform: Transform) {
        self.transform = transform;
    }

    pub fn set_styles(&mut self, styles: StyleSet) {
        self.styles = Some(styles);
    }

    /// Vertices mapped through the transform.
    pub fn world_vertices(&self) -> impl Iterator<Item = DVec3> + '_ {
        self.vertices.iter().map(|v| self.transform.apply(*v))
    }

    /// World-space bounds of the transformed vertices, `None` without vertices.
    pub fn world_bounds(&self) -> Option<BoundingBox> {
        let bounds = BoundingBox::from_points(self.world_vertices());
        bounds.is_valid().then_some(bounds)
    }

    /// Assemble the renderer-facing form of this mesh.
    ///
    /// Returns `None` when there are no vertices or no triangles. When a
    /// style set is attached, every triangle gets the palette slot of its
    /// style; triangles no style covers keep [`UNASSIGNED_STYLE_SLOT`].
    pub fn build_renderable(&self) -> Option<RenderableMesh> {
        if self.is_empty() {
            debug!(
                category = %self.category,
                vertices = self.vertices.len(),
                triangles = self.triangles.len(),
                "Skipping empty mesh"
            );
            return None;
        }

        let positions: Vec<DVec3> = self.world_vertices().collect();
        let triangles: Vec<[u32; 3]> = self.triangles.iter().map(|t| t.to_array()).collect();
        let style_slots = self.styles.as_ref().map(|styles| self.style_slots(styles));

        Some(RenderableMesh {
            category: self.category.clone(),
            positions,
            triangles,
            style_slots,
        })
    }

    /// How the renderer should color this mesh.
    pub fn material_strategy(&self) -> Result<MaterialStrategy> {
        self.styles
            .as_ref()
            .and_then(MaterialStrategy::from_styles)
            .ok_or_else(|| SegmentationError::NoStyleAssigned(self.category.clone()))
    }

    fn style_slots(&self, styles: &StyleSet) -> Vec<i32> {
        let count = self.triangles.len();
        let mut slots = vec![UNASSIGNED_STYLE_SLOT; count];
        let mut skipped = 0usize;

        for (slot, entry) in styles.finalize().iter().enumerate() {
            for range in &entry.ranges {
                let start = range.start as usize;
                let end = (range.end as usize + 1).min(count);
                if start < end {
                    slots[start..end].fill(slot as i32);
                }
                skipped += range.len() - end.saturating_sub(start);
            }
        }

        if skipped > 0 {
            warn!(
                category = %self.category,
                skipped,
                triangles = count,
                "Style ranges reference faces past the end of the mesh"
            );
        }
        slots
    }
}

fn check_triples(what: &str, len: usize) -> Result<()> {
    if len % 3 != 0 {
        return Err(SegmentationError::MalformedInput(format!(
            "{what} buffer length {len} is not a multiple of 3"
        )));
    }
    Ok(())
}

impl fmt::Display for Mesh {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Triangle Mesh of type: {}", self.category)?;
        writeln!(f, "\tNumber of vertices: {}", self.vertices.len())?;
        writeln!(f, "\tNumber of triangles: {}", self.triangles.len())?;
        write!(f, "\tTransform:\n{}", self.transform)?;
        match &self.styles {
            Some(styles) => writeln!(f, "\tRenderer Styles: {styles}"),
            None => writeln!(f, "\tRenderer Styles: none"),
        }
    }
}
