use glam::DVec3;

use super::bounds::BoundingBox;
use crate::style::Color;

/// Slot value for triangles that no style covers.
pub const UNASSIGNED_STYLE_SLOT: i32 = -1;

/// Name under which the per-triangle slot array is exposed to renderers.
pub const STYLE_SLOT_ATTRIBUTE: &str = "Style Id";

/// World-space triangle mesh ready for a renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderableMesh {
    pub category: String,
    /// Transformed vertex positions.
    pub positions: Vec<DVec3>,
    /// Connectivity, unchanged from the source mesh.
    pub triangles: Vec<[u32; 3]>,
    /// Palette slot per triangle, present when the mesh has styles.
    pub style_slots: Option<Vec<i32>>,
}

impl RenderableMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Axis-aligned bounds of the world-space positions.
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::from_points(self.positions.iter().copied())
    }

    /// Interleaved single-precision positions for GPU upload.
    pub fn positions_f32(&self) -> Vec<f32> {
        self.positions
            .iter()
            .flat_map(|p| [p.x as f32, p.y as f32, p.z as f32])
            .collect()
    }

    /// Flat `[i, j, k, ...]` index buffer.
    pub fn indices(&self) -> Vec<u32> {
        self.triangles.iter().flatten().copied().collect()
    }
}

/// World-space point set with optional per-point colors.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderablePoints {
    pub positions: Vec<DVec3>,
    pub colors: Option<Vec<Color>>,
}

impl RenderablePoints {
    pub fn point_count(&self) -> usize {
        self.positions.len()
    }

    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::from_points(self.positions.iter().copied())
    }
}
