use glam::DVec3;
use tracing::warn;

use crate::error::{Result, SegmentationError};
use crate::style::Color;
use crate::transform::Transform;

use super::bounds::BoundingBox;
use super::renderable::RenderablePoints;

/// Laser-scan points in scanner coordinates plus the scan-to-model transform.
#[derive(Debug, Clone, Default)]
pub struct PointCloud {
    positions: Vec<DVec3>,
    colors: Vec<Color>,
    transform: Transform,
}

impl PointCloud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn positions(&self) -> &[DVec3] {
        &self.positions
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Whether every point has a color.
    pub fn has_colors(&self) -> bool {
        !self.colors.is_empty() && self.colors.len() == self.positions.len()
    }

    /// Append points from an interleaved `[x, y, z, ...]` buffer.
    pub fn append_points<T>(&mut self, flat: &[T]) -> Result<()>
    where
        T: Copy + Into<f64>,
    {
        if flat.len() % 3 != 0 {
            return Err(SegmentationError::MalformedInput(format!(
                "point buffer length {} is not a multiple of 3",
                flat.len()
            )));
        }
        self.positions.extend(
            flat.chunks_exact(3)
                .map(|c| DVec3::new(c[0].into(), c[1].into(), c[2].into())),
        );
        Ok(())
    }

    /// Append colors from an interleaved `[r, g, b, ...]` buffer in [0, 1].
    pub fn append_colors(&mut self, flat: &[f32]) -> Result<()> {
        if flat.len() % 3 != 0 {
            return Err(SegmentationError::MalformedInput(format!(
                "color buffer length {} is not a multiple of 3",
                flat.len()
            )));
        }
        self.colors
            .extend(flat.chunks_exact(3).map(|c| Color::new(c[0], c[1], c[2])));
        Ok(())
    }

    pub fn set_transform_matrix(&mut self, transform: Transform) {
        self.transform = transform;
    }

    /// World-space bounds of the transformed points, `None` when empty.
    pub fn world_bounds(&self) -> Option<BoundingBox> {
        let bounds =
            BoundingBox::from_points(self.positions.iter().map(|p| self.transform.apply(*p)));
        bounds.is_valid().then_some(bounds)
    }

    /// Transform every point into world space.
    ///
    /// Colors are forwarded only when there is exactly one per point.
    pub fn build_renderable(&self) -> Option<RenderablePoints> {
        if self.positions.is_empty() {
            return None;
        }

        let positions = self
            .positions
            .iter()
            .map(|p| self.transform.apply(*p))
            .collect();

        let colors = if self.has_colors() {
            Some(self.colors.clone())
        } else {
            if !self.colors.is_empty() {
                warn!(
                    points = self.positions.len(),
                    colors = self.colors.len(),
                    "Point and color counts differ, dropping colors"
                );
            }
            None
        };

        Some(RenderablePoints { positions, colors })
    }
}
