use glam::DVec3;

use crate::types::BoundingBox;

/// Points per closed face loop: four corners plus the first one repeated.
pub const FACE_LOOP_LEN: usize = 5;

/// Line geometry for drawing box outlines.
///
/// Each loop lists five indices into `points`, `a, b, c, d, a`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Wireframe {
    pub points: Vec<DVec3>,
    pub loops: Vec<[u32; FACE_LOOP_LEN]>,
}

impl Wireframe {
    /// Outline of a single box: 8 corners, 6 face loops.
    pub fn from_bounds(bounds: &BoundingBox) -> Self {
        let loops = BoundingBox::FACE_LOOPS
            .iter()
            .map(|&[a, b, c, d]| [a, b, c, d, a])
            .collect();
        Self {
            points: bounds.corners().to_vec(),
            loops,
        }
    }

    /// Append another wireframe, re-indexing its loops.
    pub fn append(&mut self, other: &Wireframe) {
        let offset = self.points.len() as u32;
        self.points.extend_from_slice(&other.points);
        self.loops
            .extend(other.loops.iter().map(|l| l.map(|i| i + offset)));
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn loop_count(&self) -> usize {
        self.loops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loops.is_empty()
    }

    /// Every loop edge as a `(start, end)` segment.
    pub fn segments(&self) -> impl Iterator<Item = (DVec3, DVec3)> + '_ {
        self.loops.iter().flat_map(move |l| {
            l.windows(2)
                .map(move |w| (self.points[w[0] as usize], self.points[w[1] as usize]))
                .collect::<Vec<_>>()
        })
    }
}
