use glam::DVec3;

/// Closed interval along a single axis.
///
/// [`Extent::EMPTY`] is the "no data yet" state: its `min` is `+inf` and its
/// `max` is `-inf`, so the first [`Extent::update`] snaps both ends to the
/// value. An extent in that state must not be used as a bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub min: f64,
    pub max: f64,
}

impl Extent {
    pub const EMPTY: Extent = Extent {
        min: f64::INFINITY,
        max: f64::NEG_INFINITY,
    };

    /// Extent spanning `a` and `b`, in either order.
    pub fn new(a: f64, b: f64) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Widen the extent to include `value`.
    pub fn update(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    /// Smallest extent covering both `self` and `other`.
    pub fn merge(&self, other: &Extent) -> Extent {
        Extent {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Whether at least one value has been recorded.
    pub fn is_valid(&self) -> bool {
        self.min <= self.max
    }

    pub fn length(&self) -> f64 {
        if self.is_valid() {
            self.max - self.min
        } else {
            0.0
        }
    }

    pub fn center(&self) -> f64 {
        (self.min + self.max) * 0.5
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Length of the overlap with `other` (zero when they only touch or are disjoint).
    pub fn overlap(&self, other: &Extent) -> f64 {
        (self.max.min(other.max) - self.min.max(other.min)).max(0.0)
    }
}

impl Default for Extent {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Axis-aligned bounding box in 3-D, stored as one [`Extent`] per axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundingBox {
    pub x: Extent,
    pub y: Extent,
    pub z: Extent,
}

impl BoundingBox {
    /// Corner indices of the six faces, each a loop of four entries into
    /// [`BoundingBox::corners`].
    pub const FACE_LOOPS: [[u32; 4]; 6] = [
        [0, 2, 6, 4], // -x
        [1, 3, 7, 5], // +x
        [0, 1, 5, 4], // -y
        [2, 3, 7, 6], // +y
        [0, 1, 3, 2], // -z
        [4, 5, 7, 6], // +z
    ];

    /// Box with no data recorded yet.
    pub fn empty() -> Self {
        Self {
            x: Extent::EMPTY,
            y: Extent::EMPTY,
            z: Extent::EMPTY,
        }
    }

    /// Box spanning two opposite corners, given in any order.
    pub fn from_corners(a: DVec3, b: DVec3) -> Self {
        Self {
            x: Extent::new(a.x, b.x),
            y: Extent::new(a.y, b.y),
            z: Extent::new(a.z, b.z),
        }
    }

    /// Tightest box around a set of points; empty if the iterator is.
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = DVec3>,
    {
        let mut bounds = Self::empty();
        for p in points {
            bounds.update(p);
        }
        bounds
    }

    /// Widen the box to include `p`.
    pub fn update(&mut self, p: DVec3) {
        self.x.update(p.x);
        self.y.update(p.y);
        self.z.update(p.z);
    }

    /// Return the smallest box that contains both `self` and `other`.
    pub fn merge(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            x: self.x.merge(&other.x),
            y: self.y.merge(&other.y),
            z: self.z.merge(&other.z),
        }
    }

    /// Whether every axis has seen at least one value.
    pub fn is_valid(&self) -> bool {
        self.x.is_valid() && self.y.is_valid() && self.z.is_valid()
    }

    pub fn min(&self) -> DVec3 {
        DVec3::new(self.x.min, self.y.min, self.z.min)
    }

    pub fn max(&self) -> DVec3 {
        DVec3::new(self.x.max, self.y.max, self.z.max)
    }

    /// Centre point of the box.
    pub fn center(&self) -> DVec3 {
        DVec3::new(self.x.center(), self.y.center(), self.z.center())
    }

    /// Full edge length along each axis.
    pub fn lengths(&self) -> DVec3 {
        DVec3::new(self.x.length(), self.y.length(), self.z.length())
    }

    /// Half-extents along each axis.
    pub fn half_extents(&self) -> DVec3 {
        self.lengths() * 0.5
    }

    /// Length of the space diagonal.
    pub fn diagonal(&self) -> f64 {
        self.lengths().length()
    }

    pub fn volume(&self) -> f64 {
        let l = self.lengths();
        l.x * l.y * l.z
    }

    /// Volume shared with `other`; zero for boxes that only share a face.
    pub fn intersection_volume(&self, other: &BoundingBox) -> f64 {
        self.x.overlap(&other.x) * self.y.overlap(&other.y) * self.z.overlap(&other.z)
    }

    /// Whether a point lies inside (or on the boundary of) the box.
    pub fn contains_point(&self, p: DVec3) -> bool {
        self.x.contains(p.x) && self.y.contains(p.y) && self.z.contains(p.z)
    }

    /// The eight corners. Bit 0 of the index selects max x, bit 1 max y, bit 2 max z.
    pub fn corners(&self) -> [DVec3; 8] {
        let lo = self.min();
        let hi = self.max();
        std::array::from_fn(|i| {
            DVec3::new(
                if i & 1 != 0 { hi.x } else { lo.x },
                if i & 2 != 0 { hi.y } else { lo.y },
                if i & 4 != 0 { hi.z } else { lo.z },
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> BoundingBox {
        BoundingBox::from_corners(DVec3::ZERO, DVec3::ONE)
    }

    #[test]
    fn empty_extent_is_invalid_until_updated() {
        let mut e = Extent::EMPTY;
        assert!(!e.is_valid());
        assert_eq!(e.length(), 0.0);

        e.update(2.5);
        assert!(e.is_valid());
        assert_eq!(e.min, 2.5);
        assert_eq!(e.max, 2.5);

        e.update(-1.0);
        assert_eq!(e.min, -1.0);
        assert_eq!(e.max, 2.5);
    }

    #[test]
    fn extent_new_orders_ends() {
        let e = Extent::new(3.0, -3.0);
        assert_eq!(e.min, -3.0);
        assert_eq!(e.max, 3.0);
    }

    #[test]
    fn merging_with_empty_is_identity() {
        let b = unit_box();
        assert_eq!(b.merge(&BoundingBox::empty()), b);
        assert_eq!(BoundingBox::empty().merge(&b), b);
    }

    #[test]
    fn bounding_box_center_and_half_extents() {
        let bb = BoundingBox::from_corners(DVec3::ZERO, DVec3::new(2.0, 4.0, 6.0));
        assert_eq!(bb.center(), DVec3::new(1.0, 2.0, 3.0));
        assert_eq!(bb.half_extents(), DVec3::new(1.0, 2.0, 3.0));
        assert_eq!(bb.volume(), 48.0);
    }

    #[test]
    fn bounding_box_diagonal() {
        let expected = 3.0_f64.sqrt();
        assert!((unit_box().diagonal() - expected).abs() < 1e-10);
    }

    #[test]
    fn bounding_box_contains_point() {
        let bb = unit_box();
        assert!(bb.contains_point(DVec3::splat(0.5)));
        assert!(bb.contains_point(DVec3::ZERO)); // boundary
        assert!(bb.contains_point(DVec3::ONE)); // boundary
        assert!(!bb.contains_point(DVec3::new(1.1, 0.5, 0.5)));
        assert!(!bb.contains_point(DVec3::new(-0.1, 0.5, 0.5)));
    }

    #[test]
    fn bounding_box_merge() {
        let a = unit_box();
        let b = BoundingBox::from_corners(DVec3::splat(-1.0), DVec3::splat(0.5));
        let merged = a.merge(&b);
        assert_eq!(merged.min(), DVec3::splat(-1.0));
        assert_eq!(merged.max(), DVec3::ONE);
    }

    #[test]
    fn from_points_tracks_extremes() {
        let bb = BoundingBox::from_points([
            DVec3::new(1.0, -2.0, 0.0),
            DVec3::new(-1.0, 5.0, 3.0),
            DVec3::new(0.0, 0.0, -4.0),
        ]);
        assert_eq!(bb.min(), DVec3::new(-1.0, -2.0, -4.0));
        assert_eq!(bb.max(), DVec3::new(1.0, 5.0, 3.0));
        assert!(!BoundingBox::from_points(std::iter::empty()).is_valid());
    }

    #[test]
    fn touching_boxes_have_no_shared_volume() {
        let a = BoundingBox::from_corners(DVec3::ZERO, DVec3::ONE);
        let b = BoundingBox::from_corners(DVec3::new(1.0, 0.0, 0.0), DVec3::new(2.0, 1.0, 1.0));
        let c = BoundingBox::from_corners(DVec3::splat(0.5), DVec3::splat(1.5));
        assert_eq!(a.intersection_volume(&b), 0.0);
        assert!((a.intersection_volume(&c) - 0.125).abs() < 1e-12);
    }

    #[test]
    fn corners_follow_bit_layout() {
        let corners = unit_box().corners();
        assert_eq!(corners[0], DVec3::ZERO);
        assert_eq!(corners[1], DVec3::X);
        assert_eq!(corners[2], DVec3::Y);
        assert_eq!(corners[4], DVec3::Z);
        assert_eq!(corners[7], DVec3::ONE);
    }

    #[test]
    fn face_loops_are_planar() {
        let corners = unit_box().corners();
        for face in BoundingBox::FACE_LOOPS {
            let pts: Vec<DVec3> = face.iter().map(|&i| corners[i as usize]).collect();
            // All four corners share one coordinate.
            let shared = (0..3).any(|axis| pts.iter().all(|p| p[axis] == pts[0][axis]));
            assert!(shared, "face {face:?} is not axis aligned");
        }
    }
}
