use std::fmt;
use std::ops::RangeInclusive;

/// Closed run of consecutive face indices `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FaceRange {
    pub start: u32,
    pub end: u32,
}

impl FaceRange {
    pub fn new(start: u32, end: u32) -> Self {
        debug_assert!(start <= end, "face range [{start}, {end}] is inverted");
        Self { start, end }
    }

    /// Number of faces covered (never zero).
    pub fn len(&self) -> usize {
        (self.end - self.start) as usize + 1
    }

    pub fn contains(&self, face: u32) -> bool {
        face >= self.start && face <= self.end
    }

    pub fn iter(&self) -> RangeInclusive<u32> {
        self.start..=self.end
    }
}

impl From<(u32, u32)> for FaceRange {
    fn from((start, end): (u32, u32)) -> Self {
        Self::new(start, end)
    }
}

impl fmt::Display for FaceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.start, self.end)
    }
}

/// Merge a strictly increasing list of face indices into maximal closed runs.
///
/// A new run starts wherever an index is not exactly one past its
/// predecessor. The input is not sorted first: unsorted or duplicated
/// indices produce ranges that do not describe the set.
pub fn compress_face_ids(face_ids: &[u32]) -> Vec<FaceRange> {
    let Some((&first, rest)) = face_ids.split_first() else {
        return Vec::new();
    };

    let mut ranges = Vec::new();
    let mut start = first;
    let mut previous = first;
    for &face in rest {
        if previous.checked_add(1) != Some(face) {
            ranges.push(FaceRange::new(start, previous));
            start = face;
        }
        previous = face;
    }
    ranges.push(FaceRange::new(start, previous));
    ranges
}
