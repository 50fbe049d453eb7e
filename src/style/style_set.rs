use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use tracing::debug;

use super::ranges::{FaceRange, compress_face_ids};
use super::Style;
use crate::error::{Result, SegmentationError};

/// A style together with the compressed face ranges that use it.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleRanges {
    pub style: Style,
    pub ranges: Vec<FaceRange>,
}

/// Per-face style assignments for one mesh.
///
/// Faces are recorded one at a time with [`StyleSet::assign`]; the first
/// read compresses each style's faces into [`FaceRange`]s. Styles keep the
/// order in which they were first seen, which is also their slot in a
/// palette.
///
/// For any one style, faces must be assigned in strictly increasing order.
#[derive(Debug, Default)]
pub struct StyleSet {
    order: Vec<Style>,
    slots: HashMap<Style, usize>,
    assignments: Vec<Vec<u32>>,
    compressed: OnceLock<Vec<StyleRanges>>,
}

impl StyleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a slot for `style` without assigning any face to it.
    ///
    /// Returns the slot. Registering a known style is a no-op.
    pub fn register(&mut self, style: Style) -> usize {
        if let Some(&slot) = self.slots.get(&style) {
            return slot;
        }
        let slot = self.order.len();
        self.order.push(style);
        self.slots.insert(style, slot);
        self.assignments.push(Vec::new());
        self.compressed.take();
        slot
    }

    /// Record that face `face` uses `style`.
    pub fn assign(&mut self, style: Style, face: u32) {
        let slot = self.register(style);
        self.assignments[slot].push(face);
        self.compressed.take();
    }

    /// Compress the recorded faces into ranges, once.
    ///
    /// Later calls return the same result until another assignment is made.
    pub fn finalize(&self) -> &[StyleRanges] {
        self.compressed.get_or_init(|| {
            let compressed: Vec<StyleRanges> = self
                .order
                .iter()
                .zip(&self.assignments)
                .map(|(style, faces)| StyleRanges {
                    style: *style,
                    ranges: compress_face_ids(faces),
                })
                .collect();

            debug!(
                styles = compressed.len(),
                faces = self.face_count(),
                ranges = compressed.iter().map(|s| s.ranges.len()).sum::<usize>(),
                "Compressed style assignments"
            );
            compressed
        })
    }

    /// Distinct styles in first-assignment order.
    pub fn styles_in_order(&self) -> &[Style] {
        &self.order
    }

    /// Compressed face ranges for `style`.
    pub fn ranges_for(&self, style: &Style) -> Result<&[FaceRange]> {
        let slot = self
            .slot_of(style)
            .ok_or_else(|| SegmentationError::UnknownStyle(format!("diffuse {}", style.diffuse())))?;
        Ok(&self.finalize()[slot].ranges)
    }

    /// Palette slot of `style`, if it has been seen.
    pub fn slot_of(&self, style: &Style) -> Option<usize> {
        self.slots.get(style).copied()
    }

    /// Number of distinct styles.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Total number of face assignments across all styles.
    pub fn face_count(&self) -> usize {
        self.assignments.iter().map(Vec::len).sum()
    }
}

impl Clone for StyleSet {
    fn clone(&self) -> Self {
        let compressed = OnceLock::new();
        if let Some(done) = self.compressed.get() {
            let _ = compressed.set(done.clone());
        }
        Self {
            order: self.order.clone(),
            slots: self.slots.clone(),
            assignments: self.assignments.clone(),
            compressed,
        }
    }
}

impl fmt::Display for StyleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        for entry in self.finalize() {
            writeln!(f, "\t{}", entry.style)?;
            for range in &entry.ranges {
                writeln!(f, "\tAssigned to faces: {range}")?;
            }
        }
        Ok(())
    }
}
