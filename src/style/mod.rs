pub mod ranges;
pub mod style_set;

use std::fmt;
use std::hash::{Hash, Hasher};

pub use ranges::{FaceRange, compress_face_ids};
pub use style_set::{StyleRanges, StyleSet};

/// Linear RGB color with channels in [0, 1].
///
/// Equality and hashing compare bit patterns so colors can key a map;
/// `-0.0` is folded into `0.0` first.
#[derive(Debug, Clone, Copy)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build from 8-bit channels (0-255).
    pub fn from_u8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    fn bits(&self) -> [u32; 3] {
        // Adding 0.0 turns -0.0 into +0.0.
        [
            (self.r + 0.0).to_bits(),
            (self.g + 0.0).to_bits(),
            (self.b + 0.0).to_bits(),
        ]
    }
}

impl PartialEq for Color {
    fn eq(&self, other: &Self) -> bool {
        self.bits() == other.bits()
    }
}

impl Eq for Color {}

impl Hash for Color {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bits().hash(state);
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.r, self.g, self.b)
    }
}

/// A surface material: diffuse and specular color plus opacity.
///
/// Two styles with identical fields are the same style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Style {
    diffuse: Color,
    specular: Color,
    alpha_bits: u32,
}

impl Style {
    /// Ambient intensity applied to every rendered style.
    pub const AMBIENT_INTENSITY: f32 = 0.15;
    /// Diffuse intensity applied to every rendered style.
    pub const DIFFUSE_INTENSITY: f32 = 0.85;
    pub const AMBIENT_COLOR: Color = Color::new(0.75, 0.75, 0.75);

    /// Create a style; `alpha` is clamped to [0, 1].
    pub fn new(diffuse: Color, specular: Color, alpha: f32) -> Self {
        let alpha = if alpha.is_nan() { 1.0 } else { alpha.clamp(0.0, 1.0) };
        Self {
            diffuse,
            specular,
            alpha_bits: (alpha + 0.0).to_bits(),
        }
    }

    /// Opaque style with a black specular term.
    pub fn opaque(diffuse: Color) -> Self {
        Self::new(diffuse, Color::BLACK, 1.0)
    }

    pub fn diffuse(&self) -> Color {
        self.diffuse
    }

    pub fn specular(&self) -> Color {
        self.specular
    }

    pub fn alpha(&self) -> f32 {
        f32::from_bits(self.alpha_bits)
    }

    /// The renderer-facing property for this style.
    pub fn surface_property(&self) -> SurfaceProperty {
        SurfaceProperty {
            diffuse_color: self.diffuse,
            specular_color: self.specular,
            opacity: self.alpha(),
            ambient: Self::AMBIENT_INTENSITY,
            diffuse: Self::DIFFUSE_INTENSITY,
            ambient_color: Self::AMBIENT_COLOR,
        }
    }
}

impl Default for Style {
    /// Neutral light grey, used when a source supplies no material.
    fn default() -> Self {
        Self::opaque(Color::new(0.8, 0.8, 0.8))
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Diffuse = {},\n\tSpecular = {},\n\tAlpha = {}",
            self.diffuse,
            self.specular,
            self.alpha()
        )
    }
}

/// Shading parameters handed to the renderer for a whole mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceProperty {
    pub diffuse_color: Color,
    pub specular_color: Color,
    pub opacity: f32,
    pub ambient: f32,
    pub diffuse: f32,
    pub ambient_color: Color,
}
