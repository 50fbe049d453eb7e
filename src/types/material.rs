use crate::style::{Color, StyleSet, SurfaceProperty};

/// One palette color, indexed by a triangle's style slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaletteEntry {
    pub color: Color,
    pub opacity: f32,
}

/// How a renderer should color a mesh.
#[derive(Debug, Clone, PartialEq)]
pub enum MaterialStrategy {
    /// One style covers the mesh; the slot array can be ignored.
    Single(SurfaceProperty),
    /// Several styles: color each triangle from `palette[slot]`.
    ///
    /// `property` comes from the first style with its opacity forced to 1 so
    /// only the palette alpha shows. Its specular and ambient terms apply to
    /// the whole mesh.
    Palette {
        palette: Vec<PaletteEntry>,
        property: SurfaceProperty,
    },
}

impl MaterialStrategy {
    /// Pick a strategy for a style set; `None` if it holds no style.
    pub fn from_styles(styles: &StyleSet) -> Option<Self> {
        let ordered = styles.styles_in_order();
        let first = ordered.first()?;
        let mut property = first.surface_property();

        if ordered.len() == 1 {
            return Some(MaterialStrategy::Single(property));
        }

        let palette = ordered
            .iter()
            .map(|style| PaletteEntry {
                color: style.diffuse(),
                opacity: style.alpha(),
            })
            .collect();
        property.opacity = 1.0;

        Some(MaterialStrategy::Palette { palette, property })
    }

    pub fn property(&self) -> &SurfaceProperty {
        match self {
            MaterialStrategy::Single(property) => property,
            MaterialStrategy::Palette { property, .. } => property,
        }
    }

    pub fn palette(&self) -> Option<&[PaletteEntry]> {
        match self {
            MaterialStrategy::Single(_) => None,
            MaterialStrategy::Palette { palette, .. } => Some(palette),
        }
    }

    /// Whether the per-triangle slot array should drive coloring.
    pub fn uses_style_slots(&self) -> bool {
        matches!(self, MaterialStrategy::Palette { .. })
    }
}
