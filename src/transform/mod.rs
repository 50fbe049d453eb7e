use std::fmt;

use glam::{DMat4, DVec3};

use crate::error::{Result, SegmentationError};

/// Order in which 16 flat matrix values are listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum MatrixLayout {
    /// `m[0..4]` is the first row.
    #[value(name = "row")]
    RowMajor,
    /// `m[0..4]` is the first column (the layout the scan registration tools emit).
    #[default]
    #[value(name = "col")]
    ColumnMajor,
}

impl fmt::Display for MatrixLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatrixLayout::RowMajor => write!(f, "row-major"),
            MatrixLayout::ColumnMajor => write!(f, "column-major"),
        }
    }
}

/// A 4×4 local-to-world transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform(DMat4);

impl Transform {
    pub fn identity() -> Self {
        Self(DMat4::IDENTITY)
    }

    pub fn from_matrix(matrix: DMat4) -> Self {
        Self(matrix)
    }

    pub fn from_translation(t: DVec3) -> Self {
        Self(DMat4::from_translation(t))
    }

    /// Build a transform from exactly 16 values in the given layout.
    pub fn from_values(values: &[f64], layout: MatrixLayout) -> Result<Self> {
        let array: [f64; 16] = values.try_into().map_err(|_| {
            SegmentationError::MalformedInput(format!(
                "a 4x4 transform needs 16 values, got {}",
                values.len()
            ))
        })?;

        let matrix = match layout {
            MatrixLayout::ColumnMajor => DMat4::from_cols_array(&array),
            MatrixLayout::RowMajor => DMat4::from_cols_array(&array).transpose(),
        };
        Ok(Self(matrix))
    }

    pub fn matrix(&self) -> &DMat4 {
        &self.0
    }

    /// Map a local-space point to world space: `(M * (x, y, z, 1)).xyz`.
    ///
    /// The homogeneous `w` is dropped without a perspective divide.
    pub fn apply(&self, p: DVec3) -> DVec3 {
        (self.0 * p.extend(1.0)).truncate()
    }

    pub fn is_identity(&self) -> bool {
        self.0 == DMat4::IDENTITY
    }

    pub fn to_cols_array(&self) -> [f64; 16] {
        self.0.to_cols_array()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..4 {
            let r = self.0.row(row);
            writeln!(f, "\t[{:.4}, {:.4}, {:.4}, {:.4}]", r.x, r.y, r.z, r.w)?;
        }
        Ok(())
    }
}

/// Parse 16 numbers separated by commas and/or whitespace into a transform.
pub fn parse_transform(text: &str, layout: MatrixLayout) -> Result<Transform> {
    let values = text
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<f64>().map_err(|e| {
                SegmentationError::MalformedInput(format!("transform value '{s}': {e}"))
            })
        })
        .collect::<Result<Vec<f64>>>()?;

    Transform::from_values(&values, layout)
}
