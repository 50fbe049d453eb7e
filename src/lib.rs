pub mod config;
pub mod error;
pub mod ingestion;
pub mod pipeline;
pub mod spatial;
pub mod style;
pub mod transform;
pub mod types;

pub use config::{OctreeConfig, PipelineConfig};
pub use error::{Result, SegmentationError};
pub use pipeline::{Pipeline, SegmentationSummary};
pub use spatial::{Octant, OctantId, Octree, Wireframe};
pub use style::{Color, FaceRange, Style, StyleSet, SurfaceProperty};
pub use transform::{MatrixLayout, Transform};
pub use types::{
    BoundingBox, MaterialStrategy, Mesh, PointCloud, RenderableMesh, RenderablePoints,
};
