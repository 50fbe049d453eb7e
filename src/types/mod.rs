pub mod bounds;
pub mod material;
pub mod mesh;
pub mod point_cloud;
pub mod renderable;

pub use bounds::{BoundingBox, Extent};
pub use material::{MaterialStrategy, PaletteEntry};
pub use mesh::{Mesh, Triangle};
pub use point_cloud::PointCloud;
pub use renderable::{RenderableMesh, RenderablePoints, STYLE_SLOT_ATTRIBUTE, UNASSIGNED_STYLE_SLOT};
