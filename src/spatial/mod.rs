pub mod octree;
pub mod wireframe;

pub use octree::{Octant, OctantId, Octree};
pub use wireframe::{FACE_LOOP_LEN, Wireframe};
