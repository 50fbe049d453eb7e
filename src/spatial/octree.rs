use glam::DVec3;
use tracing::{debug, info};

use crate::config::OctreeConfig;
use crate::error::{Result, SegmentationError};
use crate::types::{BoundingBox, Mesh, PointCloud, RenderableMesh};

use super::wireframe::Wireframe;

/// Sign of each child's offset from the parent centre, x outermost.
const CHILD_DIRECTIONS: [DVec3; 8] = [
    DVec3::new(-1.0, -1.0, -1.0),
    DVec3::new(-1.0, -1.0, 1.0),
    DVec3::new(-1.0, 1.0, -1.0),
    DVec3::new(-1.0, 1.0, 1.0),
    DVec3::new(1.0, -1.0, -1.0),
    DVec3::new(1.0, -1.0, 1.0),
    DVec3::new(1.0, 1.0, -1.0),
    DVec3::new(1.0, 1.0, 1.0),
];

/// Index of an octant inside its [`Octree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OctantId(usize);

impl OctantId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One cuboid cell of the octree.
///
/// A node has either no children (a leaf at the maximum depth) or exactly
/// eight that tile its volume, sharing faces at its mid-planes.
#[derive(Debug, Clone)]
pub struct Octant {
    id: OctantId,
    center: DVec3,
    half_lengths: DVec3,
    level: u32,
    bounds: BoundingBox,
    parent: Option<OctantId>,
    children: Option<[OctantId; 8]>,
}

impl Octant {
    pub fn id(&self) -> OctantId {
        self.id
    }

    pub fn center(&self) -> DVec3 {
        self.center
    }

    pub fn half_lengths(&self) -> DVec3 {
        self.half_lengths
    }

    /// Full edge length along each axis.
    pub fn lengths(&self) -> DVec3 {
        self.half_lengths * 2.0
    }

    /// Depth of the node; the root is level 1.
    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    pub fn parent(&self) -> Option<OctantId> {
        self.parent
    }

    pub fn children(&self) -> Option<&[OctantId; 8]> {
        self.children.as_ref()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Outline of a leaf; interior nodes have none.
    pub fn wireframe(&self) -> Option<Wireframe> {
        self.is_leaf().then(|| Wireframe::from_bounds(&self.bounds))
    }
}

/// Fixed-depth octree, fully subdivided at construction.
///
/// Nodes live in one arena in depth-first order, so the root is always the
/// first entry and a parent precedes its children.
#[derive(Debug, Clone)]
pub struct Octree {
    nodes: Vec<Octant>,
    max_depth: u32,
}

impl Octree {
    /// Build a tree over an explicit bound.
    pub fn new(bounds: &BoundingBox, config: &OctreeConfig) -> Result<Self> {
        config.validate()?;
        if !bounds.is_valid() {
            return Err(SegmentationError::MalformedInput(
                "octree bounds have no extent on at least one axis".into(),
            ));
        }

        let mut tree = Octree {
            nodes: Vec::with_capacity(node_count_for_depth(config.max_depth)),
            max_depth: config.max_depth,
        };
        tree.build(bounds.min(), bounds.max(), None);

        info!(
            max_depth = tree.max_depth,
            nodes = tree.nodes.len(),
            leaves = tree.leaf_count(),
            "Built octree"
        );
        Ok(tree)
    }

    /// Build a tree over a renderable mesh's world-space bound.
    pub fn from_renderable(renderable: &RenderableMesh, config: &OctreeConfig) -> Result<Self> {
        Self::new(&renderable.bounds(), config)
    }

    /// Build a tree over the union of every mesh's transformed vertices.
    ///
    /// Each mesh's bound is computed on its own before merging, so the result
    /// does not depend on mesh order. Returns `None` when no mesh has vertices.
    pub fn from_meshes(meshes: &[Mesh], config: &OctreeConfig) -> Result<Option<Self>> {
        config.validate()?;

        let mut bounds = BoundingBox::empty();
        for mesh in meshes {
            if let Some(mesh_bounds) = mesh.world_bounds() {
                debug!(category = mesh.category(), ?mesh_bounds, "Mesh bounds");
                bounds = bounds.merge(&mesh_bounds);
            }
        }

        if !bounds.is_valid() {
            debug!(meshes = meshes.len(), "No vertices to bound, skipping octree");
            return Ok(None);
        }
        Self::new(&bounds, config).map(Some)
    }

    /// Build a tree over a point cloud's transformed points.
    pub fn from_point_cloud(cloud: &PointCloud, config: &OctreeConfig) -> Result<Option<Self>> {
        config.validate()?;
        cloud
            .world_bounds()
            .map(|bounds| Self::new(&bounds, config))
            .transpose()
    }

    fn build(&mut self, min: DVec3, max: DVec3, parent: Option<OctantId>) -> OctantId {
        let level = parent.map_or(1, |p| self.nodes[p.0].level + 1);
        let id = OctantId(self.nodes.len());
        let center = (min + max) * 0.5;
        let half_lengths = (max - min) * 0.5;

        self.nodes.push(Octant {
            id,
            center,
            half_lengths,
            level,
            bounds: BoundingBox::from_corners(min, max),
            parent,
            children: None,
        });

        if level < self.max_depth {
            // Faces are taken from the parent's min, center and max as-is so
            // siblings share planes exactly and their union is the parent.
            let children = CHILD_DIRECTIONS.map(|direction| {
                let positive = direction.cmpgt(DVec3::ZERO);
                let child_min = DVec3::select(positive, center, min);
                let child_max = DVec3::select(positive, max, center);
                self.build(child_min, child_max, Some(id))
            });
            self.nodes[id.0].children = Some(children);
        }
        id
    }

    pub fn root(&self) -> &Octant {
        &self.nodes[0]
    }

    pub fn octant(&self, id: OctantId) -> Option<&Octant> {
        self.nodes.get(id.0)
    }

    pub fn parent(&self, id: OctantId) -> Option<&Octant> {
        self.octant(id)?.parent.map(|p| &self.nodes[p.0])
    }

    /// Children of a node in subdivision order; empty for leaves.
    pub fn children(&self, id: OctantId) -> Vec<&Octant> {
        self.octant(id)
            .and_then(Octant::children)
            .map(|ids| ids.iter().map(|c| &self.nodes[c.0]).collect())
            .unwrap_or_default()
    }

    /// All nodes, root first, depth-first.
    pub fn octants(&self) -> &[Octant] {
        &self.nodes
    }

    /// Every leaf in tree order.
    pub fn leaves(&self) -> Vec<&Octant> {
        let mut leaves = Vec::with_capacity(self.leaf_count());
        self.collect_leaves(self.root(), &mut leaves);
        leaves
    }

    fn collect_leaves<'a>(&'a self, octant: &'a Octant, leaves: &mut Vec<&'a Octant>) {
        match &octant.children {
            None => leaves.push(octant),
            Some(children) => {
                for child in children {
                    self.collect_leaves(&self.nodes[child.0], leaves);
                }
            }
        }
    }

    /// `8^(max_depth - 1)`.
    pub fn leaf_count(&self) -> usize {
        8usize.pow(self.max_depth - 1)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The union bound; identical to the root's bound.
    pub fn bounds(&self) -> &BoundingBox {
        &self.root().bounds
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// The leaf containing `point`, or `None` outside the tree.
    ///
    /// Points on a shared face go to the first child in subdivision order.
    pub fn locate(&self, point: DVec3) -> Option<&Octant> {
        let mut node = self.root();
        if !node.bounds.contains_point(point) {
            return None;
        }
        while let Some(children) = &node.children {
            node = children
                .iter()
                .map(|c| &self.nodes[c.0])
                .find(|child| child.bounds.contains_point(point))?;
        }
        Some(node)
    }

    /// Outlines of every leaf merged into one wireframe.
    pub fn wireframe(&self) -> Wireframe {
        let mut wireframe = Wireframe::default();
        for leaf in self.leaves() {
            if let Some(outline) = leaf.wireframe() {
                wireframe.append(&outline);
            }
        }
        wireframe
    }
}

/// Total node count of a full octree: `(8^depth - 1) / 7`.
fn node_count_for_depth(depth: u32) -> usize {
    (8usize.pow(depth) - 1) / 7
}
