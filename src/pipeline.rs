use std::collections::HashMap;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::ingestion::{self, IngestionStats};
use crate::spatial::{OctantId, Octree, Wireframe};
use crate::types::{
    BoundingBox, MaterialStrategy, Mesh, RenderableMesh, RenderablePoints, STYLE_SLOT_ATTRIBUTE,
    UNASSIGNED_STYLE_SLOT,
};

/// One reference mesh ready for a renderer.
#[derive(Debug, Clone)]
pub struct PreparedMesh {
    pub renderable: RenderableMesh,
    /// `None` when the mesh carries no styles.
    pub material: Option<MaterialStrategy>,
}

/// Everything a renderer needs to show the reference model, the scan and
/// the octree partition together.
#[derive(Debug)]
pub struct PreparedScene {
    pub meshes: Vec<PreparedMesh>,
    /// Meshes dropped for having no vertices or no triangles.
    pub skipped_meshes: usize,
    pub octree: Option<Octree>,
    pub wireframe: Option<Wireframe>,
    pub points: Option<RenderablePoints>,
    pub stats: IngestionStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct MeshSummary {
    pub category: String,
    pub vertices: usize,
    pub triangles: usize,
    pub styles: usize,
    /// `single`, `palette` or `none`.
    pub material: &'static str,
    /// Per-triangle array the renderer colors by, when the palette is in use.
    pub slot_attribute: Option<&'static str>,
    pub unassigned_faces: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct OctreeSummary {
    pub max_depth: u32,
    pub nodes: usize,
    pub leaves: usize,
    pub min: [f64; 3],
    pub max: [f64; 3],
}

#[derive(Debug, Clone, Serialize)]
pub struct PointCloudSummary {
    pub points: usize,
    pub colored: bool,
    pub min: [f64; 3],
    pub max: [f64; 3],
    /// Points that fall inside the octree's root bound.
    pub inside_octree: usize,
    /// Leaves holding at least one point.
    pub occupied_leaves: usize,
}

/// Summary of a completed pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct SegmentationSummary {
    pub reference: String,
    pub format: String,
    pub meshes: Vec<MeshSummary>,
    pub skipped_meshes: usize,
    pub total_vertices: usize,
    pub total_triangles: usize,
    pub octree: Option<OctreeSummary>,
    pub point_cloud: Option<PointCloudSummary>,
    #[serde(skip)]
    pub duration: Duration,
}

/// Pipeline orchestrator: ingest, build renderables, partition space.
pub struct Pipeline;

impl Pipeline {
    /// Run the pipeline and summarise what was prepared.
    pub fn run(config: &PipelineConfig) -> Result<SegmentationSummary> {
        let start = Instant::now();
        let scene = Self::prepare(config)?;
        let mut summary = summarize(config, &scene);
        summary.duration = start.elapsed();

        info!(
            meshes = summary.meshes.len(),
            leaves = summary.octree.as_ref().map_or(0, |o| o.leaves),
            elapsed = ?summary.duration,
            "Pipeline complete"
        );
        Ok(summary)
    }

    /// Load inputs and assemble everything a renderer would draw.
    pub fn prepare(config: &PipelineConfig) -> Result<PreparedScene> {
        info!(reference = %config.reference.display(), "Starting pipeline");

        info!("Stage 1/3: Ingestion");
        let ingestion = ingestion::ingest(config)?;

        info!("Stage 2/3: Renderables");
        let prepared: Vec<Option<PreparedMesh>> =
            ingestion.meshes.par_iter().map(prepare_mesh).collect();
        let skipped_meshes = prepared.iter().filter(|p| p.is_none()).count();
        let meshes: Vec<PreparedMesh> = prepared.into_iter().flatten().collect();

        let points = ingestion
            .point_cloud
            .as_ref()
            .and_then(|cloud| cloud.build_renderable());

        info!("Stage 3/3: Octree");
        let octree = Octree::from_meshes(&ingestion.meshes, &config.octree)?;
        if octree.is_none() {
            warn!("Reference model has no vertices, no octree built");
        }
        let wireframe = octree.as_ref().map(Octree::wireframe);

        Ok(PreparedScene {
            meshes,
            skipped_meshes,
            octree,
            wireframe,
            points,
            stats: ingestion.stats,
        })
    }
}

fn prepare_mesh(mesh: &Mesh) -> Option<PreparedMesh> {
    let renderable = mesh.build_renderable()?;
    let material = match mesh.material_strategy() {
        Ok(strategy) => Some(strategy),
        Err(e) => {
            debug!(category = mesh.category(), "{e}");
            None
        }
    };
    Some(PreparedMesh {
        renderable,
        material,
    })
}

/// Leaf occupancy of `points` in `octree`: (points inside, occupied leaves).
pub fn leaf_occupancy(octree: &Octree, points: &RenderablePoints) -> (usize, usize) {
    let hits: Vec<OctantId> = points
        .positions
        .par_iter()
        .filter_map(|p| octree.locate(*p).map(|leaf| leaf.id()))
        .collect();

    let mut counts: HashMap<OctantId, usize> = HashMap::new();
    for id in &hits {
        *counts.entry(*id).or_default() += 1;
    }
    (hits.len(), counts.len())
}

fn summarize(config: &PipelineConfig, scene: &PreparedScene) -> SegmentationSummary {
    let meshes: Vec<MeshSummary> = scene.meshes.iter().map(summarize_mesh).collect();

    let octree = scene.octree.as_ref().map(|tree| {
        let bounds = tree.bounds();
        OctreeSummary {
            max_depth: tree.max_depth(),
            nodes: tree.node_count(),
            leaves: tree.leaf_count(),
            min: bounds.min().to_array(),
            max: bounds.max().to_array(),
        }
    });

    let point_cloud = scene.points.as_ref().map(|points| {
        let bounds: BoundingBox = points.bounds();
        let (inside_octree, occupied_leaves) = scene
            .octree
            .as_ref()
            .map_or((0, 0), |tree| leaf_occupancy(tree, points));
        PointCloudSummary {
            points: points.point_count(),
            colored: points.colors.is_some(),
            min: bounds.min().to_array(),
            max: bounds.max().to_array(),
            inside_octree,
            occupied_leaves,
        }
    });

    SegmentationSummary {
        reference: config.reference.display().to_string(),
        format: scene.stats.input_format.clone(),
        total_vertices: meshes.iter().map(|m| m.vertices).sum(),
        total_triangles: meshes.iter().map(|m| m.triangles).sum(),
        meshes,
        skipped_meshes: scene.skipped_meshes,
        octree,
        point_cloud,
        duration: Duration::ZERO,
    }
}

fn summarize_mesh(mesh: &PreparedMesh) -> MeshSummary {
    let renderable = &mesh.renderable;
    let (material, styles) = match &mesh.material {
        Some(MaterialStrategy::Single(_)) => ("single", 1),
        Some(MaterialStrategy::Palette { palette, .. }) => ("palette", palette.len()),
        None => ("none", 0),
    };
    let slot_attribute = mesh
        .material
        .as_ref()
        .filter(|m| m.uses_style_slots())
        .map(|_| STYLE_SLOT_ATTRIBUTE);
    let unassigned_faces = renderable.style_slots.as_ref().map_or(0, |slots| {
        slots.iter().filter(|&&s| s == UNASSIGNED_STYLE_SLOT).count()
    });

    MeshSummary {
        category: renderable.category.clone(),
        vertices: renderable.vertex_count(),
        triangles: renderable.triangle_count(),
        styles,
        material,
        slot_attribute,
        unassigned_faces,
    }
}

/// Print a human-readable run summary.
pub fn print_summary(summary: &SegmentationSummary) {
    println!("=== Reference Model ===");
    println!("  File:      {}", summary.reference);
    println!("  Format:    {}", summary.format);
    println!("  Meshes:    {}", summary.meshes.len());
    if summary.skipped_meshes > 0 {
        println!("  Skipped:   {} (empty)", summary.skipped_meshes);
    }
    println!("  Vertices:  {}", summary.total_vertices);
    println!("  Triangles: {}", summary.total_triangles);
    for mesh in &summary.meshes {
        print!(
            "    {:<24} {:>8} tris  {:>3} style(s)  {}",
            mesh.category, mesh.triangles, mesh.styles, mesh.material
        );
        match mesh.slot_attribute {
            Some(attribute) => println!(" by '{attribute}'"),
            None => println!(),
        }
    }

    println!();
    println!("=== Octree ===");
    match &summary.octree {
        Some(tree) => {
            println!("  Depth:     {}", tree.max_depth);
            println!("  Nodes:     {}", tree.nodes);
            println!("  Leaves:    {}", tree.leaves);
            println!(
                "  Bounds:    ({:.3}, {:.3}, {:.3}) → ({:.3}, {:.3}, {:.3})",
                tree.min[0], tree.min[1], tree.min[2], tree.max[0], tree.max[1], tree.max[2]
            );
        }
        None => println!("  Not built (no vertices)."),
    }

    if let Some(cloud) = &summary.point_cloud {
        println!();
        println!("=== Point Cloud ===");
        println!("  Points:    {}", cloud.points);
        println!("  Colors:    {}", if cloud.colored { "yes" } else { "no" });
        println!(
            "  Bounds:    ({:.3}, {:.3}, {:.3}) → ({:.3}, {:.3}, {:.3})",
            cloud.min[0], cloud.min[1], cloud.min[2], cloud.max[0], cloud.max[1], cloud.max[2]
        );
        println!("  In octree: {}", cloud.inside_octree);
        println!("  Occupied leaves: {}", cloud.occupied_leaves);
    }
}
