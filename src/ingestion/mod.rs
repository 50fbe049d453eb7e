pub mod gltf_loader;
pub mod obj_loader;
pub mod ply_loader;

use std::path::Path;

use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::error::{Result, SegmentationError};
use crate::types::{Mesh, PointCloud};

/// Result of the ingestion stage.
#[derive(Debug)]
pub struct IngestionResult {
    pub meshes: Vec<Mesh>,
    pub point_cloud: Option<PointCloud>,
    pub stats: IngestionStats,
}

/// Statistics about the ingested data.
#[derive(Debug)]
pub struct IngestionStats {
    pub total_vertices: usize,
    pub total_triangles: usize,
    pub total_meshes: usize,
    pub styled_meshes: usize,
    pub total_points: usize,
    pub has_point_colors: bool,
    pub input_format: String,
}

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Obj,
    Gltf,
    Glb,
    Ply,
}

impl InputFormat {
    /// Detect format from file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "obj" => Ok(InputFormat::Obj),
            "gltf" => Ok(InputFormat::Gltf),
            "glb" => Ok(InputFormat::Glb),
            "ply" => Ok(InputFormat::Ply),
            _ => Err(SegmentationError::Input(format!(
                "Unsupported file format: .{ext}"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InputFormat::Obj => "OBJ",
            InputFormat::Gltf => "glTF",
            InputFormat::Glb => "GLB",
            InputFormat::Ply => "PLY",
        }
    }
}

impl std::fmt::Display for InputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn require_file(path: &Path, what: &str) -> Result<()> {
    if !path.exists() {
        return Err(SegmentationError::Input(format!(
            "{what} not found: {}",
            path.display()
        )));
    }
    Ok(())
}

/// Load the reference model as meshes.
pub fn load_reference(path: &Path) -> Result<(Vec<Mesh>, InputFormat)> {
    require_file(path, "Reference model")?;

    let format = InputFormat::from_path(path)?;
    info!(format = %format, path = %path.display(), "Detected reference format");

    let meshes = match format {
        InputFormat::Obj => obj_loader::load_obj(path)?,
        InputFormat::Gltf | InputFormat::Glb => gltf_loader::load_gltf(path)?,
        InputFormat::Ply => {
            let category = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("ply");
            vec![ply_loader::load_ply(path)?.into_mesh(category)?]
        }
    };
    Ok((meshes, format))
}

/// Load the scan as a point cloud; only PLY is accepted.
pub fn load_point_cloud(path: &Path) -> Result<PointCloud> {
    require_file(path, "Point cloud")?;

    let format = InputFormat::from_path(path)?;
    if format != InputFormat::Ply {
        return Err(SegmentationError::Input(format!(
            "Point clouds must be PLY, got {format}"
        )));
    }
    ply_loader::load_ply(path)?.into_point_cloud()
}

/// Run the full ingestion stage.
pub fn ingest(config: &PipelineConfig) -> Result<IngestionResult> {
    // 1. Reference model
    let (meshes, format) = load_reference(&config.reference)?;

    // 2. Optional scan, placed in the reference frame
    let point_cloud = match &config.point_cloud {
        Some(path) => {
            let mut cloud = load_point_cloud(path)?;
            cloud.set_transform_matrix(config.point_cloud_transform);
            info!(points = cloud.len(), colors = cloud.has_colors(), "Loaded point cloud");
            Some(cloud)
        }
        None => None,
    };

    // 3. Stats
    let stats = compute_stats(&meshes, point_cloud.as_ref(), format);
    debug!(
        vertices = stats.total_vertices,
        triangles = stats.total_triangles,
        meshes = stats.total_meshes,
        points = stats.total_points,
        "Ingestion stats"
    );

    Ok(IngestionResult {
        meshes,
        point_cloud,
        stats,
    })
}

/// Compute summary statistics from the ingested meshes and scan.
pub fn compute_stats(
    meshes: &[Mesh],
    point_cloud: Option<&PointCloud>,
    format: InputFormat,
) -> IngestionStats {
    IngestionStats {
        total_vertices: meshes.iter().map(Mesh::vertex_count).sum(),
        total_triangles: meshes.iter().map(Mesh::triangle_count).sum(),
        total_meshes: meshes.len(),
        styled_meshes: meshes
            .iter()
            .filter(|m| m.styles().is_some_and(|s| !s.is_empty()))
            .count(),
        total_points: point_cloud.map_or(0, PointCloud::len),
        has_point_colors: point_cloud.is_some_and(PointCloud::has_colors),
        input_format: format.to_string(),
    }
}
