use std::path::PathBuf;

use clap::Parser;

use crate::error::{Result, SegmentationError};
use crate::transform::{MatrixLayout, Transform, parse_transform};

/// Octree depth used when none is given; 1 + 8 + 64 nodes.
pub const DEFAULT_MAX_DEPTH: u32 = 3;
/// Deepest tree we agree to materialise (2,396,745 nodes).
pub const MAX_SUPPORTED_DEPTH: u32 = 8;

/// Octree construction parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OctreeConfig {
    /// Number of levels including the root; leaves sit at this level.
    pub max_depth: u32,
}

impl OctreeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 || self.max_depth > MAX_SUPPORTED_DEPTH {
            return Err(SegmentationError::InvalidConfig(format!(
                "octree max depth must be within 1..={MAX_SUPPORTED_DEPTH}, got {}",
                self.max_depth
            )));
        }
        Ok(())
    }
}

impl Default for OctreeConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Fully resolved pipeline configuration (constructed from CLI args).
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub reference: PathBuf,
    pub point_cloud: Option<PathBuf>,
    /// Point cloud to reference model transform.
    pub point_cloud_transform: Transform,
    pub octree: OctreeConfig,
    pub json: bool,
    pub verbose: bool,
    pub threads: Option<usize>,
}

/// CLI argument definition (clap derive).
#[derive(Parser, Debug)]
#[command(
    name = "scan-segmenter",
    about = "Prepare a reference model and a laser scan for segmentation",
    version
)]
pub struct CliArgs {
    /// Reference model (OBJ, glTF, GLB)
    pub reference: PathBuf,

    /// Point cloud to segment (PLY)
    pub pointcloud: Option<PathBuf>,

    /// Point cloud to reference model transform: 16 comma separated numbers
    #[arg(short = 't', long, allow_hyphen_values = true)]
    pub transform: Option<String>,

    /// Order of the --transform values
    #[arg(long, value_enum, default_value = "col")]
    pub layout: MatrixLayout,

    /// Octree depth, root included
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: u32,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Worker thread count (default: all cores)
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,
}

impl TryFrom<CliArgs> for PipelineConfig {
    type Error = SegmentationError;

    fn try_from(args: CliArgs) -> Result<Self> {
        let point_cloud_transform = match args.transform.as_deref() {
            Some(text) => parse_transform(text, args.layout)?,
            None => Transform::identity(),
        };

        let octree = OctreeConfig {
            max_depth: args.max_depth,
        };
        octree.validate()?;

        Ok(PipelineConfig {
            reference: args.reference,
            point_cloud: args.pointcloud,
            point_cloud_transform,
            octree,
            json: args.json,
            verbose: args.verbose,
            threads: args.threads,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    #[test]
    fn default_octree_config() {
        let oc = OctreeConfig::default();
        assert_eq!(oc.max_depth, 3);
        assert!(oc.validate().is_ok());
    }

    #[test]
    fn octree_depth_limits() {
        assert!(OctreeConfig { max_depth: 0 }.validate().is_err());
        assert!(OctreeConfig { max_depth: 1 }.validate().is_ok());
        assert!(OctreeConfig { max_depth: MAX_SUPPORTED_DEPTH }.validate().is_ok());
        assert!(OctreeConfig { max_depth: MAX_SUPPORTED_DEPTH + 1 }.validate().is_err());
    }

    #[test]
    fn cli_args_to_pipeline_config() {
        let args = CliArgs::parse_from([
            "scan-segmenter",
            "building.obj",
            "scan.ply",
            "-t",
            "1,0,0,0,0,1,0,0,0,0,1,0,-5,2.5,10,1",
            "--max-depth",
            "4",
            "--json",
            "-v",
            "-j",
            "8",
        ]);

        let config = PipelineConfig::try_from(args).unwrap();

        assert_eq!(config.reference, PathBuf::from("building.obj"));
        assert_eq!(config.point_cloud, Some(PathBuf::from("scan.ply")));
        assert_eq!(
            config.point_cloud_transform.apply(DVec3::ZERO),
            DVec3::new(-5.0, 2.5, 10.0)
        );
        assert_eq!(config.octree.max_depth, 4);
        assert!(config.json);
        assert!(config.verbose);
        assert_eq!(config.threads, Some(8));
    }

    #[test]
    fn cli_args_row_major_layout() {
        let args = CliArgs::parse_from([
            "scan-segmenter",
            "model.glb",
            "--transform",
            "1 0 0 7 0 1 0 8 0 0 1 9 0 0 0 1",
            "--layout",
            "row",
        ]);
        let config = PipelineConfig::try_from(args).unwrap();
        assert_eq!(
            config.point_cloud_transform.apply(DVec3::ZERO),
            DVec3::new(7.0, 8.0, 9.0)
        );
    }

    #[test]
    fn cli_args_minimal() {
        let args = CliArgs::parse_from(["scan-segmenter", "model.gltf"]);
        let config = PipelineConfig::try_from(args).unwrap();

        assert_eq!(config.reference, PathBuf::from("model.gltf"));
        assert_eq!(config.point_cloud, None);
        assert!(config.point_cloud_transform.is_identity());
        assert_eq!(config.octree, OctreeConfig::default());
        assert!(!config.json);
        assert!(!config.verbose);
        assert_eq!(config.threads, None);
    }

    #[test]
    fn cli_args_bad_transform() {
        let args = CliArgs::parse_from(["scan-segmenter", "model.obj", "-t", "1,2,3"]);
        let err = PipelineConfig::try_from(args).unwrap_err();
        assert!(matches!(err, SegmentationError::MalformedInput(_)));
    }

    #[test]
    fn cli_args_bad_depth() {
        let args = CliArgs::parse_from(["scan-segmenter", "model.obj", "--max-depth", "0"]);
        let err = PipelineConfig::try_from(args).unwrap_err();
        assert!(matches!(err, SegmentationError::InvalidConfig(_)));
    }
}
