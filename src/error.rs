use std::io;

/// All error types for the scan-segmenter core and its loaders.
#[derive(thiserror::Error, Debug)]
pub enum SegmentationError {
    #[error("Malformed input: {0}")]
    MalformedInput(String),
    #[error("Unknown style: {0}")]
    UnknownStyle(String),
    #[error("No style assigned to mesh '{0}'")]
    NoStyleAssigned(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Input error: {0}")]
    Input(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SegmentationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_strings() {
        let e = SegmentationError::MalformedInput("length 7 is not a multiple of 3".into());
        assert_eq!(e.to_string(), "Malformed input: length 7 is not a multiple of 3");

        let e = SegmentationError::UnknownStyle("diffuse 1, 0, 0".into());
        assert_eq!(e.to_string(), "Unknown style: diffuse 1, 0, 0");

        let e = SegmentationError::NoStyleAssigned("IfcWall".into());
        assert_eq!(e.to_string(), "No style assigned to mesh 'IfcWall'");

        let e = SegmentationError::InvalidConfig("max depth 0".into());
        assert_eq!(e.to_string(), "Invalid configuration: max depth 0");

        let e = SegmentationError::Input("bad file".into());
        assert_eq!(e.to_string(), "Input error: bad file");
    }

    #[test]
    fn from_io_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file missing");
        let e: SegmentationError = io_err.into();
        assert!(matches!(e, SegmentationError::Io(_)));
        assert!(e.to_string().contains("file missing"));
    }
}
