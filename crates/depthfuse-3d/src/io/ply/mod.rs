mod parser;
mod properties;
mod writer;

pub use parser::*;
pub use properties::*;
pub use writer::*;

/// Error types for the PLY module.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PlyError {
    /// Failed to read or write the PLY file
    #[error("Failed to read or write PLY file")]
    Io(#[from] std::io::Error),

    /// Unsupported PLY property
    #[error("Unsupported PLY property")]
    UnsupportedProperty,

    /// Malformed PLY header
    #[error("Malformed PLY header")]
    MalformedHeader,

    /// Invalid PLY file extension
    #[error("Invalid PLY file extension. Got: {0}")]
    InvalidFileExtension(std::path::PathBuf),

    /// The decoded vertices do not form a valid point cloud
    #[error("Invalid point cloud. {0}")]
    PointCloud(#[from] crate::error::FusionError),
}
