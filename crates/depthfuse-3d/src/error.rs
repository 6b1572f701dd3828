/// Error types for the fusion pipeline.
#[derive(Debug, thiserror::Error, PartialEq)]
#[non_exhaustive]
pub enum FusionError {
    /// Arrays with inconsistent frame counts or image dimensions.
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// The selected frame range is empty.
    #[error("No frames to process")]
    EmptyInput,

    /// The requested frame index is out of range.
    #[error("Invalid frame index {index}, the sequence has {num_frames} frames")]
    InvalidFrameIndex {
        /// The requested frame index.
        index: usize,
        /// The number of frames in the sequence.
        num_frames: usize,
    },

    /// All the processed frames yielded zero valid points.
    #[error("No valid points were produced by the selected frames")]
    EmptyResult,

    /// The voxel size must be positive.
    #[error("Invalid voxel size: {0}")]
    InvalidVoxelSize(f64),
}
