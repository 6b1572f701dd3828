#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Pinhole camera intrinsics.
pub mod camera;

/// Color sampling and normalization for point clouds.
pub mod color;

/// Error types for the fusion pipeline.
pub mod error;

/// Multi-frame fusion of RGB-D sequences into a single point cloud.
pub mod fusion;

/// I/O utilities for reading and writing 3D data.
pub mod io;

/// Linear algebra utilities.
pub mod linalg;

/// Operations on depth maps.
pub mod ops;

/// Point cloud container.
pub mod pointcloud;

/// RGB-D images and sequences.
pub mod rgbd;

/// 3D transforms algorithms.
pub mod transforms;

/// Voxel grid downsampling.
pub mod voxel_grid;

pub use error::FusionError;
