use crate::camera::PinholeCameraIntrinsic;
use crate::color;
use crate::error::FusionError;
use crate::ops;
use crate::pointcloud::PointCloud;
use crate::rgbd::{RgbdImage, RgbdSequence};
use crate::transforms::Pose;
use crate::voxel_grid::VoxelGrid;

/// Default voxel edge length used to downsample each frame.
pub const DEFAULT_VOXEL_SIZE: f64 = 0.01;

/// Parameters of a fusion run.
#[derive(Debug, Clone, PartialEq)]
pub struct FusionConfig {
    /// Edge length of the voxels used to downsample each frame. 0 disables downsampling.
    pub voxel_size: f64,
    /// Process only this frame instead of the whole sequence.
    pub frame_index: Option<usize>,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            voxel_size: DEFAULT_VOXEL_SIZE,
            frame_index: None,
        }
    }
}

/// Progress report emitted before each frame is processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameProgress {
    /// Index of the frame in the sequence.
    pub frame_index: usize,
    /// Number of frames in the sequence.
    pub total_frames: usize,
}

/// Create a world-space point cloud from a single RGB-D frame.
///
/// Back-projects every valid depth pixel, maps it to the world frame with the
/// camera-to-world `pose` and, if the frame has colors, attaches the color of the
/// same pixel normalized to [0, 1].
///
/// # Arguments
///
/// * `image` - The RGB-D frame.
/// * `intrinsic` - The pinhole camera intrinsics.
/// * `pose` - The camera-to-world transform of the frame.
///
/// Example:
///
/// ```
/// use depthfuse_3d::camera::PinholeCameraIntrinsic;
/// use depthfuse_3d::fusion::create_point_cloud;
/// use depthfuse_3d::rgbd::RgbdImage;
/// use depthfuse_3d::transforms::Pose;
///
/// let image = RgbdImage::new(vec![2.0], Some(vec![[255.0, 0.0, 0.0]]), 1, 1).unwrap();
/// let intrinsic = PinholeCameraIntrinsic::new(1.0, 1.0, 0.0, 0.0);
/// let pose = Pose::from_rotation_translation(
///     &[[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
///     &[0.0, 0.0, 1.0],
/// );
/// let cloud = create_point_cloud(&image, &intrinsic, &pose);
/// assert_eq!(cloud.points()[0], [0.0, 0.0, 3.0]);
/// assert_eq!(cloud.colors().unwrap()[0], [1.0, 0.0, 0.0]);
/// ```
pub fn create_point_cloud(
    image: &RgbdImage,
    intrinsic: &PinholeCameraIntrinsic,
    pose: &Pose,
) -> PointCloud {
    let (points_in_camera, indices) = ops::unproject_depth(image, intrinsic);
    let points_in_world = pose.transform_points(&points_in_camera);

    let colors = image.rgb().map(|rgb| {
        let mut colors = color::sample_colors(rgb, &indices);
        color::normalize_colors(&mut colors);
        colors
    });

    // one color per retained pixel by construction
    PointCloud::new(points_in_world, colors).unwrap_or_default()
}

/// Fuse the frames of a sequence into a single world-space point cloud.
///
/// Frames are processed in index order. Each frame is converted with
/// [`create_point_cloud`], downsampled on its own when `config.voxel_size > 0`,
/// and appended to the result, so the output is ordered by frame and then by
/// position inside the frame. `progress` is called once per selected frame,
/// before the frame is processed.
///
/// # Errors
///
/// * [`FusionError::InvalidVoxelSize`] if the voxel size is negative or not finite.
/// * [`FusionError::InvalidFrameIndex`] if `config.frame_index` is out of range.
/// * [`FusionError::EmptyInput`] if the sequence has no frames.
/// * [`FusionError::EmptyResult`] if no frame produced a valid point.
pub fn fuse_frames<F>(
    sequence: &RgbdSequence,
    config: &FusionConfig,
    mut progress: F,
) -> Result<PointCloud, FusionError>
where
    F: FnMut(FrameProgress),
{
    let voxel_grid = match config.voxel_size {
        size if size == 0.0 => None,
        size => Some(VoxelGrid::cubic(size)?),
    };

    let total_frames = sequence.len();
    let frame_indices = match config.frame_index {
        Some(index) if index >= total_frames => {
            return Err(FusionError::InvalidFrameIndex {
                index,
                num_frames: total_frames,
            })
        }
        Some(index) => index..index + 1,
        None => 0..total_frames,
    };

    if frame_indices.is_empty() {
        return Err(FusionError::EmptyInput);
    }

    let mut fused = PointCloud::default();

    for frame_index in frame_indices {
        let (image, pose) = sequence
            .get(frame_index)
            .ok_or(FusionError::InvalidFrameIndex {
                index: frame_index,
                num_frames: total_frames,
            })?;

        progress(FrameProgress {
            frame_index,
            total_frames,
        });

        let mut cloud = create_point_cloud(image, sequence.intrinsic(), pose);
        if let Some(voxel_grid) = &voxel_grid {
            cloud = voxel_grid.downsample(&cloud);
        }

        let num_points = cloud.len();
        if num_points == 0 {
            log::warn!("Frame {} has no valid depth", frame_index);
        } else {
            log::debug!("Frame {} contributes {} points", frame_index, num_points);
        }

        fused.extend(cloud)?;
    }

    if fused.is_empty() {
        return Err(FusionError::EmptyResult);
    }

    Ok(fused)
}

/// Fuse the frames of a sequence without progress reporting.
pub fn fuse_all(sequence: &RgbdSequence, config: &FusionConfig) -> Result<PointCloud, FusionError> {
    fuse_frames(sequence, config, |_| {})
}
