use argh::FromArgs;
use std::path::PathBuf;

use depthfuse_3d::fusion::{fuse_frames, FusionConfig, DEFAULT_VOXEL_SIZE};
use depthfuse_3d::io::{archive, ply};
use depthfuse_3d::FusionError;

fn default_downsample() -> f64 {
    DEFAULT_VOXEL_SIZE
}

#[derive(FromArgs)]
/// Reconstruct a colored point cloud from an RGB-D sequence stored in an npz archive
struct Args {
    /// path to the npz file with images, depths, intrinsic and cam_c2w
    #[argh(option)]
    npz_path: PathBuf,

    /// path to save the point cloud (.ply)
    #[argh(option)]
    output_path: PathBuf,

    /// downsample voxel size (0 to disable)
    #[argh(option, default = "default_downsample()")]
    downsample: f64,

    /// process only a specific frame (for debugging)
    #[argh(option)]
    frame_idx: Option<usize>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    if args.downsample < 0.0 {
        return Err(FusionError::InvalidVoxelSize(args.downsample).into());
    }

    // fail before any frame is processed
    ply::check_ply_extension(&args.output_path)?;

    // load the frames
    let sequence = archive::read_rgbd_archive(&args.npz_path)?;
    log::info!(
        "Loaded #{} frames from {}",
        sequence.len(),
        args.npz_path.display()
    );
    if let Some(frame) = sequence.frames().first() {
        log::debug!("Frame resolution (h, w): {:?}", frame.dimensions());
    }
    log::debug!("Camera matrix: {:?}", sequence.intrinsic().camera_matrix());

    // create the output directory
    if let Some(output_dir) = args.output_path.parent() {
        std::fs::create_dir_all(output_dir)?;
    }

    let config = FusionConfig {
        voxel_size: args.downsample,
        frame_index: args.frame_idx,
    };

    let pointcloud = fuse_frames(&sequence, &config, |progress| {
        log::info!(
            "Processing frame {}/{}",
            progress.frame_index + 1,
            progress.total_frames
        );
    })?;

    ply::write_ply_binary(&args.output_path, &pointcloud)?;

    if let Some((min_bound, max_bound)) = pointcloud.bounds() {
        log::info!("Point cloud bounds: {:?} -> {:?}", min_bound, max_bound);
    }
    log::info!(
        "Point cloud with #{} points saved to {}",
        pointcloud.len(),
        args.output_path.display()
    );

    Ok(())
}
