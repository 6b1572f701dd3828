use approx::assert_relative_eq;
use ndarray::{Array3, Array4};
use ndarray_npy::NpzWriter;

use depthfuse_3d::camera::PinholeCameraIntrinsic;
use depthfuse_3d::fusion::{fuse_all, fuse_frames, FusionConfig};
use depthfuse_3d::io::archive::{read_rgbd_archive, DEPTHS_KEY, IMAGES_KEY, INTRINSIC_KEY, POSES_KEY};
use depthfuse_3d::io::ply::{read_ply_binary, write_ply_binary};
use depthfuse_3d::ops::unproject_depth;
use depthfuse_3d::rgbd::{RgbdImage, RgbdSequence};
use depthfuse_3d::transforms::Pose;
use depthfuse_3d::FusionError;

const IDENTITY: [[f64; 3]; 3] = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

fn no_downsampling() -> FusionConfig {
    FusionConfig {
        voxel_size: 0.0,
        frame_index: None,
    }
}

// frame 0 has two valid pixels, frame 1 sees a flat wall from a camera shifted by +1 in x
fn two_frame_sequence() -> Result<RgbdSequence, FusionError> {
    let intrinsic = PinholeCameraIntrinsic::new(2.0, 2.0, 0.5, 0.5);
    let rgb0 = vec![
        [255.0, 0.0, 0.0],
        [0.0, 255.0, 0.0],
        [0.0, 0.0, 255.0],
        [255.0, 255.0, 255.0],
    ];
    let rgb1 = vec![[0.25, 0.5, 0.75]; 4];
    let frame0 = RgbdImage::new(vec![1.0, 0.0, 2.0, f64::INFINITY], Some(rgb0), 2, 2)?;
    let frame1 = RgbdImage::new(vec![1.0; 4], Some(rgb1), 2, 2)?;
    let poses = vec![
        Pose::identity(),
        Pose::from_rotation_translation(&IDENTITY, &[1.0, 0.0, 0.0]),
    ];
    RgbdSequence::new(vec![frame0, frame1], intrinsic, poses)
}

#[test]
fn two_frames_without_downsampling() -> Result<(), FusionError> {
    let sequence = two_frame_sequence()?;
    let fused = fuse_all(&sequence, &no_downsampling())?;

    assert_eq!(fused.len(), 6);
    let colors = fused.colors().expect("fused cloud should be colored");
    assert_eq!(colors.len(), fused.len());

    // frame 0: pixels (0, 0) with depth 1 and (0, 1) with depth 2
    let points = fused.points();
    assert_relative_eq!(points[0][0], -0.25);
    assert_relative_eq!(points[0][1], -0.25);
    assert_relative_eq!(points[0][2], 1.0);
    assert_relative_eq!(points[1][0], -0.5);
    assert_relative_eq!(points[1][1], 0.5);
    assert_relative_eq!(points[1][2], 2.0);
    assert_eq!(colors[0], [1.0, 0.0, 0.0]);
    assert_eq!(colors[1], [0.0, 0.0, 1.0]);

    // frame 1: every camera-space point shifted by +1 in x, colors untouched
    let (frame1, _) = sequence.get(1).expect("frame 1");
    let (camera_points, _) = unproject_depth(frame1, sequence.intrinsic());
    for (world, camera) in points[2..].iter().zip(camera_points.iter()) {
        assert_relative_eq!(world[0], camera[0] + 1.0);
        assert_relative_eq!(world[1], camera[1]);
        assert_relative_eq!(world[2], camera[2]);
    }
    assert!(colors[2..].iter().all(|c| *c == [0.25, 0.5, 0.75]));

    Ok(())
}

#[test]
fn invalid_depths_never_reach_the_output() -> Result<(), FusionError> {
    let sequence = two_frame_sequence()?;
    let fused = fuse_all(&sequence, &no_downsampling())?;

    // pixel (1, 0) of frame 0 is green and has depth 0, pixel (1, 1) is white with infinite depth
    let colors = fused.colors().expect("fused cloud should be colored");
    assert!(!colors.contains(&[0.0, 1.0, 0.0]));
    assert!(!colors.contains(&[1.0, 1.0, 1.0]));
    assert!(fused.points().iter().all(|p| p[2].is_finite() && p[2] > 0.0));
    Ok(())
}

#[test]
fn single_frame_matches_its_segment() -> Result<(), FusionError> {
    let sequence = two_frame_sequence()?;

    for config in [no_downsampling(), FusionConfig::default()] {
        let fused = fuse_all(&sequence, &config)?;

        let frame0 = fuse_all(
            &sequence,
            &FusionConfig {
                frame_index: Some(0),
                ..config.clone()
            },
        )?;
        let frame1 = fuse_all(
            &sequence,
            &FusionConfig {
                frame_index: Some(1),
                ..config.clone()
            },
        )?;

        assert_eq!(frame0.len() + frame1.len(), fused.len());
        assert_eq!(frame0.points()[..], fused.points()[..frame0.len()]);
        assert_eq!(frame1.points()[..], fused.points()[frame0.len()..]);
        assert_eq!(
            frame1.colors().map(|c| c.as_slice()),
            fused.colors().map(|c| &c[frame0.len()..])
        );
    }
    Ok(())
}

#[test]
fn empty_frame_contributes_empty_segment() -> Result<(), FusionError> {
    let intrinsic = PinholeCameraIntrinsic::new(1.0, 1.0, 0.0, 0.0);
    let frames = vec![
        RgbdImage::new(vec![0.0; 4], None, 2, 2)?,
        RgbdImage::new(vec![1.0; 4], None, 2, 2)?,
    ];
    let sequence = RgbdSequence::new(frames, intrinsic, vec![Pose::identity(); 2])?;

    let mut visited = vec![];
    let fused = fuse_frames(&sequence, &no_downsampling(), |p| {
        visited.push((p.frame_index, p.total_frames))
    })?;

    assert_eq!(visited, vec![(0, 2), (1, 2)]);
    assert_eq!(fused.len(), 4);
    assert!(fused.colors().is_none());

    let only_empty = FusionConfig {
        frame_index: Some(0),
        ..no_downsampling()
    };
    assert_eq!(fuse_all(&sequence, &only_empty), Err(FusionError::EmptyResult));
    Ok(())
}

#[test]
fn archive_to_ply() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let archive_path = dir.path().join("scene.npz");

    let mut images = Array4::<u8>::zeros((2, 2, 2, 3));
    images.fill(255);
    let mut depths = Array3::<f32>::ones((2, 2, 2));
    depths[[0, 0, 1]] = 0.0;
    depths[[0, 1, 1]] = f32::INFINITY;
    let intrinsic = ndarray::arr2(&[[2.0, 0.0, 0.5], [0.0, 2.0, 0.5], [0.0, 0.0, 1.0]]);
    let mut poses = Array3::<f64>::zeros((2, 4, 4));
    for i in 0..2 {
        for j in 0..4 {
            poses[[i, j, j]] = 1.0;
        }
    }
    poses[[1, 0, 3]] = 1.0;

    let mut npz = NpzWriter::new(std::fs::File::create(&archive_path)?);
    npz.add_array(IMAGES_KEY, &images)?;
    npz.add_array(DEPTHS_KEY, &depths)?;
    npz.add_array(INTRINSIC_KEY, &intrinsic)?;
    npz.add_array(POSES_KEY, &poses)?;
    npz.finish()?;

    let sequence = read_rgbd_archive(&archive_path)?;
    let fused = fuse_all(&sequence, &no_downsampling())?;
    assert_eq!(fused.len(), 6);
    assert!(fused
        .colors()
        .map(|c| c.iter().all(|c| *c == [1.0, 1.0, 1.0]))
        .unwrap_or(false));

    let ply_path = dir.path().join("out").join("scene.ply");
    std::fs::create_dir_all(ply_path.parent().ok_or("no parent")?)?;
    write_ply_binary(&ply_path, &fused)?;

    let read_back = read_ply_binary(&ply_path)?;
    assert_eq!(read_back.points(), fused.points());
    assert_eq!(read_back.colors(), fused.colors());

    Ok(())
}
