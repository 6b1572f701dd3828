use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};

use ndarray::{ArrayD, Axis, Ix2, Ix3, Ix4};
use ndarray_npy::NpzReader;

use crate::camera::PinholeCameraIntrinsic;
use crate::error::FusionError;
use crate::rgbd::{RgbdImage, RgbdSequence};
use crate::transforms::Pose;

/// Name of the color images array, shape `N x H x W x 3`.
pub const IMAGES_KEY: &str = "images";
/// Name of the depth maps array, shape `N x H x W`.
pub const DEPTHS_KEY: &str = "depths";
/// Name of the camera matrix array, shape `3 x 3`.
pub const INTRINSIC_KEY: &str = "intrinsic";
/// Name of the camera-to-world poses array, shape `N x 4 x 4`.
pub const POSES_KEY: &str = "cam_c2w";

/// Error types for the archive module.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ArchiveError {
    /// The archive does not exist.
    #[error("Archive does not exist: {0}")]
    FileDoesNotExist(PathBuf),

    /// Failed to open the archive.
    #[error("Failed to read the archive. {0}")]
    Io(#[from] std::io::Error),

    /// The archive is not a valid npz file.
    #[error("Failed to read the npz archive. {0}")]
    Npz(#[from] ndarray_npy::ReadNpzError),

    /// A required array is missing from the archive.
    #[error("Missing array in archive: {0}")]
    MissingArray(String),

    /// An array could not be decoded as a numeric array.
    #[error("Array {0} has an unsupported dtype or is corrupted")]
    UnsupportedDtype(String),

    /// An array does not have the expected shape.
    #[error("Array {name} has shape {got:?}, expected {expected}")]
    InvalidShape {
        /// Name of the array.
        name: String,
        /// Description of the expected shape.
        expected: String,
        /// The actual shape.
        got: Vec<usize>,
    },

    /// The arrays are inconsistent with each other.
    #[error(transparent)]
    Sequence(#[from] FusionError),
}

// read an array of any supported numeric dtype, widened to f64
fn read_array_f64<R: Read + Seek>(
    npz: &mut NpzReader<R>,
    names: &[String],
    key: &str,
) -> Result<ArrayD<f64>, ArchiveError> {
    let entry = names
        .iter()
        .find(|name| name.strip_suffix(".npy").unwrap_or(name) == key)
        .ok_or_else(|| ArchiveError::MissingArray(key.to_string()))?;

    let mut candidates = vec![entry.clone()];
    for alt in [key.to_string(), format!("{key}.npy")] {
        if !candidates.contains(&alt) {
            candidates.push(alt);
        }
    }

    macro_rules! try_read {
        ($name:expr, $ty:ty) => {
            let res: Result<ArrayD<$ty>, _> = npz.by_name($name);
            if let Ok(array) = res {
                return Ok(array.mapv(|v| v as f64));
            }
        };
    }

    for name in candidates.iter() {
        let res: Result<ArrayD<f64>, _> = npz.by_name(name);
        if let Ok(array) = res {
            return Ok(array);
        }
        try_read!(name, f32);
        try_read!(name, u8);
        try_read!(name, u16);
        try_read!(name, i32);
        try_read!(name, i64);
    }

    Err(ArchiveError::UnsupportedDtype(key.to_string()))
}

fn invalid_shape(name: &str, expected: &str, array: &ArrayD<f64>) -> ArchiveError {
    ArchiveError::InvalidShape {
        name: name.to_string(),
        expected: expected.to_string(),
        got: array.shape().to_vec(),
    }
}

/// Read an RGB-D sequence from a NumPy `.npz` archive.
///
/// The archive must contain the arrays [`IMAGES_KEY`] (`N x H x W x 3`),
/// [`DEPTHS_KEY`] (`N x H x W`), [`INTRINSIC_KEY`] (`3 x 3`) and [`POSES_KEY`]
/// (`N x 4 x 4`). Integer and float arrays are accepted and converted to `f64`.
///
/// # Errors
///
/// Fails if the archive cannot be opened, an array is missing or malformed, or
/// the arrays disagree on the number of frames or the image resolution.
pub fn read_rgbd_archive(path: impl AsRef<Path>) -> Result<RgbdSequence, ArchiveError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ArchiveError::FileDoesNotExist(path.to_path_buf()));
    }

    let file = std::fs::File::open(path)?;
    let mut npz = NpzReader::new(BufReader::new(file))?;
    let names = npz.names()?;

    let images = read_array_f64(&mut npz, &names, IMAGES_KEY)?;
    let depths = read_array_f64(&mut npz, &names, DEPTHS_KEY)?;
    let intrinsic = read_array_f64(&mut npz, &names, INTRINSIC_KEY)?;
    let poses = read_array_f64(&mut npz, &names, POSES_KEY)?;

    if images.ndim() != 4 || images.shape()[3] != 3 {
        return Err(invalid_shape(IMAGES_KEY, "N x H x W x 3", &images));
    }
    if depths.ndim() != 3 {
        return Err(invalid_shape(DEPTHS_KEY, "N x H x W", &depths));
    }
    if intrinsic.shape() != [3, 3] {
        return Err(invalid_shape(INTRINSIC_KEY, "3 x 3", &intrinsic));
    }
    if poses.ndim() != 3 || poses.shape()[1..] != [4, 4] {
        return Err(invalid_shape(POSES_KEY, "N x 4 x 4", &poses));
    }

    let images = images
        .into_dimensionality::<Ix4>()
        .map_err(|_| ArchiveError::UnsupportedDtype(IMAGES_KEY.to_string()))?;
    let depths = depths
        .into_dimensionality::<Ix3>()
        .map_err(|_| ArchiveError::UnsupportedDtype(DEPTHS_KEY.to_string()))?;
    let intrinsic = intrinsic
        .into_dimensionality::<Ix2>()
        .map_err(|_| ArchiveError::UnsupportedDtype(INTRINSIC_KEY.to_string()))?;
    let poses = poses
        .into_dimensionality::<Ix3>()
        .map_err(|_| ArchiveError::UnsupportedDtype(POSES_KEY.to_string()))?;

    let (num_images, height, width) = (images.shape()[0], images.shape()[1], images.shape()[2]);
    let (num_depths, depth_height, depth_width) =
        (depths.shape()[0], depths.shape()[1], depths.shape()[2]);

    if num_images != num_depths || num_images != poses.shape()[0] {
        return Err(FusionError::ShapeMismatch(format!(
            "frame counts differ: {} images, {} depths, {} poses",
            num_images,
            num_depths,
            poses.shape()[0]
        ))
        .into());
    }
    if (height, width) != (depth_height, depth_width) {
        return Err(FusionError::ShapeMismatch(format!(
            "images are {}x{} but depths are {}x{}",
            height, width, depth_height, depth_width
        ))
        .into());
    }

    let mut k = [[0.0; 3]; 3];
    for (i, row) in k.iter_mut().enumerate() {
        for (j, val) in row.iter_mut().enumerate() {
            *val = intrinsic[[i, j]];
        }
    }
    let intrinsic = PinholeCameraIntrinsic::from_matrix(&k);

    let mut frames = Vec::with_capacity(num_images);
    for (image, depth) in images.axis_iter(Axis(0)).zip(depths.axis_iter(Axis(0))) {
        let rgb = image
            .iter()
            .copied()
            .collect::<Vec<_>>()
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2]])
            .collect();
        let depth = depth.iter().copied().collect();
        frames.push(RgbdImage::new(depth, Some(rgb), width, height)?);
    }

    let poses = poses
        .axis_iter(Axis(0))
        .map(|m| {
            let mut matrix = [[0.0; 4]; 4];
            for (i, row) in matrix.iter_mut().enumerate() {
                for (j, val) in row.iter_mut().enumerate() {
                    *val = m[[i, j]];
                }
            }
            Pose::from_matrix(matrix)
        })
        .collect();

    log::debug!(
        "Loaded {} frames of {}x{} from {}",
        num_images,
        height,
        width,
        path.display()
    );

    Ok(RgbdSequence::new(frames, intrinsic, poses)?)
}
