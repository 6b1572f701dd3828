use crate::camera::PinholeCameraIntrinsic;
use crate::error::FusionError;
use crate::transforms::Pose;

/// A struct representing an RGB-D image.
///
/// Pixels are stored row-major: pixel `(u, v)` lives at index `v * width + u`.
#[derive(Debug, Clone)]
pub struct RgbdImage {
    width: usize,
    height: usize,
    depth: Vec<f64>,
    rgb: Option<Vec<[f64; 3]>>,
}

impl RgbdImage {
    /// Creates a new RgbdImage with the given depth and optional color arrays.
    ///
    /// # Errors
    ///
    /// Returns [`FusionError::ShapeMismatch`] if the buffers do not hold `width * height` pixels.
    pub fn new(
        depth: Vec<f64>,
        rgb: Option<Vec<[f64; 3]>>,
        width: usize,
        height: usize,
    ) -> Result<Self, FusionError> {
        let num_pixels = width.checked_mul(height).ok_or_else(|| {
            FusionError::ShapeMismatch(format!("{}x{} pixels overflow", height, width))
        })?;
        if depth.len() != num_pixels {
            return Err(FusionError::ShapeMismatch(format!(
                "depth has {} values, expected {}x{}",
                depth.len(),
                height,
                width
            )));
        }
        if let Some(rgb) = &rgb {
            if rgb.len() != num_pixels {
                return Err(FusionError::ShapeMismatch(format!(
                    "rgb has {} pixels, expected {}x{}",
                    rgb.len(),
                    height,
                    width
                )));
            }
        }
        Ok(Self {
            width,
            height,
            depth,
            rgb,
        })
    }

    /// Returns the dimensions of the image (height, width)
    pub fn dimensions(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    /// The width of the image.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// The height of the image.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// The depth along the camera Z axis. 0 or +inf marks a missing measurement.
    pub fn depth(&self) -> &[f64] {
        &self.depth
    }

    /// Optional color channels aligned with the depth, either in [0, 255] or [0, 1].
    pub fn rgb(&self) -> Option<&[[f64; 3]]> {
        self.rgb.as_deref()
    }
}

/// A sequence of RGB-D frames sharing one camera, with a camera-to-world pose per frame.
#[derive(Debug, Clone)]
pub struct RgbdSequence {
    frames: Vec<RgbdImage>,
    intrinsic: PinholeCameraIntrinsic,
    poses: Vec<Pose>,
}

impl RgbdSequence {
    /// Creates a validated sequence.
    ///
    /// # Errors
    ///
    /// Returns [`FusionError::ShapeMismatch`] if the number of frames and poses differ,
    /// if the frames do not share the same resolution, or if only some frames carry colors.
    pub fn new(
        frames: Vec<RgbdImage>,
        intrinsic: PinholeCameraIntrinsic,
        poses: Vec<Pose>,
    ) -> Result<Self, FusionError> {
        if frames.len() != poses.len() {
            return Err(FusionError::ShapeMismatch(format!(
                "{} frames but {} poses",
                frames.len(),
                poses.len()
            )));
        }

        if let Some(first) = frames.first() {
            let dims = first.dimensions();
            let colored = first.rgb.is_some();
            for (i, frame) in frames.iter().enumerate().skip(1) {
                if frame.dimensions() != dims {
                    return Err(FusionError::ShapeMismatch(format!(
                        "frame {} is {:?}, expected {:?}",
                        i,
                        frame.dimensions(),
                        dims
                    )));
                }
                if frame.rgb.is_some() != colored {
                    return Err(FusionError::ShapeMismatch(format!(
                        "frame {} color presence differs from frame 0",
                        i
                    )));
                }
            }
        }

        Ok(Self {
            frames,
            intrinsic,
            poses,
        })
    }

    /// Number of frames in the sequence.
    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Check if the sequence has no frames.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// The shared camera intrinsics.
    pub fn intrinsic(&self) -> &PinholeCameraIntrinsic {
        &self.intrinsic
    }

    /// The frames of the sequence.
    pub fn frames(&self) -> &[RgbdImage] {
        &self.frames
    }

    /// Returns the frame and its pose at `index`.
    pub fn get(&self, index: usize) -> Option<(&RgbdImage, &Pose)> {
        Some((self.frames.get(index)?, self.poses.get(index)?))
    }
}
