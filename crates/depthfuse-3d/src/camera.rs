/// A struct representing the intrinsic parameters of a pinhole camera.
///
/// Only the focal lengths and the principal point are used for back-projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinholeCameraIntrinsic {
    /// Focal length along the image columns, in pixels.
    pub fx: f64,
    /// Focal length along the image rows, in pixels.
    pub fy: f64,
    /// Principal point column, in pixels.
    pub cx: f64,
    /// Principal point row, in pixels.
    pub cy: f64,
}

impl PinholeCameraIntrinsic {
    /// Creates a new PinholeCameraIntrinsic with the given parameters.
    pub fn new(fx: f64, fy: f64, cx: f64, cy: f64) -> Self {
        Self { fx, fy, cx, cy }
    }

    /// Creates the intrinsics from a 3x3 camera matrix.
    ///
    /// Reads `fx = K[0][0]`, `fy = K[1][1]`, `cx = K[0][2]` and `cy = K[1][2]`,
    /// the remaining entries are ignored.
    ///
    /// Example:
    ///
    /// ```
    /// use depthfuse_3d::camera::PinholeCameraIntrinsic;
    ///
    /// let k = [[500.0, 0.0, 320.0], [0.0, 510.0, 240.0], [0.0, 0.0, 1.0]];
    /// let intrinsic = PinholeCameraIntrinsic::from_matrix(&k);
    /// assert_eq!(intrinsic.fy, 510.0);
    /// ```
    pub fn from_matrix(k: &[[f64; 3]; 3]) -> Self {
        Self {
            fx: k[0][0],
            fy: k[1][1],
            cx: k[0][2],
            cy: k[1][2],
        }
    }

    /// Returns the camera matrix as a 3x3 array.
    pub fn camera_matrix(&self) -> [[f64; 3]; 3] {
        [
            [self.fx, 0.0, self.cx],
            [0.0, self.fy, self.cy],
            [0.0, 0.0, 1.0],
        ]
    }
}
