use crate::linalg;

/// Compute the rotation matrix from an axis and angle.
///
/// # Arguments
///
/// * `axis` - The axis of rotation.
/// * `angle` - The angle of rotation.
///
/// # Returns
///
/// The rotation matrix.
///
/// Example:
///
/// ```no_run
/// use depthfuse_3d::transforms::axis_angle_to_rotation_matrix;
///
/// let axis = [1.0, 0.0, 0.0];
/// let angle = std::f64::consts::PI / 2.0;
/// let rotation = axis_angle_to_rotation_matrix(&axis, angle).unwrap();
/// assert_eq!(rotation, [[1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]]);
/// ```
pub fn axis_angle_to_rotation_matrix(
    axis: &[f64; 3],
    angle: f64,
) -> Result<[[f64; 3]; 3], &'static str> {
    let magnitude = (axis[0].powi(2) + axis[1].powi(2) + axis[2].powi(2)).sqrt();
    if magnitude < 1e-10 {
        return Err("cannot compute rotation matrix from a zero vector");
    }
    let [x, y, z] = [axis[0] / magnitude, axis[1] / magnitude, axis[2] / magnitude];

    let (s, c) = angle.sin_cos();
    let t = 1.0 - c;

    Ok([
        [c + x * x * t, x * y * t - z * s, x * z * t + y * s],
        [x * y * t + z * s, c + y * y * t, y * z * t - x * s],
        [x * z * t - y * s, y * z * t + x * s, c + z * z * t],
    ])
}

/// A 4x4 homogeneous camera-to-world transform.
///
/// The matrix is row-major and premultiplies homogeneous column vectors:
/// `p_world = M * [x, y, z, 1]^T`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    matrix: [[f64; 4]; 4],
}

impl Pose {
    /// Creates a pose from a row-major 4x4 matrix.
    pub fn from_matrix(matrix: [[f64; 4]; 4]) -> Self {
        Self { matrix }
    }

    /// The identity pose.
    pub fn identity() -> Self {
        Self::from_rotation_translation(
            &[[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            &[0.0, 0.0, 0.0],
        )
    }

    /// Creates a pose from a rotation matrix and a translation vector.
    pub fn from_rotation_translation(rotation: &[[f64; 3]; 3], translation: &[f64; 3]) -> Self {
        let mut matrix = [[0.0; 4]; 4];
        for i in 0..3 {
            matrix[i][..3].copy_from_slice(&rotation[i]);
            matrix[i][3] = translation[i];
        }
        matrix[3][3] = 1.0;
        Self { matrix }
    }

    /// Creates a pose from an axis-angle rotation and a translation vector.
    pub fn from_axis_angle(
        axis: &[f64; 3],
        angle: f64,
        translation: &[f64; 3],
    ) -> Result<Self, &'static str> {
        let rotation = axis_angle_to_rotation_matrix(axis, angle)?;
        Ok(Self::from_rotation_translation(&rotation, translation))
    }

    /// The underlying row-major 4x4 matrix.
    pub fn matrix(&self) -> &[[f64; 4]; 4] {
        &self.matrix
    }

    /// Maps camera-space points into the world frame.
    ///
    /// Only the first three rows of the matrix take part, the homogeneous
    /// coordinate of the result is dropped without division.
    pub fn transform_points(&self, points: &[[f64; 3]]) -> Vec<[f64; 3]> {
        let mut dst_points = vec![[0.0; 3]; points.len()];
        linalg::transform_points(points, &self.matrix, &mut dst_points);
        dst_points
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}
