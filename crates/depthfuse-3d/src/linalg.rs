/// Apply the rigid part of a homogeneous transform to a set of points.
///
/// Computes `dst = R * src + t` for every point, where `R` is the upper-left 3x3
/// block of `dst_from_src` and `t` the first three entries of its last column.
/// This is the first three rows of `M * [x, y, z, 1]^T`; the last row of the
/// matrix takes no part and nothing is divided by it.
///
/// # Arguments
///
/// * `src_points` - The points to transform.
/// * `dst_from_src` - A row-major 4x4 homogeneous transform.
/// * `dst_points` - A pre-allocated slice receiving the transformed points.
///
/// PRECONDITION: `dst_points` has the same length as `src_points`.
///
/// Example:
///
/// ```
/// use depthfuse_3d::linalg::transform_points;
///
/// let src_points = vec![[2.0, 2.0, 2.0], [3.0, 4.0, 5.0]];
/// let dst_from_src = [
///     [1.0, 0.0, 0.0, 1.0],
///     [0.0, 1.0, 0.0, 0.0],
///     [0.0, 0.0, 1.0, 0.0],
///     [0.0, 0.0, 0.0, 1.0],
/// ];
/// let mut dst_points = vec![[0.0; 3]; src_points.len()];
/// transform_points(&src_points, &dst_from_src, &mut dst_points);
/// assert_eq!(dst_points[0], [3.0, 2.0, 2.0]);
/// ```
pub fn transform_points(
    src_points: &[[f64; 3]],
    dst_from_src: &[[f64; 4]; 4],
    dst_points: &mut [[f64; 3]],
) {
    assert_eq!(src_points.len(), dst_points.len());

    if src_points.is_empty() {
        return;
    }

    let num_points = src_points.len();
    let rotation = faer::Mat::from_fn(3, 3, |i, j| dst_from_src[i][j]);

    // SAFETY: [f64; 3] has no padding, so the points are 3 * N contiguous f64 values
    let src_flat =
        unsafe { std::slice::from_raw_parts(src_points.as_ptr() as *const f64, num_points * 3) };
    // one point per row
    let points_in_src = faer::mat::from_row_major_slice(src_flat, num_points, 3);

    {
        // SAFETY: same layout as the source, and dst_points is borrowed exclusively
        let dst_flat = unsafe {
            std::slice::from_raw_parts_mut(dst_points.as_mut_ptr() as *mut f64, num_points * 3)
        };
        // one point per column
        let mut points_in_dst = faer::mat::from_column_major_slice_mut(dst_flat, 3, num_points);

        faer::linalg::matmul::matmul(
            &mut points_in_dst,
            rotation.as_ref(),
            points_in_src.transpose(),
            None,
            1.0,
            faer::Parallelism::None,
        );
    }

    let translation = [dst_from_src[0][3], dst_from_src[1][3], dst_from_src[2][3]];
    for point in dst_points.iter_mut() {
        for (x, t) in point.iter_mut().zip(translation) {
            *x += t;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const IDENTITY: [[f64; 4]; 4] = [
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ];

    #[test]
    fn test_transform_points_identity() {
        let src_points = vec![[2.0, 2.0, 2.0], [3.0, 4.0, 5.0]];
        let mut dst_points = vec![[0.0; 3]; src_points.len()];
        transform_points(&src_points, &IDENTITY, &mut dst_points);

        assert_eq!(dst_points, src_points);
    }

    #[test]
    fn test_transform_points_rotation_and_translation() {
        // 90 degrees around Z, then shift along X and Z
        let src_points = vec![[1.0, 0.0, 0.0], [0.0, 2.0, 3.0]];
        let dst_from_src = [
            [0.0, -1.0, 0.0, 1.0],
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.5],
            [0.0, 0.0, 0.0, 1.0],
        ];
        let mut dst_points = vec![[0.0; 3]; src_points.len()];
        transform_points(&src_points, &dst_from_src, &mut dst_points);

        let expected = [[1.0, 1.0, 0.5], [-1.0, 0.0, 3.5]];
        for (dst, exp) in dst_points.iter().zip(expected.iter()) {
            for k in 0..3 {
                assert_relative_eq!(dst[k], exp[k], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_transform_points_ignores_last_row() {
        let mut dst_from_src = IDENTITY;
        dst_from_src[3] = [7.0, 7.0, 7.0, 2.0];
        let mut dst_points = vec![[0.0; 3]];
        transform_points(&[[1.0, 2.0, 3.0]], &dst_from_src, &mut dst_points);
        assert_eq!(dst_points[0], [1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_transform_points_empty() {
        let mut dst_points: Vec<[f64; 3]> = vec![];
        transform_points(&[], &IDENTITY, &mut dst_points);
        assert!(dst_points.is_empty());
    }
}
