use crate::camera::PinholeCameraIntrinsic;
use crate::rgbd::RgbdImage;

/// Check whether a depth value is a valid measurement.
///
/// A depth is valid iff `0 < depth < +inf`. Zero, negative, infinite and NaN
/// values are treated as missing.
#[inline]
pub fn is_valid_depth(depth: f64) -> bool {
    depth > 0.0 && depth < f64::INFINITY
}

/// Back-project the valid pixels of a depth map into camera space.
///
/// Every pixel `(u, v)` with a valid depth `d` produces the point
/// `((u - cx) * d / fx, (v - cy) * d / fy, d)`, where `u` runs along the image
/// columns and `v` along the rows.
///
/// # Arguments
///
/// * `image` - The RGB-D image holding the depth map.
/// * `intrinsic` - The pinhole camera intrinsics.
///
/// # Returns
///
/// The camera-space points in row-major pixel order, together with the linear
/// index `v * width + u` of the pixel each point came from. The indices are the
/// validity mask to use when sampling colors.
///
/// Example:
///
/// ```
/// use depthfuse_3d::camera::PinholeCameraIntrinsic;
/// use depthfuse_3d::ops::unproject_depth;
/// use depthfuse_3d::rgbd::RgbdImage;
///
/// let image = RgbdImage::new(vec![1.0, 0.0, 2.0, f64::INFINITY], None, 2, 2).unwrap();
/// let intrinsic = PinholeCameraIntrinsic::new(1.0, 1.0, 0.0, 0.0);
/// let (points, indices) = unproject_depth(&image, &intrinsic);
/// assert_eq!(points, vec![[0.0, 0.0, 1.0], [0.0, 2.0, 2.0]]);
/// assert_eq!(indices, vec![0, 2]);
/// ```
pub fn unproject_depth(
    image: &RgbdImage,
    intrinsic: &PinholeCameraIntrinsic,
) -> (Vec<[f64; 3]>, Vec<usize>) {
    let depth = image.depth();
    let width = image.width();

    let mut points = Vec::with_capacity(depth.len());
    let mut indices = Vec::with_capacity(depth.len());

    let (fx, fy, cx, cy) = (intrinsic.fx, intrinsic.fy, intrinsic.cx, intrinsic.cy);

    // a zero width implies an empty depth map, so the loop body never divides by it
    for (idx, &z) in depth.iter().enumerate() {
        if !is_valid_depth(z) {
            continue;
        }
        let u = (idx % width) as f64;
        let v = (idx / width) as f64;
        points.push([(u - cx) * z / fx, (v - cy) * z / fy, z]);
        indices.push(idx);
    }

    (points, indices)
}
