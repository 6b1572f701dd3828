/// Select the colors of the given pixels.
///
/// # Arguments
///
/// * `rgb` - The color image, row-major.
/// * `indices` - Linear pixel indices, as returned by [`crate::ops::unproject_depth`].
///
/// PRECONDITION: every index is in bounds of `rgb`.
pub fn sample_colors(rgb: &[[f64; 3]], indices: &[usize]) -> Vec<[f64; 3]> {
    indices.iter().map(|&idx| rgb[idx]).collect()
}

/// Bring colors into the [0, 1] range.
///
/// If any channel of any color exceeds 1.0 the whole array is assumed to be in
/// [0, 255] and every channel is divided by 255. Otherwise the colors are left
/// unchanged. The decision is taken once for the whole array.
///
/// Example:
///
/// ```
/// use depthfuse_3d::color::normalize_colors;
///
/// let mut colors = vec![[255.0, 0.0, 51.0], [0.5, 0.5, 0.5]];
/// normalize_colors(&mut colors);
/// assert_eq!(colors[0], [1.0, 0.0, 0.2]);
/// ```
pub fn normalize_colors(colors: &mut [[f64; 3]]) {
    let max_value = colors
        .iter()
        .flat_map(|c| c.iter())
        .fold(f64::NEG_INFINITY, |acc, &v| acc.max(v));

    if max_value > 1.0 {
        for c in colors.iter_mut() {
            c[0] /= 255.0;
            c[1] /= 255.0;
            c[2] /= 255.0;
        }
    }
}
