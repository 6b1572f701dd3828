use std::collections::HashMap;

use crate::error::FusionError;
use crate::pointcloud::PointCloud;

/// Accumulated data of a single voxel: position sum, color sum and point count.
type VoxelData = ([f64; 3], [f64; 3], usize);

/// A 3D voxel grid for downsampling point clouds.
///
/// Each occupied voxel is replaced by the centroid of the points falling in it,
/// and by the mean of their colors. The voxel with index `(i, j, k)` covers
/// `[i * lx, (i + 1) * lx) x [j * ly, (j + 1) * ly) x [k * lz, (k + 1) * lz)`.
/// Voxels are emitted in the order their first point appears in the input.
#[derive(Debug, Clone)]
pub struct VoxelGrid {
    /// The size of the voxel (leaf) in x, y, z dimensions.
    leaf_size: [f64; 3],
    /// Minimum number of points required per voxel.
    min_points_per_voxel: usize,
}

impl VoxelGrid {
    /// Creates a new `VoxelGrid` with the specified leaf size.
    ///
    /// # Arguments
    /// * `leaf_size` - The size of the voxel in x, y, z dimensions.
    ///
    /// # Errors
    /// Returns [`FusionError::InvalidVoxelSize`] if any dimension is not a positive finite number.
    pub fn new(leaf_size: [f64; 3]) -> Result<Self, FusionError> {
        Self::check_leaf_size(&leaf_size)?;
        Ok(VoxelGrid {
            leaf_size,
            min_points_per_voxel: 1,
        })
    }

    /// Creates a new `VoxelGrid` with cubic voxels of the given edge length.
    pub fn cubic(voxel_size: f64) -> Result<Self, FusionError> {
        Self::new([voxel_size; 3])
    }

    fn check_leaf_size(leaf_size: &[f64; 3]) -> Result<(), FusionError> {
        match leaf_size.iter().find(|&&l| !(l > 0.0 && l.is_finite())) {
            Some(&l) => Err(FusionError::InvalidVoxelSize(l)),
            None => Ok(()),
        }
    }

    /// Downsamples the input point cloud by grouping points into voxels and computing centroids.
    ///
    /// # Arguments
    /// * `point_cloud` - The input point cloud to downsample.
    ///
    /// # Returns
    /// A new `PointCloud` containing one point per retained voxel, colored with the
    /// voxel mean color if the input has colors.
    pub fn downsample(&self, point_cloud: &PointCloud) -> PointCloud {
        let mut slots: HashMap<(i64, i64, i64), usize> = HashMap::new();
        let mut voxels: Vec<VoxelData> = Vec::new();

        // Group points into voxels
        for (i, point) in point_cloud.points().iter().enumerate() {
            let key = self.get_voxel_index(point);
            let slot = *slots.entry(key).or_insert_with(|| {
                voxels.push(([0.0; 3], [0.0; 3], 0));
                voxels.len() - 1
            });
            let entry = &mut voxels[slot];
            for k in 0..3 {
                entry.0[k] += point[k];
            }
            if let Some(color) = point_cloud.colors().and_then(|colors| colors.get(i)) {
                for k in 0..3 {
                    entry.1[k] += color[k];
                }
            }
            entry.2 += 1;
        }

        // Compute centroids for each voxel
        let mut points = Vec::with_capacity(voxels.len());
        let mut colors = point_cloud
            .colors()
            .map(|_| Vec::with_capacity(voxels.len()));

        for (sum, color_sum, count) in voxels {
            if count < self.min_points_per_voxel {
                continue;
            }
            let inv_count = 1.0 / count as f64;
            points.push([sum[0] * inv_count, sum[1] * inv_count, sum[2] * inv_count]);
            if let Some(colors_vec) = colors.as_mut() {
                colors_vec.push([
                    color_sum[0] * inv_count,
                    color_sum[1] * inv_count,
                    color_sum[2] * inv_count,
                ]);
            }
        }

        PointCloud::new(points, colors).unwrap_or_default()
    }

    /// Computes the voxel index for a given point.
    ///
    /// # Arguments
    /// * `point` - The input point as `[x, y, z]`.
    ///
    /// # Returns
    /// The voxel index as `(i64, i64, i64)`.
    pub fn get_voxel_index(&self, point: &[f64; 3]) -> (i64, i64, i64) {
        (
            (point[0] / self.leaf_size[0]).floor() as i64,
            (point[1] / self.leaf_size[1]).floor() as i64,
            (point[2] / self.leaf_size[2]).floor() as i64,
        )
    }

    /// Sets the minimum number of points required per voxel.
    pub fn set_min_points_per_voxel(&mut self, min_points: usize) {
        self.min_points_per_voxel = min_points;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_downsample_points_only() -> Result<(), FusionError> {
        let points = vec![[1.0, 1.0, 1.0], [1.1, 1.1, 1.1]];
        let point_cloud = PointCloud::new(points, None)?;
        let voxel_grid = VoxelGrid::cubic(1.0)?;

        let downsampled = voxel_grid.downsample(&point_cloud);
        assert_eq!(downsampled.len(), 1);
        let centroid = downsampled.points()[0];
        assert_relative_eq!(centroid[0], 1.05, epsilon = 1e-9);
        assert_relative_eq!(centroid[1], 1.05, epsilon = 1e-9);
        assert_relative_eq!(centroid[2], 1.05, epsilon = 1e-9);
        assert!(downsampled.colors().is_none());
        Ok(())
    }

    #[test]
    fn test_downsample_with_colors() -> Result<(), FusionError> {
        let points = vec![[1.0, 1.0, 1.0], [1.1, 1.1, 1.1]];
        let colors = Some(vec![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
        let point_cloud = PointCloud::new(points, colors)?;
        let downsampled = VoxelGrid::cubic(1.0)?.downsample(&point_cloud);
        assert_eq!(downsampled.len(), 1);
        assert_eq!(downsampled.colors().map(|c| c[0]), Some([0.5, 0.5, 0.0]));
        Ok(())
    }

    #[test]
    fn test_downsample_first_seen_order() -> Result<(), FusionError> {
        let points = vec![
            [5.2, 0.0, 0.0],
            [0.1, 0.0, 0.0],
            [5.4, 0.0, 0.0],
            [-0.5, 0.0, 0.0],
        ];
        let point_cloud = PointCloud::new(points, None)?;
        let downsampled = VoxelGrid::cubic(1.0)?.downsample(&point_cloud);

        // voxels 5, 0 and -1, in order of first appearance
        assert_eq!(downsampled.len(), 3);
        assert_relative_eq!(downsampled.points()[0][0], 5.3, epsilon = 1e-9);
        assert_relative_eq!(downsampled.points()[1][0], 0.1, epsilon = 1e-9);
        assert_relative_eq!(downsampled.points()[2][0], -0.5, epsilon = 1e-9);
        Ok(())
    }

    #[test]
    fn test_downsample_empty() -> Result<(), FusionError> {
        let empty = PointCloud::new(vec![], Some(vec![]))?;
        let downsampled = VoxelGrid::cubic(0.01)?.downsample(&empty);
        assert!(downsampled.is_empty());
        Ok(())
    }

    #[test]
    fn test_voxel_index_negative() -> Result<(), FusionError> {
        let voxel_grid = VoxelGrid::new([0.5, 1.0, 2.0])?;
        assert_eq!(voxel_grid.get_voxel_index(&[-0.1, 1.5, 3.9]), (-1, 1, 1));
        Ok(())
    }

    #[test]
    fn test_min_points_per_voxel() -> Result<(), FusionError> {
        let points = vec![[1.0, 1.0, 1.0], [3.2, 0.0, 0.0], [3.4, 0.0, 0.0]];
        let point_cloud = PointCloud::new(points, None)?;
        let mut voxel_grid = VoxelGrid::cubic(1.0)?;
        voxel_grid.set_min_points_per_voxel(2);

        let downsampled = voxel_grid.downsample(&point_cloud);
        assert_eq!(downsampled.len(), 1);
        assert_relative_eq!(downsampled.points()[0][0], 3.3, epsilon = 1e-9);
        Ok(())
    }

    #[test]
    fn test_invalid_leaf_size() {
        assert_eq!(
            VoxelGrid::new([0.0, 1.0, 1.0]).unwrap_err(),
            FusionError::InvalidVoxelSize(0.0)
        );
        assert!(VoxelGrid::cubic(f64::NAN).is_err());
    }
}
