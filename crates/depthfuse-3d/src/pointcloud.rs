use crate::error::FusionError;

/// A point cloud with positions and optional per-point colors.
///
/// When colors are present there is exactly one color per point, in [0, 1].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud {
    // The points in the point cloud.
    points: Vec<[f64; 3]>,
    // The colors of the points.
    colors: Option<Vec<[f64; 3]>>,
}

impl PointCloud {
    /// Create a new point cloud from points and optional colors.
    ///
    /// # Errors
    ///
    /// Returns [`FusionError::ShapeMismatch`] if the number of colors differs from
    /// the number of points.
    pub fn new(
        points: Vec<[f64; 3]>,
        colors: Option<Vec<[f64; 3]>>,
    ) -> Result<Self, FusionError> {
        if let Some(colors) = &colors {
            if colors.len() != points.len() {
                return Err(FusionError::ShapeMismatch(format!(
                    "{} points but {} colors",
                    points.len(),
                    colors.len()
                )));
            }
        }
        Ok(Self { points, colors })
    }

    /// Get the number of points in the point cloud.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the point cloud is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Get as reference the points in the point cloud.
    pub fn points(&self) -> &Vec<[f64; 3]> {
        &self.points
    }

    /// Get as reference the colors of the points in the point cloud.
    pub fn colors(&self) -> Option<&Vec<[f64; 3]>> {
        self.colors.as_ref()
    }

    /// Append the points and colors of another cloud after the existing ones.
    ///
    /// An empty cloud is compatible with anything. Otherwise both clouds must
    /// agree on carrying colors.
    pub fn extend(&mut self, other: PointCloud) -> Result<(), FusionError> {
        if other.is_empty() {
            return Ok(());
        }
        if self.is_empty() {
            *self = other;
            return Ok(());
        }

        match (&mut self.colors, other.colors) {
            (Some(colors), Some(other_colors)) => colors.extend(other_colors),
            (None, None) => {}
            _ => {
                return Err(FusionError::ShapeMismatch(
                    "cannot concatenate colored and colorless point clouds".to_string(),
                ))
            }
        }
        self.points.extend(other.points);

        Ok(())
    }

    /// Get the minimum and maximum corners of the axis-aligned bounding box.
    ///
    /// Returns `None` for an empty cloud.
    pub fn bounds(&self) -> Option<([f64; 3], [f64; 3])> {
        let first = *self.points.first()?;
        Some(self.points.iter().skip(1).fold((first, first), |(mut lo, mut hi), p| {
            for k in 0..3 {
                lo[k] = lo[k].min(p[k]);
                hi[k] = hi[k].max(p[k]);
            }
            (lo, hi)
        }))
    }
}
