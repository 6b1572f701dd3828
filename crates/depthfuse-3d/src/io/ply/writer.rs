use std::io::{BufWriter, Write};
use std::path::Path;

use super::{PlyDataType, PlyError};
use crate::pointcloud::PointCloud;

/// Check that `path` has a `.ply` extension, ignoring case.
///
/// # Errors
///
/// Returns [`PlyError::InvalidFileExtension`] otherwise.
pub fn check_ply_extension(path: impl AsRef<Path>) -> Result<(), PlyError> {
    let path = path.as_ref();
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("ply") => Ok(()),
        _ => Err(PlyError::InvalidFileExtension(path.to_path_buf())),
    }
}

#[inline]
fn color_to_u8(value: f64) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Write a point cloud as a binary little-endian PLY file.
///
/// Positions are stored as `double`. When the cloud has colors they are stored
/// as `uchar` channels, mapping [0, 1] to [0, 255].
///
/// # Errors
///
/// Returns [`PlyError::InvalidFileExtension`] if the path does not end in `.ply`.
pub fn write_ply_binary(path: impl AsRef<Path>, pointcloud: &PointCloud) -> Result<(), PlyError> {
    let path = path.as_ref();
    check_ply_extension(path)?;

    let file = std::fs::File::create(path)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "ply")?;
    writeln!(writer, "format binary_little_endian 1.0")?;
    writeln!(writer, "element vertex {}", pointcloud.len())?;
    for axis in ["x", "y", "z"] {
        writeln!(writer, "property {} {}", PlyDataType::Float64.name(), axis)?;
    }
    if pointcloud.colors().is_some() {
        for channel in ["red", "green", "blue"] {
            writeln!(writer, "property {} {}", PlyDataType::UInt8.name(), channel)?;
        }
    }
    writeln!(writer, "end_header")?;

    for (i, point) in pointcloud.points().iter().enumerate() {
        for value in point {
            writer.write_all(&value.to_le_bytes())?;
        }
        if let Some(color) = pointcloud.colors().and_then(|colors| colors.get(i)) {
            writer.write_all(&[
                color_to_u8(color[0]),
                color_to_u8(color[1]),
                color_to_u8(color[2]),
            ])?;
        }
    }

    writer.flush()?;

    Ok(())
}
