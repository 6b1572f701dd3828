use std::io::{BufRead, Read, Seek};
use std::path::Path;

use super::{
    properties::{PlyDataType, PlyPropertyDefinition, VertexLayout},
    PlyError,
};
use crate::pointcloud::PointCloud;

struct PlyHeader {
    pub vertex_count: usize,
    pub properties: Vec<PlyPropertyDefinition>,
}

fn parse_header<R: BufRead>(reader: &mut R) -> Result<PlyHeader, PlyError> {
    let mut line = String::new();
    let mut vertex_count = None;
    let mut is_binary_little_endian = false;
    let mut is_ply = false;
    let mut in_vertex_element = false;
    let mut properties = Vec::new();

    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Err(PlyError::MalformedHeader);
        }
        let trimmed = line.trim();

        if trimmed == "ply" {
            is_ply = true;
            continue;
        }

        if trimmed == "end_header" {
            break;
        }

        if trimmed.starts_with("format binary_little_endian") {
            is_binary_little_endian = true;
        } else if trimmed.starts_with("element") {
            let parts: Vec<&str> = trimmed.split_whitespace().collect();
            in_vertex_element = parts.get(1) == Some(&"vertex");
            if in_vertex_element {
                vertex_count = Some(
                    parts
                        .get(2)
                        .and_then(|s| s.parse::<usize>().ok())
                        .ok_or(PlyError::MalformedHeader)?,
                );
            } else if vertex_count.is_none() {
                // the vertex element has to come first for the stride to be known
                return Err(PlyError::UnsupportedProperty);
            }
        } else if trimmed.starts_with("property") && in_vertex_element {
            let parts: Vec<&str> = trimmed.split_whitespace().collect();
            if parts.len() != 3 {
                return Err(PlyError::UnsupportedProperty);
            }
            let data_type = PlyDataType::parse(parts[1])?;
            let name = parts[2].to_string();
            properties.push(PlyPropertyDefinition { name, data_type });
        }
    }

    if !is_ply || !is_binary_little_endian {
        return Err(PlyError::UnsupportedProperty);
    }

    let vertex_count = vertex_count.ok_or(PlyError::MalformedHeader)?;

    Ok(PlyHeader {
        vertex_count,
        properties,
    })
}

fn read_color_channel(buf: &[u8], offset: usize, data_type: PlyDataType) -> Result<f64, PlyError> {
    let value = data_type.read_le(&buf[offset..]);
    match data_type {
        PlyDataType::UInt8 => Ok(value / 255.0),
        PlyDataType::Float32 | PlyDataType::Float64 => Ok(value),
        _ => Err(PlyError::UnsupportedProperty),
    }
}

/// Read the vertices of a binary little-endian PLY file.
///
/// Positions may be stored with any scalar type. Colors are read from the
/// `red`, `green` and `blue` properties: `uchar` channels are scaled to [0, 1],
/// float channels are taken as is. Extra vertex properties are skipped.
///
/// # Errors
///
/// Returns [`PlyError::MalformedHeader`] if the header announces more vertices
/// than the file holds.
pub fn read_ply_binary(path: impl AsRef<Path>) -> Result<PointCloud, PlyError> {
    let file = std::fs::File::open(path)?;
    let file_size = file.metadata()?.len();
    let mut reader = std::io::BufReader::new(file);
    let header = parse_header(&mut reader)?;
    let layout = VertexLayout::from_properties(&header.properties)?;

    // the vertex records must fit in what is left of the file
    let data_size = file_size.saturating_sub(reader.stream_position()?);
    let max_vertices = data_size / layout.stride as u64;
    if header.vertex_count as u64 > max_vertices {
        return Err(PlyError::MalformedHeader);
    }

    let mut buffer = vec![0u8; layout.stride];

    let mut points = Vec::with_capacity(header.vertex_count);
    let mut colors = layout
        .color
        .map(|_| Vec::with_capacity(header.vertex_count));

    for _ in 0..header.vertex_count {
        reader.read_exact(&mut buffer)?;

        let [x, y, z] = layout.position;
        points.push([
            x.1.read_le(&buffer[x.0..]),
            y.1.read_le(&buffer[y.0..]),
            z.1.read_le(&buffer[z.0..]),
        ]);

        if let (Some(colors), Some([r, g, b])) = (colors.as_mut(), layout.color) {
            colors.push([
                read_color_channel(&buffer, r.0, r.1)?,
                read_color_channel(&buffer, g.0, g.1)?,
                read_color_channel(&buffer, b.0, b.1)?,
            ]);
        }
    }

    Ok(PointCloud::new(points, colors)?)
}
