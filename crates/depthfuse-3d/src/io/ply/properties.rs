use super::PlyError;

/// A scalar property declared in a PLY header.
#[derive(Debug, PartialEq, Clone)]
pub struct PlyPropertyDefinition {
    /// The property name, e.g. `x` or `red`.
    pub name: String,
    /// The property storage type.
    pub data_type: PlyDataType,
}

/// Scalar storage types of PLY properties.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum PlyDataType {
    /// 32-bit float
    Float32,
    /// 64-bit float
    Float64,
    /// signed 8-bit integer
    Int8,
    /// unsigned 8-bit integer
    UInt8,
    /// signed 16-bit integer
    Int16,
    /// unsigned 16-bit integer
    UInt16,
    /// signed 32-bit integer
    Int32,
    /// unsigned 32-bit integer
    UInt32,
}

impl PlyDataType {
    /// Parse a PLY type name, accepting both the legacy and the sized spellings.
    pub fn parse(type_str: &str) -> Result<Self, PlyError> {
        match type_str {
            "float" | "float32" => Ok(PlyDataType::Float32),
            "double" | "float64" => Ok(PlyDataType::Float64),
            "char" | "int8" => Ok(PlyDataType::Int8),
            "uchar" | "uint8" => Ok(PlyDataType::UInt8),
            "short" | "int16" => Ok(PlyDataType::Int16),
            "ushort" | "uint16" => Ok(PlyDataType::UInt16),
            "int" | "int32" => Ok(PlyDataType::Int32),
            "uint" | "uint32" => Ok(PlyDataType::UInt32),
            _ => Err(PlyError::UnsupportedProperty),
        }
    }

    /// The type name written in headers.
    pub fn name(&self) -> &'static str {
        match self {
            PlyDataType::Float32 => "float",
            PlyDataType::Float64 => "double",
            PlyDataType::Int8 => "char",
            PlyDataType::UInt8 => "uchar",
            PlyDataType::Int16 => "short",
            PlyDataType::UInt16 => "ushort",
            PlyDataType::Int32 => "int",
            PlyDataType::UInt32 => "uint",
        }
    }

    /// Size in bytes of one value.
    pub fn size(&self) -> usize {
        match self {
            PlyDataType::Float32 | PlyDataType::Int32 | PlyDataType::UInt32 => 4,
            PlyDataType::Float64 => 8,
            PlyDataType::Int16 | PlyDataType::UInt16 => 2,
            PlyDataType::Int8 | PlyDataType::UInt8 => 1,
        }
    }

    /// Decode one little-endian value as f64.
    ///
    /// PRECONDITION: `buf` holds at least [`PlyDataType::size`] bytes.
    pub fn read_le(&self, buf: &[u8]) -> f64 {
        match self {
            PlyDataType::Float32 => f32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]) as f64,
            PlyDataType::Float64 => f64::from_le_bytes([
                buf[0], buf[1], buf[2], buf[3], buf[4], buf[5], buf[6], buf[7],
            ]),
            PlyDataType::Int8 => buf[0] as i8 as f64,
            PlyDataType::UInt8 => buf[0] as f64,
            PlyDataType::Int16 => i16::from_le_bytes([buf[0], buf[1]]) as f64,
            PlyDataType::UInt16 => u16::from_le_bytes([buf[0], buf[1]]) as f64,
            PlyDataType::Int32 => i32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]) as f64,
            PlyDataType::UInt32 => u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]) as f64,
        }
    }
}

/// Byte layout of one vertex record.
#[derive(Debug, Clone)]
pub(crate) struct VertexLayout {
    /// Offset and type of x, y, z.
    pub position: [(usize, PlyDataType); 3],
    /// Offset and type of red, green, blue if present.
    pub color: Option<[(usize, PlyDataType); 3]>,
    /// Total bytes per vertex.
    pub stride: usize,
}

impl VertexLayout {
    pub fn from_properties(properties: &[PlyPropertyDefinition]) -> Result<Self, PlyError> {
        let mut offset = 0;
        let mut offsets = Vec::with_capacity(properties.len());
        for property in properties {
            offsets.push((property.name.as_str(), offset, property.data_type));
            offset += property.data_type.size();
        }

        let lookup = |name: &str| {
            offsets
                .iter()
                .find(|(n, _, _)| *n == name)
                .map(|(_, off, ty)| (*off, *ty))
        };

        let position = match (lookup("x"), lookup("y"), lookup("z")) {
            (Some(x), Some(y), Some(z)) => [x, y, z],
            _ => return Err(PlyError::UnsupportedProperty),
        };

        let color = match (lookup("red"), lookup("green"), lookup("blue")) {
            (Some(r), Some(g), Some(b)) => Some([r, g, b]),
            (None, None, None) => None,
            _ => return Err(PlyError::UnsupportedProperty),
        };

        Ok(Self {
            position,
            color,
            stride: offset,
        })
    }
}
