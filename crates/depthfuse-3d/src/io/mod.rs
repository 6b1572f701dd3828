/// Reader for RGB-D sequences stored as NumPy `.npz` archives.
pub mod archive;

/// PLY reader and writer module.
pub mod ply;
