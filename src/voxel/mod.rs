/// Core voxel data: block types, the dense block grid and terrain generation
pub mod block_type;
pub mod grid;
pub mod terrain;

pub use block_type::{BlockType, BLOCK_TYPE_COUNT};
pub use grid::BlockGrid;
pub use terrain::{hash2i, TerrainGenerator};

/// Horizontal size of a chunk in blocks; the unit of render distance
/// and of camera-crossing remesh triggers.
pub const CHUNK_SIZE: i32 = 16;
