/// Meshing: converts the block grid into renderable textured triangles
pub mod mesh;
pub mod mesher;

pub use mesh::{Face, FaceDir, FaceList, MeshWindow, Vertex};
pub use mesher::{block_faces, build_faces};
