/// Mesh data structures: textured triangles produced by the mesher
use crate::rendering::texture::TextureId;
use glam::{IVec3, Vec2, Vec3};

/// Model-space vertex with a texture coordinate.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub uv: Vec2,
}

impl Vertex {
    #[inline]
    pub const fn new(position: Vec3, uv: Vec2) -> Self {
        Self { position, uv }
    }
}

/// One triangle plus a handle into the texture table.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Face {
    pub vertices: [Vertex; 3],
    pub texture: TextureId,
}

impl Face {
    #[inline]
    pub fn centroid(&self) -> Vec3 {
        (self.vertices[0].position + self.vertices[1].position + self.vertices[2].position)
            / 3.0
    }

    #[inline]
    pub fn is_translucent(&self) -> bool {
        self.texture.is_translucent()
    }
}

/// Axis-aligned block face directions, named in world space.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FaceDir {
    PosY, // Top
    NegY, // Bottom
    PosZ, // Front
    NegZ, // Back
    NegX, // Left
    PosX, // Right
}

/// Quad corners per face as unit-cube offsets from the block's minimum corner.
/// Every quad winds counter-clockwise when seen from outside the block.
const FACE_CORNERS: [[[u8; 3]; 4]; 6] = [
    [[0, 1, 1], [1, 1, 1], [1, 1, 0], [0, 1, 0]], // PosY
    [[0, 0, 0], [1, 0, 0], [1, 0, 1], [0, 0, 1]], // NegY
    [[0, 0, 1], [1, 0, 1], [1, 1, 1], [0, 1, 1]], // PosZ
    [[1, 0, 0], [0, 0, 0], [0, 1, 0], [1, 1, 0]], // NegZ
    [[0, 0, 0], [0, 0, 1], [0, 1, 1], [0, 1, 0]], // NegX
    [[1, 0, 1], [1, 0, 0], [1, 1, 0], [1, 1, 1]], // PosX
];

/// Texture coordinates for the two triangles of a quad.
const QUAD_UVS: [[Vec2; 3]; 2] = [
    [Vec2::new(0.0, 1.0), Vec2::new(1.0, 1.0), Vec2::new(1.0, 0.0)],
    [Vec2::new(0.0, 1.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 0.0)],
];

impl FaceDir {
    /// Emission order used by the mesher.
    pub const ALL: [FaceDir; 6] = [
        FaceDir::PosY,
        FaceDir::NegY,
        FaceDir::PosZ,
        FaceDir::NegZ,
        FaceDir::NegX,
        FaceDir::PosX,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn normal(self) -> Vec3 {
        match self {
            FaceDir::PosX => Vec3::X,
            FaceDir::NegX => Vec3::NEG_X,
            FaceDir::PosY => Vec3::Y,
            FaceDir::NegY => Vec3::NEG_Y,
            FaceDir::PosZ => Vec3::Z,
            FaceDir::NegZ => Vec3::NEG_Z,
        }
    }

    /// Offset to the neighbouring cell in grid coordinates (grid Y is flipped).
    #[inline]
    pub const fn grid_offset(self) -> IVec3 {
        match self {
            FaceDir::PosX => IVec3::new(1, 0, 0),
            FaceDir::NegX => IVec3::new(-1, 0, 0),
            FaceDir::PosY => IVec3::new(0, -1, 0),
            FaceDir::NegY => IVec3::new(0, 1, 0),
            FaceDir::PosZ => IVec3::new(0, 0, 1),
            FaceDir::NegZ => IVec3::new(0, 0, -1),
        }
    }

    #[inline]
    pub const fn is_vertical(self) -> bool {
        matches!(self, FaceDir::PosY | FaceDir::NegY)
    }

    /// World-space quad corners for a unit block whose minimum corner is `min`.
    #[inline]
    pub fn quad_corners(self, min: Vec3) -> [Vec3; 4] {
        FACE_CORNERS[self.index()].map(|[x, y, z]| min + Vec3::new(x as f32, y as f32, z as f32))
    }

    /// The two textured triangles covering this face of a unit block.
    pub fn faces(self, min: Vec3, texture: TextureId) -> [Face; 2] {
        let [p0, p1, p2, p3] = self.quad_corners(min);
        [
            Face {
                vertices: [
                    Vertex::new(p0, QUAD_UVS[0][0]),
                    Vertex::new(p1, QUAD_UVS[0][1]),
                    Vertex::new(p2, QUAD_UVS[0][2]),
                ],
                texture,
            },
            Face {
                vertices: [
                    Vertex::new(p0, QUAD_UVS[1][0]),
                    Vertex::new(p2, QUAD_UVS[1][1]),
                    Vertex::new(p3, QUAD_UVS[1][2]),
                ],
                texture,
            },
        ]
    }
}

/// Horizontal block window a face list was built for (inclusive bounds).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct MeshWindow {
    pub x0: i32,
    pub x1: i32,
    pub z0: i32,
    pub z1: i32,
}

impl MeshWindow {
    #[inline]
    pub fn contains(&self, x: i32, z: i32) -> bool {
        x >= self.x0 && x <= self.x1 && z >= self.z0 && z <= self.z1
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x0 > self.x1 || self.z0 > self.z1
    }
}

/// Face list rebuilt from the block grid whenever the mesh is dirty.
#[derive(Debug, Clone, Default)]
pub struct FaceList {
    pub faces: Vec<Face>,
    pub window: MeshWindow,
}

impl FaceList {
    #[inline]
    pub fn len(&self) -> usize {
        self.faces.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Face] {
        &self.faces
    }

    pub fn translucent_count(&self) -> usize {
        self.faces.iter().filter(|f| f.is_translucent()).count()
    }
}
