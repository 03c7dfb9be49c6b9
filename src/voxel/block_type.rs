/// Block type enumeration
/// Using u8 representation for memory efficiency
use crate::rendering::texture::TextureId;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum BlockType {
    #[default]
    Air = 0,
    Grass = 1,
    Dirt = 2,
    Stone = 3,
    OakLog = 4,
    OakPlanks = 5,
    Cobblestone = 6,
    Leaves = 7,
    Glass = 8,
}

pub const BLOCK_TYPE_COUNT: usize = 9;

// Lookup tables for block properties - eliminates branches in hot paths
const BLOCK_IS_OPAQUE_LUT: [bool; BLOCK_TYPE_COUNT] = [
    false, // Air
    true,  // Grass
    true,  // Dirt
    true,  // Stone
    true,  // OakLog
    true,  // OakPlanks
    true,  // Cobblestone
    false, // Leaves
    false, // Glass
];

/// Texture per face group: [top, side, bottom].
const BLOCK_FACES_LUT: [[TextureId; 3]; BLOCK_TYPE_COUNT] = [
    [TextureId::Stone, TextureId::Stone, TextureId::Stone], // Air (never meshed)
    [TextureId::GrassTop, TextureId::GrassSide, TextureId::Dirt],
    [TextureId::Dirt, TextureId::Dirt, TextureId::Dirt],
    [TextureId::Stone, TextureId::Stone, TextureId::Stone],
    [TextureId::OakLogTop, TextureId::OakLogSide, TextureId::OakLogTop],
    [TextureId::OakPlanks, TextureId::OakPlanks, TextureId::OakPlanks],
    [TextureId::Cobblestone, TextureId::Cobblestone, TextureId::Cobblestone],
    [TextureId::Leaves, TextureId::Leaves, TextureId::Leaves],
    [TextureId::Glass, TextureId::Glass, TextureId::Glass],
];

const BLOCK_NAMES_LUT: [&str; BLOCK_TYPE_COUNT] = [
    "AIR",
    "GRASS",
    "DIRT",
    "STONE",
    "OAK LOG",
    "OAK PLANKS",
    "COBBLESTONE",
    "LEAVES",
    "GLASS",
];

impl BlockType {
    pub const ALL: [BlockType; BLOCK_TYPE_COUNT] = [
        BlockType::Air,
        BlockType::Grass,
        BlockType::Dirt,
        BlockType::Stone,
        BlockType::OakLog,
        BlockType::OakPlanks,
        BlockType::Cobblestone,
        BlockType::Leaves,
        BlockType::Glass,
    ];

    /// Placeable blocks in hotbar order.
    pub const PLACEABLE: [BlockType; BLOCK_TYPE_COUNT - 1] = [
        BlockType::Grass,
        BlockType::Dirt,
        BlockType::Stone,
        BlockType::OakLog,
        BlockType::OakPlanks,
        BlockType::Cobblestone,
        BlockType::Leaves,
        BlockType::Glass,
    ];

    /// Opaque blocks hide the faces of their neighbours.
    #[inline]
    pub const fn is_opaque(self) -> bool {
        BLOCK_IS_OPAQUE_LUT[self as usize]
    }

    /// Every non-air block collides and stops rays, translucent or not.
    #[inline]
    pub const fn is_solid(self) -> bool {
        !self.is_air()
    }

    #[inline]
    pub const fn is_air(self) -> bool {
        matches!(self, BlockType::Air)
    }

    #[inline]
    pub const fn faces(self) -> [TextureId; 3] {
        BLOCK_FACES_LUT[self as usize]
    }

    #[inline]
    pub const fn top_texture(self) -> TextureId {
        BLOCK_FACES_LUT[self as usize][0]
    }

    #[inline]
    pub const fn side_texture(self) -> TextureId {
        BLOCK_FACES_LUT[self as usize][1]
    }

    #[inline]
    pub const fn bottom_texture(self) -> TextureId {
        BLOCK_FACES_LUT[self as usize][2]
    }

    #[inline]
    pub const fn name(self) -> &'static str {
        BLOCK_NAMES_LUT[self as usize]
    }

    /// Convert from u8 to BlockType
    /// Returns Air for out-of-bounds values
    #[inline]
    pub const fn from_u8(value: u8) -> Self {
        if (value as usize) < BLOCK_TYPE_COUNT {
            Self::ALL[value as usize]
        } else {
            BlockType::Air
        }
    }

    /// Next (or previous) placeable block with wrap-around.
    /// Anything outside the hotbar cycles from its first slot.
    pub fn cycle(self, forward: bool) -> Self {
        let count = Self::PLACEABLE.len();
        let idx = Self::PLACEABLE
            .iter()
            .position(|&b| b == self)
            .unwrap_or(0);
        let next = if forward {
            (idx + 1) % count
        } else {
            (idx + count - 1) % count
        };
        Self::PLACEABLE[next]
    }
}
