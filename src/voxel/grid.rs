/// Dense block grid with a growable vertical range
///
/// Horizontal extents are fixed at construction. The Y range grows on write:
/// setting a block above or below the current range reallocates the array,
/// copies the existing slabs to their new offset and fills the new slabs with Air.
///
/// Grid Y grows downward in world space. Cell (x, y, z) spans
/// `[x - size_x/2, x - size_x/2 + 1]` in world X, `[-(y + 1), -y]` in world Y
/// and `[z - size_z/2, z - size_z/2 + 1]` in world Z.
use super::BlockType;
use glam::{IVec3, Vec3};

#[derive(Debug, Clone)]
pub struct BlockGrid {
    size_x: i32,
    size_z: i32,
    y_min: i32,
    y_max: i32,
    blocks: Vec<BlockType>,
}

impl BlockGrid {
    /// Empty (all Air) grid covering `[0,size_x) x [y_min,y_max] x [0,size_z)`.
    pub fn new(size_x: i32, size_z: i32, y_min: i32, y_max: i32) -> Self {
        let size_x = size_x.max(1);
        let size_z = size_z.max(1);
        let y_max = y_max.max(y_min);
        let count = size_x as usize * (y_max - y_min + 1) as usize * size_z as usize;
        Self {
            size_x,
            size_z,
            y_min,
            y_max,
            blocks: vec![BlockType::Air; count],
        }
    }

    #[inline]
    pub fn size_x(&self) -> i32 {
        self.size_x
    }

    #[inline]
    pub fn size_z(&self) -> i32 {
        self.size_z
    }

    #[inline]
    pub fn y_min(&self) -> i32 {
        self.y_min
    }

    #[inline]
    pub fn y_max(&self) -> i32 {
        self.y_max
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.y_max - self.y_min + 1
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32, z: i32) -> bool {
        x >= 0
            && x < self.size_x
            && z >= 0
            && z < self.size_z
            && y >= self.y_min
            && y <= self.y_max
    }

    #[inline]
    fn index(&self, x: i32, y: i32, z: i32) -> usize {
        (((y - self.y_min) * self.size_z + z) * self.size_x + x) as usize
    }

    /// Block at (x, y, z); Air for any coordinate outside the grid.
    #[inline]
    pub fn get(&self, x: i32, y: i32, z: i32) -> BlockType {
        if !self.contains(x, y, z) {
            return BlockType::Air;
        }
        self.blocks[self.index(x, y, z)]
    }

    #[inline]
    pub fn get_at(&self, cell: IVec3) -> BlockType {
        self.get(cell.x, cell.y, cell.z)
    }

    /// Store `block` at (x, y, z), growing the Y range when needed.
    /// Returns false (and changes nothing) when x or z is out of range.
    pub fn set(&mut self, x: i32, y: i32, z: i32, block: BlockType) -> bool {
        if x < 0 || x >= self.size_x || z < 0 || z >= self.size_z {
            return false;
        }
        if y < self.y_min || y > self.y_max {
            self.grow_y(y);
        }
        let index = self.index(x, y, z);
        self.blocks[index] = block;
        true
    }

    fn grow_y(&mut self, y: i32) {
        let new_y_min = self.y_min.min(y);
        let new_y_max = self.y_max.max(y);
        let slab = self.size_x as usize * self.size_z as usize;
        let new_height = (new_y_max - new_y_min + 1) as usize;

        let mut grown = vec![BlockType::Air; slab * new_height];
        let dst_offset = (self.y_min - new_y_min) as usize * slab;
        grown[dst_offset..dst_offset + self.blocks.len()].copy_from_slice(&self.blocks);

        tracing::debug!(
            from = ?(self.y_min, self.y_max),
            to = ?(new_y_min, new_y_max),
            "block grid grew vertically"
        );

        self.blocks = grown;
        self.y_min = new_y_min;
        self.y_max = new_y_max;
    }

    /// Count of non-air blocks (debug/statistics helper).
    pub fn solid_count(&self) -> usize {
        self.blocks.iter().filter(|b| !b.is_air()).count()
    }

    /// Shallowest non-air row in column (x, z), scanning from `y_min` downward.
    pub fn top_solid(&self, x: i32, z: i32) -> Option<i32> {
        (self.y_min..=self.y_max).find(|&y| !self.get(x, y, z).is_air())
    }

    /// World-space centre of cell (x, y, z).
    #[inline]
    pub fn block_center(&self, x: i32, y: i32, z: i32) -> Vec3 {
        Vec3::new(
            x as f32 - self.size_x as f32 * 0.5 + 0.5,
            -(y as f32) - 0.5,
            z as f32 - self.size_z as f32 * 0.5 + 0.5,
        )
    }

    /// World-space bounds (min, max) of cell (x, y, z).
    #[inline]
    pub fn cell_bounds(&self, x: i32, y: i32, z: i32) -> (Vec3, Vec3) {
        let min = Vec3::new(
            x as f32 - self.size_x as f32 * 0.5,
            -((y + 1) as f32),
            z as f32 - self.size_z as f32 * 0.5,
        );
        (min, min + Vec3::ONE)
    }

    /// Continuous grid coordinates of a world-space point (y flipped).
    #[inline]
    pub fn world_to_grid(&self, p: Vec3) -> Vec3 {
        Vec3::new(
            p.x + self.size_x as f32 * 0.5,
            -p.y,
            p.z + self.size_z as f32 * 0.5,
        )
    }

    /// Cell containing a world-space point.
    #[inline]
    pub fn world_to_cell(&self, p: Vec3) -> IVec3 {
        self.world_to_grid(p).floor().as_ivec3()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_reads_are_air() {
        let mut grid = BlockGrid::new(4, 4, 0, 3);
        grid.set(1, 1, 1, BlockType::Stone);
        assert_eq!(grid.get(1, 1, 1), BlockType::Stone);
        assert_eq!(grid.get(-1, 1, 1), BlockType::Air);
        assert_eq!(grid.get(4, 1, 1), BlockType::Air);
        assert_eq!(grid.get(1, 99, 1), BlockType::Air);
        assert_eq!(grid.get(1, -99, 1), BlockType::Air);
    }

    #[test]
    fn test_horizontal_out_of_range_set_is_noop() {
        let mut grid = BlockGrid::new(4, 4, 0, 3);
        assert!(!grid.set(4, 0, 0, BlockType::Stone));
        assert!(!grid.set(0, 0, -1, BlockType::Stone));
        assert_eq!(grid.solid_count(), 0);
        assert_eq!((grid.y_min(), grid.y_max()), (0, 3));
    }

    #[test]
    fn test_growth_preserves_existing_blocks() {
        let mut grid = BlockGrid::new(3, 2, 0, 4);
        for y in 0..=4 {
            for z in 0..2 {
                for x in 0..3 {
                    grid.set(x, y, z, BlockType::from_u8(((x + y + z) % 8 + 1) as u8));
                }
            }
        }
        let before: Vec<BlockType> = (0..=4)
            .flat_map(|y| (0..2).flat_map(move |z| (0..3).map(move |x| (x, y, z))))
            .map(|(x, y, z)| grid.get(x, y, z))
            .collect();

        let above = grid.y_max() + 5;
        assert!(grid.set(1, above, 1, BlockType::Glass));
        assert!(grid.set(2, -3, 0, BlockType::Leaves));
        assert_eq!((grid.y_min(), grid.y_max()), (-3, 9));

        let after: Vec<BlockType> = (0..=4)
            .flat_map(|y| (0..2).flat_map(move |z| (0..3).map(move |x| (x, y, z))))
            .map(|(x, y, z)| grid.get(x, y, z))
            .collect();
        assert_eq!(before, after, "previously valid rows must read back unchanged");
        assert_eq!(grid.get(1, above, 1), BlockType::Glass);
        assert_eq!(grid.get(2, -3, 0), BlockType::Leaves);
        assert_eq!(grid.get(0, 7, 0), BlockType::Air, "new slabs are air");
    }

    #[test]
    fn test_set_is_idempotent() {
        let mut once = BlockGrid::new(4, 4, 0, 3);
        let mut twice = BlockGrid::new(4, 4, 0, 3);
        once.set(2, 6, 1, BlockType::Dirt);
        twice.set(2, 6, 1, BlockType::Dirt);
        twice.set(2, 6, 1, BlockType::Dirt);
        assert_eq!(once.blocks, twice.blocks);
        assert_eq!(once.y_max(), twice.y_max());
    }

    #[test]
    fn test_world_cell_mapping() {
        let grid = BlockGrid::new(16, 16, 0, 31);
        let center = grid.block_center(8, 5, 8);
        assert_eq!(center, Vec3::new(0.5, -5.5, 0.5));
        assert_eq!(grid.world_to_cell(center), IVec3::new(8, 5, 8));

        let (min, max) = grid.cell_bounds(8, 5, 8);
        assert_eq!(min, Vec3::new(0.0, -6.0, 0.0));
        assert_eq!(max, Vec3::new(1.0, -5.0, 1.0));
    }
}
