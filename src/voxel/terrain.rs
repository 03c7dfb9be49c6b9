/// Procedural terrain: fractal value-noise height map plus hashed tree placement
use super::{BlockGrid, BlockType};
use crate::config::TerrainConfig;
use noise::{Fbm, MultiFractal, NoiseFn, Value};
use rayon::prelude::*;

/// Deterministic integer hash mapped to [0, 1].
#[inline]
pub fn hash2i(x: i32, z: i32) -> f32 {
    let mut h = (x as u32)
        .wrapping_mul(374_761_393)
        .wrapping_add((z as u32).wrapping_mul(668_265_263));
    h = (h ^ (h >> 13)).wrapping_mul(1_274_126_177);
    h ^= h >> 16;
    h as f32 / u32::MAX as f32
}

pub struct TerrainGenerator {
    config: TerrainConfig,
    fbm: Fbm<Value>,
}

impl TerrainGenerator {
    pub fn new(config: TerrainConfig) -> Self {
        let fbm = Fbm::<Value>::new(config.seed)
            .set_octaves(config.octaves.max(1))
            .set_frequency(1.0)
            .set_lacunarity(config.lacunarity)
            .set_persistence(config.gain);
        Self { config, fbm }
    }

    /// Fractal noise at a column, remapped to [0, 1].
    #[inline]
    pub fn height_noise(&self, x: i32, z: i32) -> f32 {
        let scale = self.config.scale;
        let v = self.fbm.get([x as f64 * scale, z as f64 * scale]);
        ((v * 0.5 + 0.5) as f32).clamp(0.0, 1.0)
    }

    /// Grid row of the grass surface in column (x, z).
    #[inline]
    pub fn surface_row(&self, x: i32, z: i32, y_max: i32) -> i32 {
        let h = self.height_noise(x, z);
        let surface = self.config.stone_start + (h * self.config.height_amplitude) as i32;
        surface.min(y_max).max(1)
    }

    /// Per-column surface rows, row-major in z then x.
    pub fn height_map(&self, size_x: i32, size_z: i32, y_max: i32) -> Vec<i32> {
        (0..size_z)
            .into_par_iter()
            .flat_map_iter(|z| (0..size_x).map(move |x| (x, z)))
            .map(|(x, z)| self.surface_row(x, z, y_max))
            .collect()
    }

    /// Fill `grid` with layered terrain and trees.
    pub fn generate(&self, grid: &mut BlockGrid) {
        let start = std::time::Instant::now();
        let (size_x, size_z, y_max) = (grid.size_x(), grid.size_z(), grid.y_max());
        let heights = self.height_map(size_x, size_z, y_max);

        for z in 0..size_z {
            for x in 0..size_x {
                let surface = heights[(z * size_x + x) as usize];
                let dirt_end = (surface + self.config.dirt_depth).min(y_max);
                for y in surface..=y_max {
                    let block = if y == surface {
                        BlockType::Grass
                    } else if y <= dirt_end {
                        BlockType::Dirt
                    } else {
                        BlockType::Stone
                    };
                    grid.set(x, y, z, block);
                }
            }
        }

        let mut trees = 0usize;
        for x in 0..size_x {
            for z in 0..size_z {
                if try_place_tree(grid, x, z, self.config.tree_chance) {
                    trees += 1;
                }
            }
        }

        tracing::info!(
            columns = size_x * size_z,
            trees,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "terrain generated"
        );
    }
}

/// True when every cell between rows y0 and y1 (inclusive, either order) is Air.
pub fn column_is_clear(grid: &BlockGrid, x: i32, y0: i32, y1: i32, z: i32) -> bool {
    let (lo, hi) = if y0 <= y1 { (y0, y1) } else { (y1, y0) };
    (lo..=hi).all(|y| grid.get(x, y, z).is_air())
}

/// Roll for a tree in column (x, z) and place it when the ground is grass
/// and the column above is clear. Returns whether a tree was placed.
pub fn try_place_tree(grid: &mut BlockGrid, x: i32, z: i32, chance: f32) -> bool {
    if hash2i(x.wrapping_mul(31), z.wrapping_mul(17)) >= chance {
        return false;
    }

    let Some(top_y) = grid.top_solid(x, z) else {
        return false;
    };
    if grid.get(x, top_y, z) != BlockType::Grass {
        return false;
    }

    let trunk_h = 4 + (hash2i(x.wrapping_mul(13), z.wrapping_mul(29)) * 3.0) as i32;
    let clear_to = top_y - trunk_h - 2;
    if clear_to < grid.y_min() {
        return false;
    }
    if !column_is_clear(grid, x, top_y - 1, clear_to, z) {
        return false;
    }

    place_tree(grid, x, top_y - 1, z, trunk_h);
    true
}

/// Trunk of `trunk_h` logs rising from row `y`, then a three-layer canopy
/// (radii 2, 2, 1) and a single leaf on top. Leaves only replace Air.
pub fn place_tree(grid: &mut BlockGrid, x: i32, y: i32, z: i32, trunk_h: i32) {
    for i in 0..trunk_h {
        grid.set(x, y - i, z, BlockType::OakLog);
    }

    let trunk_top = y - (trunk_h - 1);
    let canopy_base = trunk_top - 1;
    for layer in 0..=2 {
        let yy = canopy_base - layer;
        if yy < grid.y_min() {
            break;
        }
        let radius: i32 = if layer == 2 { 1 } else { 2 };
        for dx in -radius..=radius {
            for dz in -radius..=radius {
                if dx.abs() + dz.abs() > radius + 1 {
                    continue;
                }
                if grid.get(x + dx, yy, z + dz).is_air() {
                    grid.set(x + dx, yy, z + dz, BlockType::Leaves);
                }
            }
        }
    }

    let top_leaf_y = canopy_base - 3;
    if top_leaf_y >= grid.y_min() && grid.get(x, top_leaf_y, z).is_air() {
        grid.set(x, top_leaf_y, z, BlockType::Leaves);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic_and_in_unit_range() {
        for (x, z) in [(0, 0), (1, 2), (-5, 17), (i32::MAX, i32::MIN)] {
            let h = hash2i(x, z);
            assert!((0.0..=1.0).contains(&h));
            assert_eq!(h, hash2i(x, z));
        }
        assert_ne!(hash2i(1, 0), hash2i(0, 1));
    }

    #[test]
    fn columns_are_layered_grass_dirt_stone() {
        let mut config = TerrainConfig::default();
        config.tree_chance = 0.0;
        let generator = TerrainGenerator::new(config.clone());
        let mut grid = BlockGrid::new(24, 24, 0, 31);
        generator.generate(&mut grid);

        for (x, z) in [(0, 0), (5, 11), (23, 23)] {
            let surface = grid.top_solid(x, z).unwrap();
            assert_eq!(surface, generator.surface_row(x, z, 31));
            assert!((1..=31).contains(&surface));
            assert_eq!(grid.get(x, surface, z), BlockType::Grass);
            for y in surface + 1..=(surface + config.dirt_depth).min(31) {
                assert_eq!(grid.get(x, y, z), BlockType::Dirt);
            }
            if surface + config.dirt_depth < 31 {
                assert_eq!(grid.get(x, 31, z), BlockType::Stone);
            }
            assert_eq!(grid.get(x, surface - 1, z), BlockType::Air);
        }
    }

    #[test]
    fn height_map_matches_serial_evaluation() {
        let generator = TerrainGenerator::new(TerrainConfig::default());
        let map = generator.height_map(9, 7, 31);
        assert_eq!(map.len(), 63);
        for z in 0..7 {
            for x in 0..9 {
                assert_eq!(map[(z * 9 + x) as usize], generator.surface_row(x, z, 31));
            }
        }
    }

    #[test]
    fn placed_tree_has_trunk_and_canopy() {
        let mut grid = BlockGrid::new(16, 16, 0, 31);
        for x in 0..16 {
            for z in 0..16 {
                grid.set(x, 20, z, BlockType::Grass);
            }
        }

        place_tree(&mut grid, 8, 19, 8, 5);
        for i in 0..5 {
            assert_eq!(grid.get(8, 19 - i, 8), BlockType::OakLog);
        }
        // trunk top is row 15, canopy base row 14
        assert_eq!(grid.get(10, 14, 8), BlockType::Leaves);
        assert_eq!(grid.get(8, 12, 8), BlockType::Leaves);
        assert_eq!(grid.get(10, 12, 8), BlockType::Air, "top layer has radius 1");
        assert_eq!(grid.get(8, 11, 8), BlockType::Leaves, "single top leaf");
        assert_eq!(grid.get(8, 10, 8), BlockType::Air);
    }

    #[test]
    fn canopy_layers_skip_their_corners() {
        let mut grid = BlockGrid::new(16, 16, 0, 31);
        place_tree(&mut grid, 8, 19, 8, 5);

        // radius 2 layer: |dx| + |dz| <= 3
        assert_eq!(grid.get(10, 14, 9), BlockType::Leaves);
        assert_eq!(grid.get(6, 13, 7), BlockType::Leaves);
        assert_eq!(grid.get(10, 14, 10), BlockType::Air);
        assert_eq!(grid.get(6, 13, 6), BlockType::Air);
        // radius 1 layer keeps its corners
        assert_eq!(grid.get(9, 12, 9), BlockType::Leaves);
        assert_eq!(grid.get(7, 12, 7), BlockType::Leaves);
    }

    #[test]
    fn tree_requires_grass_ground_and_headroom() {
        let mut grid = BlockGrid::new(8, 8, 0, 31);
        grid.set(3, 20, 3, BlockType::Stone);
        assert!(!try_place_tree(&mut grid, 3, 3, 1.1), "stone ground rejects trees");

        grid.set(3, 20, 3, BlockType::Grass);
        grid.set(3, 16, 3, BlockType::Stone);
        assert!(
            !try_place_tree(&mut grid, 3, 3, 1.1),
            "the stone at row 16 is now the column top, not grass"
        );

        let mut low = BlockGrid::new(8, 8, 0, 31);
        low.set(3, 3, 3, BlockType::Grass);
        assert!(!try_place_tree(&mut low, 3, 3, 1.1), "no room above row 3");

        let mut open = BlockGrid::new(8, 8, 0, 31);
        open.set(3, 20, 3, BlockType::Grass);
        assert!(try_place_tree(&mut open, 3, 3, 1.1));
        assert_eq!(open.get(3, 19, 3), BlockType::OakLog);
        assert!(!try_place_tree(&mut BlockGrid::new(8, 8, 0, 31), 3, 3, 0.0));
    }
}
