/// Grid DDA raycast for block picking
use crate::count_call;
use crate::voxel::{BlockGrid, BlockType};
use glam::{IVec3, Vec3};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RayHit {
    /// Grid cell of the first non-air block.
    pub block: IVec3,
    pub kind: BlockType,
    /// World-space normal of the face the ray entered through; zero when the
    /// ray starts inside the block.
    pub normal: IVec3,
    /// Ray parameter at the entry face.
    pub distance: f32,
}

impl RayHit {
    /// Grid cell in front of the hit face, where a placed block goes.
    #[inline]
    pub fn adjacent(&self) -> IVec3 {
        // world normal back to grid space: y flips
        self.block + IVec3::new(self.normal.x, -self.normal.y, self.normal.z)
    }
}

#[inline]
fn first_crossing(g: f32, cell: i32, d: f32, step: i32, inv: f32) -> f32 {
    if d == 0.0 {
        return f32::INFINITY;
    }
    let span = if step > 0 { (cell + 1) as f32 - g } else { g - cell as f32 };
    span * inv
}

/// Walk the cells pierced by `origin + t * dir` for `t` in `[0, max_dist]` and
/// return the first non-air block inside the grid.
pub fn raycast(grid: &BlockGrid, origin: Vec3, dir: Vec3, max_dist: f32) -> Option<RayHit> {
    let g = grid.world_to_grid(origin);
    let d = Vec3::new(dir.x, -dir.y, dir.z);

    let mut cell = g.floor().as_ivec3();
    let step = IVec3::new(
        if d.x > 0.0 { 1 } else { -1 },
        if d.y > 0.0 { 1 } else { -1 },
        if d.z > 0.0 { 1 } else { -1 },
    );
    let inv = Vec3::new(
        if d.x != 0.0 { 1.0 / d.x.abs() } else { f32::INFINITY },
        if d.y != 0.0 { 1.0 / d.y.abs() } else { f32::INFINITY },
        if d.z != 0.0 { 1.0 / d.z.abs() } else { f32::INFINITY },
    );
    let mut t_max = Vec3::new(
        first_crossing(g.x, cell.x, d.x, step.x, inv.x),
        first_crossing(g.y, cell.y, d.y, step.y, inv.y),
        first_crossing(g.z, cell.z, d.z, step.z, inv.z),
    );

    let mut grid_normal = IVec3::ZERO;
    let mut t = 0.0f32;
    while t <= max_dist {
        count_call!(crate::perf::FUNCTION_COUNTERS.raycast_steps);
        if grid.contains(cell.x, cell.y, cell.z) {
            let kind = grid.get_at(cell);
            if !kind.is_air() {
                return Some(RayHit {
                    block: cell,
                    kind,
                    normal: IVec3::new(grid_normal.x, -grid_normal.y, grid_normal.z),
                    distance: t,
                });
            }
        }

        if t_max.x < t_max.y {
            if t_max.x < t_max.z {
                t = t_max.x;
                t_max.x += inv.x;
                cell.x += step.x;
                grid_normal = IVec3::new(-step.x, 0, 0);
            } else {
                t = t_max.z;
                t_max.z += inv.z;
                cell.z += step.z;
                grid_normal = IVec3::new(0, 0, -step.z);
            }
        } else if t_max.y < t_max.z {
            t = t_max.y;
            t_max.y += inv.y;
            cell.y += step.y;
            grid_normal = IVec3::new(0, -step.y, 0);
        } else {
            t = t_max.z;
            t_max.z += inv.z;
            cell.z += step.z;
            grid_normal = IVec3::new(0, 0, -step.z);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_with_stone() -> BlockGrid {
        let mut grid = BlockGrid::new(16, 16, 0, 15);
        grid.set(8, 5, 8, BlockType::Stone);
        grid
    }

    #[test]
    fn test_straight_down_hits_top_face() {
        let grid = grid_with_stone();
        let hit = raycast(&grid, Vec3::new(0.0, 2.0, 0.0), Vec3::NEG_Y, 20.0).unwrap();
        assert_eq!(hit.block, IVec3::new(8, 5, 8));
        assert_eq!(hit.kind, BlockType::Stone);
        assert_eq!(hit.normal, IVec3::new(0, 1, 0));
        assert!((hit.distance - 7.0).abs() < 1e-5);
        assert_eq!(hit.adjacent(), IVec3::new(8, 4, 8));
    }

    #[test]
    fn test_max_distance_is_respected() {
        let grid = grid_with_stone();
        assert!(raycast(&grid, Vec3::new(0.0, 2.0, 0.0), Vec3::NEG_Y, 6.5).is_none());
    }

    #[test]
    fn test_horizontal_ray_reports_side_normal() {
        let grid = grid_with_stone();
        // centre row of the block is world y = -5.5
        let hit = raycast(&grid, Vec3::new(-3.5, -5.5, 0.5), Vec3::X, 10.0).unwrap();
        assert_eq!(hit.block, IVec3::new(8, 5, 8));
        assert_eq!(hit.normal, IVec3::new(-1, 0, 0));
        assert!((hit.distance - 3.5).abs() < 1e-5);
        assert_eq!(hit.adjacent(), IVec3::new(7, 5, 8));
    }

    #[test]
    fn test_upward_ray_hits_bottom_face() {
        let grid = grid_with_stone();
        let hit = raycast(&grid, Vec3::new(0.5, -9.5, 0.5), Vec3::Y, 10.0).unwrap();
        assert_eq!(hit.normal, IVec3::new(0, -1, 0));
        assert_eq!(hit.adjacent(), IVec3::new(8, 6, 8));
    }

    #[test]
    fn test_ray_starting_inside_a_block() {
        let grid = grid_with_stone();
        let hit = raycast(&grid, Vec3::new(0.5, -5.5, 0.5), Vec3::X, 10.0).unwrap();
        assert_eq!(hit.distance, 0.0);
        assert_eq!(hit.normal, IVec3::ZERO);
    }

    #[test]
    fn test_zero_direction_and_empty_grid_miss() {
        let grid = grid_with_stone();
        assert!(raycast(&grid, Vec3::new(0.0, 2.0, 0.0), Vec3::ZERO, 10.0).is_none());
        let empty = BlockGrid::new(16, 16, 0, 15);
        assert!(raycast(&empty, Vec3::ZERO, Vec3::new(0.3, -1.0, 0.2).normalize(), 50.0).is_none());
    }
}
