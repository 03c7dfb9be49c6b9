/// Visible-face mesher
/// Emits two triangles for every block face whose neighbour is not opaque,
/// inside a square column window around the camera.
use super::mesh::{Face, FaceDir, FaceList, MeshWindow};
use crate::count_add;
use crate::count_call;
use crate::rendering::texture::TextureId;
use crate::voxel::{BlockGrid, BlockType, CHUNK_SIZE};
use glam::Vec3;
use std::time::Instant;

impl MeshWindow {
    /// Columns within `render_distance_chunks * CHUNK_SIZE` blocks of the
    /// camera's column, clamped to the grid.
    pub fn around(grid: &BlockGrid, camera_pos: Vec3, render_distance_chunks: i32) -> Self {
        let cam = grid.world_to_cell(camera_pos);
        let radius = render_distance_chunks.max(0) * CHUNK_SIZE;
        Self {
            x0: (cam.x - radius).max(0),
            x1: (cam.x + radius).min(grid.size_x() - 1),
            z0: (cam.z - radius).max(0),
            z1: (cam.z + radius).min(grid.size_z() - 1),
        }
    }

    /// Every column of the grid.
    pub fn full(grid: &BlockGrid) -> Self {
        Self {
            x0: 0,
            x1: grid.size_x() - 1,
            z0: 0,
            z1: grid.size_z() - 1,
        }
    }
}

#[inline]
fn face_texture(block: BlockType, dir: FaceDir) -> TextureId {
    match dir {
        FaceDir::PosY => block.top_texture(),
        FaceDir::NegY => block.bottom_texture(),
        _ => block.side_texture(),
    }
}

/// Append the visible faces of block (x, y, z). Returns how many triangles were added.
pub fn block_faces(grid: &BlockGrid, x: i32, y: i32, z: i32, out: &mut Vec<Face>) -> usize {
    let block = grid.get(x, y, z);
    if block.is_air() {
        return 0;
    }

    let (min, _) = grid.cell_bounds(x, y, z);
    let before = out.len();
    for dir in FaceDir::ALL {
        let n = dir.grid_offset();
        if grid.get(x + n.x, y + n.y, z + n.z).is_opaque() {
            continue;
        }
        out.extend_from_slice(&dir.faces(min, face_texture(block, dir)));
    }
    out.len() - before
}

/// Rebuild the face list for `window` from scratch.
pub fn build_faces(grid: &BlockGrid, window: MeshWindow) -> FaceList {
    count_call!(crate::perf::FUNCTION_COUNTERS.mesh_rebuild_calls);
    let start = Instant::now();

    let mut faces = Vec::new();
    if !window.is_empty() {
        for x in window.x0..=window.x1 {
            for z in window.z0..=window.z1 {
                for y in grid.y_min()..=grid.y_max() {
                    block_faces(grid, x, y, z, &mut faces);
                }
            }
        }
    }

    count_add!(crate::perf::FUNCTION_COUNTERS.faces_emitted, faces.len());
    tracing::debug!(
        faces = faces.len(),
        x = ?(window.x0, window.x1),
        z = ?(window.z0, window.z1),
        elapsed_us = start.elapsed().as_micros() as u64,
        "mesh rebuilt"
    );

    FaceList { faces, window }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isolated_block_has_twelve_triangles() {
        let mut grid = BlockGrid::new(8, 8, 0, 7);
        grid.set(4, 4, 4, BlockType::Stone);
        let list = build_faces(&grid, MeshWindow::full(&grid));
        assert_eq!(list.len(), 12);
        assert!(list.faces.iter().all(|f| f.texture == TextureId::Stone));
    }

    #[test]
    fn enclosed_block_contributes_nothing() {
        let mut grid = BlockGrid::new(8, 8, 0, 7);
        for x in 3..=5 {
            for y in 3..=5 {
                for z in 3..=5 {
                    grid.set(x, y, z, BlockType::Stone);
                }
            }
        }
        let mut out = Vec::new();
        assert_eq!(block_faces(&grid, 4, 4, 4, &mut out), 0);
        // 3x3x3 cube: 6 sides of 9 quads each
        assert_eq!(build_faces(&grid, MeshWindow::full(&grid)).len(), 6 * 9 * 2);
    }

    #[test]
    fn translucent_neighbours_expose_faces() {
        let mut grid = BlockGrid::new(8, 8, 0, 7);
        grid.set(4, 4, 4, BlockType::Stone);
        grid.set(5, 4, 4, BlockType::Glass);
        let mut out = Vec::new();
        assert_eq!(block_faces(&grid, 4, 4, 4, &mut out), 12, "glass does not hide stone");
        out.clear();
        assert_eq!(block_faces(&grid, 5, 4, 4, &mut out), 10, "stone hides one glass face");
    }

    #[test]
    fn grass_uses_top_side_and_bottom_textures() {
        let mut grid = BlockGrid::new(4, 4, 0, 3);
        grid.set(1, 1, 1, BlockType::Grass);
        let mut out = Vec::new();
        block_faces(&grid, 1, 1, 1, &mut out);
        // emission order: top, bottom, then four sides
        assert_eq!(out[0].texture, TextureId::GrassTop);
        assert_eq!(out[2].texture, TextureId::Dirt);
        assert!(out[4..].iter().all(|f| f.texture == TextureId::GrassSide));
        // top face sits on the cell's upper world y
        let (_, max) = grid.cell_bounds(1, 1, 1);
        assert!(out[0].vertices.iter().all(|v| v.position.y == max.y));
    }

    #[test]
    fn window_limits_the_meshed_columns() {
        let mut grid = BlockGrid::new(64, 64, 0, 3);
        grid.set(0, 1, 0, BlockType::Stone);
        grid.set(63, 1, 63, BlockType::Stone);
        let centre = grid.block_center(2, 0, 2);

        let window = MeshWindow::around(&grid, centre, 1);
        assert_eq!(window, MeshWindow { x0: 0, x1: 18, z0: 0, z1: 18 });
        let list = build_faces(&grid, window);
        assert_eq!(list.len(), 12, "only the block near the camera is meshed");
        assert_eq!(list.window, window);
    }
}
