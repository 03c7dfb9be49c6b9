/// World model: block grid, player and the face list rendered from them
/// Handles terrain generation, block editing, player movement and the
/// chunk-crossing remesh trigger
use crate::camera::{Camera, InputState};
use crate::config::{EngineConfig, PhysicsConfig};
use crate::meshing::{build_faces, FaceList, MeshWindow};
use crate::physics::{raycast, MoveIntent, PlayerBody, RayHit};
use crate::voxel::{BlockGrid, BlockType, TerrainGenerator, CHUNK_SIZE};
use glam::{IVec2, IVec3, Vec3};

/// Owns everything the simulation mutates between frames.
pub struct World {
    grid: BlockGrid,
    pub camera: Camera,
    body: PlayerBody,
    faces: FaceList,
    mesh_dirty: bool,
    /// Chunk column of the camera at the last check
    last_camera_chunk: Option<IVec2>,
    selected: BlockType,
    noclip: bool,
    render_distance_chunks: i32,
    reach: f32,
}

impl World {
    /// Generate terrain per `config.world` and spawn the camera.
    pub fn new(config: &EngineConfig, aspect_ratio: f32) -> Self {
        let wc = &config.world;
        let mut grid = BlockGrid::new(wc.size_x, wc.size_z, wc.y_min, wc.y_max);
        TerrainGenerator::new(wc.terrain.clone()).generate(&mut grid);
        Self::with_grid(grid, config, aspect_ratio)
    }

    /// Wrap an existing grid; the camera starts at `config.world.spawn`.
    pub fn with_grid(grid: BlockGrid, config: &EngineConfig, aspect_ratio: f32) -> Self {
        let mut camera = Camera::new(Vec3::from_array(config.world.spawn), aspect_ratio);
        camera.fov = config.render.fov_y;
        camera.near = config.render.near_plane;
        camera.far = config.render.far_plane;
        camera.mouse_sensitivity = config.input.mouse_sensitivity;

        Self {
            grid,
            camera,
            body: PlayerBody::new(config.physics.clone()),
            faces: FaceList::default(),
            mesh_dirty: true,
            last_camera_chunk: None,
            selected: BlockType::Dirt,
            noclip: false,
            render_distance_chunks: config.world.render_distance_chunks,
            reach: config.input.reach,
        }
    }

    #[inline]
    pub fn grid(&self) -> &BlockGrid {
        &self.grid
    }

    #[inline]
    pub fn faces(&self) -> &FaceList {
        &self.faces
    }

    #[inline]
    pub fn mesh_dirty(&self) -> bool {
        self.mesh_dirty
    }

    pub fn mark_mesh_dirty(&mut self) {
        self.mesh_dirty = true;
    }

    #[inline]
    pub fn body(&self) -> &PlayerBody {
        &self.body
    }

    pub fn physics(&self) -> &PhysicsConfig {
        self.body.config()
    }

    #[inline]
    pub fn selected(&self) -> BlockType {
        self.selected
    }

    #[inline]
    pub fn noclip(&self) -> bool {
        self.noclip
    }

    #[inline]
    pub fn render_distance(&self) -> i32 {
        self.render_distance_chunks
    }

    /// Update render distance at runtime (in chunks).
    pub fn set_render_distance(&mut self, chunks: i32) {
        let chunks = chunks.max(1);
        if chunks != self.render_distance_chunks {
            self.render_distance_chunks = chunks;
            self.mesh_dirty = true;
        }
    }

    #[inline]
    pub fn get_block(&self, x: i32, y: i32, z: i32) -> BlockType {
        self.grid.get(x, y, z)
    }

    /// Write a block and mark the mesh dirty. Horizontal out-of-range writes
    /// are ignored and return false.
    pub fn set_block(&mut self, x: i32, y: i32, z: i32, block: BlockType) -> bool {
        let changed = self.grid.set(x, y, z, block);
        if changed {
            self.mesh_dirty = true;
        }
        changed
    }

    /// Window of columns meshed around the current camera position.
    pub fn mesh_window(&self) -> MeshWindow {
        MeshWindow::around(&self.grid, self.camera.position, self.render_distance_chunks)
    }

    /// Rebuild the face list unconditionally.
    pub fn rebuild_mesh(&mut self) {
        self.faces = build_faces(&self.grid, self.mesh_window());
        self.mesh_dirty = false;
    }

    /// Rebuild only when dirty. Returns whether a rebuild happened.
    pub fn ensure_mesh(&mut self) -> bool {
        if !self.mesh_dirty {
            return false;
        }
        self.rebuild_mesh();
        true
    }

    /// Chunk column holding the camera.
    pub fn camera_chunk(&self) -> IVec2 {
        let cell = self.grid.world_to_cell(self.camera.position);
        IVec2::new(cell.x.div_euclid(CHUNK_SIZE), cell.z.div_euclid(CHUNK_SIZE))
    }

    /// Mark the mesh dirty when the camera entered a new chunk column.
    /// Returns true on a crossing.
    pub fn update_chunk(&mut self) -> bool {
        let chunk = self.camera_chunk();
        if self.last_camera_chunk == Some(chunk) {
            return false;
        }
        tracing::debug!(chunk = ?chunk, "camera entered chunk");
        self.last_camera_chunk = Some(chunk);
        self.mesh_dirty = true;
        true
    }

    /// Move the player for one frame: noclip flight, or walking physics.
    pub fn step_player(&mut self, input: &InputState, dt: f32) {
        if self.noclip {
            let forward = self.camera.forward();
            let right = self.camera.right();
            let mut dir = input.move_direction(forward, right);
            if input.up {
                dir += Vec3::Y;
            }
            if input.down {
                dir -= Vec3::Y;
            }
            self.body.fly(&mut self.camera.position, dir, dt);
            return;
        }

        let intent = MoveIntent {
            direction: input.move_direction(self.camera.forward_flat(), self.camera.right()),
            jump: input.up,
        };
        self.body
            .step(&self.grid, &mut self.camera.position, &intent, dt);
    }

    /// Block under the crosshair within reach.
    pub fn target(&self) -> Option<RayHit> {
        raycast(&self.grid, self.camera.position, self.camera.forward(), self.reach)
    }

    /// Remove the targeted block. Returns its cell.
    pub fn break_block(&mut self) -> Option<IVec3> {
        let hit = self.target()?;
        let cell = hit.block;
        self.set_block(cell.x, cell.y, cell.z, BlockType::Air);
        Some(cell)
    }

    /// Place the selected block against the targeted face if that cell is empty.
    pub fn place_block(&mut self) -> Option<IVec3> {
        let hit = self.target()?;
        let cell = hit.adjacent();
        if !self.grid.get_at(cell).is_air() {
            return None;
        }
        self.set_block(cell.x, cell.y, cell.z, self.selected)
            .then_some(cell)
    }

    pub fn select_block(&mut self, block: BlockType) {
        if !block.is_air() {
            self.selected = block;
        }
    }

    pub fn cycle_selected(&mut self, forward: bool) {
        self.selected = self.selected.cycle(forward);
    }

    /// Toggle flight; either way the body starts at rest on the ground.
    pub fn toggle_noclip(&mut self) -> bool {
        self.noclip = !self.noclip;
        self.body.velocity = Vec3::ZERO;
        self.body.grounded = true;
        self.noclip
    }
}
