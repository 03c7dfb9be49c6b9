/// Frame loop contexts
///
/// `Game` runs the voxel world; `ModelViewer` spins a single OBJ model. Both
/// turn one input snapshot plus a time step into one rendered frame and are
/// driven through the `Scene` trait by the presentation layer.
use crate::camera::{Camera, InputState};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::model::{ModelRenderer, ObjModel};
use crate::perf::PerfTimer;
use crate::rendering::{FrameRenderer, FrameStats, TextureTable};
use crate::voxel::BlockType;
use crate::world::World;
use glam::Vec3;
use std::time::Instant;

/// Discrete input events, as opposed to the held keys in `InputState`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Action {
    BreakBlock,
    PlaceBlock,
    SelectBlock(BlockType),
    CycleBlock { forward: bool },
    ToggleNoclip,
    ToggleWireframe,
}

pub trait Scene {
    /// Simulate `dt` seconds and render one frame.
    fn frame(&mut self, input: &mut InputState, dt: f32) -> FrameStats;
    /// Window size changed.
    fn resize(&mut self, window_width: u32, window_height: u32);
    fn handle(&mut self, action: Action);
    fn renderer(&self) -> &FrameRenderer;
}

/// Voxel world plus everything needed to draw it.
pub struct Game {
    pub world: World,
    renderer: FrameRenderer,
    textures: TextureTable,
    config: EngineConfig,
}

impl Game {
    /// Load textures and generate the world. Texture failures are fatal.
    pub fn new(config: EngineConfig) -> Result<Self> {
        let textures = match &config.assets.texture_dir {
            Some(dir) => TextureTable::load_dir(dir)?,
            None => TextureTable::procedural(),
        };
        Ok(Self::with_textures(config, textures))
    }

    pub fn with_textures(config: EngineConfig, textures: TextureTable) -> Self {
        let render = &config.render;
        let mut renderer =
            FrameRenderer::new(render.window_width, render.window_height, render.render_scale);
        renderer.set_wireframe(render.wireframe);

        let start = Instant::now();
        let world = World::new(&config, renderer.aspect_ratio());
        tracing::info!(
            size_x = config.world.size_x,
            size_z = config.world.size_z,
            solid = world.grid().solid_count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "world generated"
        );

        Self {
            world,
            renderer,
            textures,
            config,
        }
    }

    /// Replace the world, keeping renderer and textures.
    pub fn with_world(mut self, world: World) -> Self {
        self.world = world;
        self.world.camera.set_aspect_ratio(self.renderer.aspect_ratio());
        self
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[inline]
    pub fn textures(&self) -> &TextureTable {
        &self.textures
    }

    pub fn toggle_wireframe(&mut self) -> bool {
        self.renderer.toggle_wireframe()
    }

    fn look(&mut self, input: &mut InputState, dt: f32) {
        let camera = &mut self.world.camera;
        camera.turn(input, self.config.input.look_speed, dt);
        let (dx, dy) = input.take_mouse_delta();
        camera.rotate(dx, dy);
    }
}

impl Scene for Game {
    fn frame(&mut self, input: &mut InputState, dt: f32) -> FrameStats {
        let start = Instant::now();
        let dt = dt.clamp(0.0, self.config.physics.max_frame_dt);

        self.look(input, dt);
        self.world.step_player(input, dt);
        self.world.update_chunk();

        self.renderer.begin_frame(&self.textures, &self.world.camera);
        self.world.ensure_mesh();
        let stats = {
            let _timer = PerfTimer::new("frame_draw");
            self.renderer
                .render_faces(self.world.faces().as_slice(), &self.textures, &self.world.camera)
        };
        self.renderer.draw_crosshair();

        let elapsed_ms = start.elapsed().as_secs_f32() * 1000.0;
        if elapsed_ms > self.config.render.frame_budget_ms {
            tracing::warn!(
                elapsed_ms,
                budget_ms = self.config.render.frame_budget_ms,
                "frame over budget"
            );
        }
        tracing::trace!(
            culled = stats.culled_faces,
            rendered = stats.rendered_faces,
            faces = self.world.faces().len(),
            "frame"
        );
        stats
    }

    /// Recompute the render resolution and remesh on the next frame.
    fn resize(&mut self, window_width: u32, window_height: u32) {
        let (w, h) = self.renderer.resize(window_width, window_height);
        self.world.camera.set_aspect_ratio(w as f32 / h as f32);
        self.world.mark_mesh_dirty();
    }

    fn handle(&mut self, action: Action) {
        match action {
            Action::BreakBlock => {
                if let Some(cell) = self.world.break_block() {
                    tracing::debug!(cell = ?cell, "block broken");
                }
            }
            Action::PlaceBlock => {
                if let Some(cell) = self.world.place_block() {
                    tracing::debug!(cell = ?cell, block = self.world.selected().name(), "block placed");
                }
            }
            Action::SelectBlock(block) => self.world.select_block(block),
            Action::CycleBlock { forward } => self.world.cycle_selected(forward),
            Action::ToggleNoclip => {
                let on = self.world.toggle_noclip();
                tracing::info!(noclip = on, "noclip toggled");
            }
            Action::ToggleWireframe => {
                let on = self.toggle_wireframe();
                tracing::info!(wireframe = on, "wireframe toggled");
            }
        }
    }

    fn renderer(&self) -> &FrameRenderer {
        &self.renderer
    }
}

/// Free-flying camera around a spinning model.
pub struct ModelViewer {
    pub camera: Camera,
    model: ObjModel,
    model_renderer: ModelRenderer,
    renderer: FrameRenderer,
    config: EngineConfig,
    angle: f32,
}

impl ModelViewer {
    /// Model mode camera speed in units per second.
    pub const MOVE_SPEED: f32 = 2.5;
    /// Model spin rate in radians per second.
    pub const SPIN_RATE: f32 = 1.0;
    pub const BACKGROUND: u32 = 0xFF00_0000;

    pub fn new(config: EngineConfig, model: ObjModel) -> Self {
        let render = &config.render;
        let mut renderer =
            FrameRenderer::new(render.window_width, render.window_height, render.render_scale);
        renderer.set_wireframe(render.wireframe);

        let distance = (model.radius() * 2.5).max(2.0);
        let mut camera = Camera::new(Vec3::new(0.0, 0.0, distance), renderer.aspect_ratio());
        camera.fov = render.fov_y;
        camera.near = render.near_plane;
        camera.far = distance + model.radius() * 4.0 + 100.0;
        camera.mouse_sensitivity = config.input.mouse_sensitivity;

        Self {
            camera,
            model,
            model_renderer: ModelRenderer::new(),
            renderer,
            config,
            angle: 0.0,
        }
    }

    #[inline]
    pub fn model(&self) -> &ObjModel {
        &self.model
    }
}

impl Scene for ModelViewer {
    fn frame(&mut self, input: &mut InputState, dt: f32) -> FrameStats {
        let dt = dt.clamp(0.0, self.config.physics.max_frame_dt);
        self.camera.turn(input, self.config.input.look_speed, dt);
        let (dx, dy) = input.take_mouse_delta();
        self.camera.rotate(dx, dy);

        let mut dir = input.move_direction(self.camera.forward(), self.camera.right());
        if input.up {
            dir += Vec3::Y;
        }
        if input.down {
            dir -= Vec3::Y;
        }
        self.camera.position += dir * Self::MOVE_SPEED * dt;
        self.angle += Self::SPIN_RATE * dt;

        self.renderer.clear_frame(Self::BACKGROUND);
        let stats = self
            .model_renderer
            .render(&mut self.renderer, &self.model, &self.camera, self.angle);
        tracing::trace!(
            culled = stats.culled_faces,
            rendered = stats.rendered_faces,
            "frame"
        );
        stats
    }

    fn resize(&mut self, window_width: u32, window_height: u32) {
        let (w, h) = self.renderer.resize(window_width, window_height);
        self.camera.set_aspect_ratio(w as f32 / h as f32);
    }

    fn handle(&mut self, action: Action) {
        if action == Action::ToggleWireframe {
            let on = self.renderer.toggle_wireframe();
            tracing::info!(wireframe = on, "wireframe toggled");
        }
    }

    fn renderer(&self) -> &FrameRenderer {
        &self.renderer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorldConfig;

    fn small_config() -> EngineConfig {
        let mut config = EngineConfig {
            world: WorldConfig {
                size_x: 48,
                size_z: 48,
                y_max: 23,
                render_distance_chunks: 1,
                ..Default::default()
            },
            ..Default::default()
        };
        config.render.window_width = 160;
        config.render.window_height = 120;
        config
    }

    #[test]
    fn frame_meshes_and_renders_the_world() {
        let mut game = Game::new(small_config()).unwrap();
        let mut input = InputState::default();
        // look down at the terrain
        game.world.camera.pitch = -1.0;
        let stats = game.frame(&mut input, 1.0 / 60.0);
        assert!(!game.world.mesh_dirty());
        assert!(!game.world.faces().is_empty());
        assert!(stats.rendered_faces > 0);
        assert_eq!(game.renderer().size(), (80, 60));
    }

    #[test]
    fn resize_marks_mesh_dirty_and_updates_aspect() {
        let mut game = Game::new(small_config()).unwrap();
        let mut input = InputState::default();
        game.frame(&mut input, 0.01);
        game.resize(400, 100);
        assert!(game.world.mesh_dirty());
        assert_eq!(game.renderer().size(), (200, 50));
        assert!((game.world.camera.aspect_ratio - 4.0).abs() < 1e-6);
    }

    #[test]
    fn mouse_delta_is_consumed_by_the_frame() {
        let mut game = Game::new(small_config()).unwrap();
        let mut input = InputState {
            mouse_dx: 100.0,
            ..Default::default()
        };
        let yaw = game.world.camera.yaw;
        game.frame(&mut input, 0.01);
        assert!(game.world.camera.yaw > yaw);
        assert_eq!(input.mouse_dx, 0.0);
    }

    #[test]
    fn actions_reach_the_world_and_renderer() {
        let mut game = Game::new(small_config()).unwrap();
        game.handle(Action::SelectBlock(BlockType::Glass));
        assert_eq!(game.world.selected(), BlockType::Glass);
        game.handle(Action::ToggleNoclip);
        assert!(game.world.noclip());
        game.handle(Action::ToggleWireframe);
        assert!(game.renderer().wireframe());
    }

    #[test]
    fn missing_texture_dir_is_fatal() {
        let mut config = small_config();
        config.assets.texture_dir = Some("definitely/not/here".into());
        assert!(Game::new(config).is_err());
    }

    #[test]
    fn model_viewer_renders_the_cube() {
        let mut config = small_config();
        config.render.window_width = 128;
        config.render.window_height = 128;
        let mut viewer = ModelViewer::new(config, ObjModel::cube());
        let mut input = InputState::default();
        let stats = viewer.frame(&mut input, 0.0);
        assert!(stats.rendered_faces >= 2);
        assert_eq!(viewer.frame(&mut input, 0.0), stats, "stats reset every frame");
        let fb = viewer.renderer().framebuffer();
        assert_eq!(fb.pixel(32, 32), Some(crate::model::UNTEXTURED_COLOR));
        assert_eq!(fb.pixel(0, 0), Some(ModelViewer::BACKGROUND));
    }
}
