/// Main application entry point
/// Handles window creation, input, and render loop
use anyhow::Context as _;
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use soft_voxel::*;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::{
    event::*,
    event_loop::{ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorGrabMode, Window, WindowBuilder},
};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser)]
#[command(name = "soft_voxel", about = "Software-rasterized voxel sandbox")]
struct Cli {
    /// TOML config file; defaults apply to anything it leaves out
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Subcommand)]
enum Mode {
    /// Walk around the generated voxel world (default)
    Voxel,
    /// Spin a single OBJ model
    Model {
        /// OBJ file to load; a unit cube when omitted
        #[arg(long)]
        obj: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::default(),
    };

    let (title, scene): (&str, Box<dyn Scene>) = match cli.mode.unwrap_or(Mode::Voxel) {
        Mode::Voxel => (
            "Soft Voxel",
            Box::new(Game::new(config.clone()).context("initializing world")?),
        ),
        Mode::Model { obj } => {
            let model = match obj {
                Some(path) => ObjModel::load(&path)
                    .with_context(|| format!("loading model {}", path.display()))?,
                None => ObjModel::cube(),
            };
            ("Soft Voxel - model", Box::new(ModelViewer::new(config.clone(), model)))
        }
    };

    tracing::info!("controls: WASD move, Space jump/up, LCtrl down, arrows look, Q grab mouse");
    tracing::info!("controls: LMB break, RMB place, 1-8/wheel select, V noclip, R wireframe, Esc quit");

    run(config, title, scene)
}

fn run(config: EngineConfig, title: &str, mut scene: Box<dyn Scene>) -> anyhow::Result<()> {
    let event_loop = EventLoop::new().context("creating event loop")?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(title)
            .with_inner_size(winit::dpi::PhysicalSize::new(
                config.render.window_width,
                config.render.window_height,
            ))
            .build(&event_loop)
            .context("creating window")?,
    );

    let context = softbuffer::Context::new(window.clone())
        .map_err(|e| anyhow::anyhow!("creating softbuffer context: {e}"))?;
    let mut surface = softbuffer::Surface::new(&context, window.clone())
        .map_err(|e| anyhow::anyhow!("creating softbuffer surface: {e}"))?;

    let size = window.inner_size();
    scene.resize(size.width, size.height);

    let mut input = InputState::new();
    let mut mouse_grabbed = false;
    let mut last_frame = Instant::now();
    let mut frame_count = 0u32;
    let mut fps_timer = Instant::now();

    event_loop.run(move |event, elwt| {
        elwt.set_control_flow(ControlFlow::Poll);

        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => elwt.exit(),
                WindowEvent::Resized(new_size) => {
                    scene.resize(new_size.width.max(1), new_size.height.max(1));
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    let pressed = event.state == ElementState::Pressed;
                    let PhysicalKey::Code(keycode) = event.physical_key else {
                        return;
                    };
                    match keycode {
                        KeyCode::KeyW => input.forward = pressed,
                        KeyCode::KeyS => input.backward = pressed,
                        KeyCode::KeyA => input.left = pressed,
                        KeyCode::KeyD => input.right = pressed,
                        KeyCode::Space => input.up = pressed,
                        KeyCode::ControlLeft => input.down = pressed,
                        KeyCode::ArrowLeft => input.look_left = pressed,
                        KeyCode::ArrowRight => input.look_right = pressed,
                        KeyCode::ArrowUp => input.look_up = pressed,
                        KeyCode::ArrowDown => input.look_down = pressed,
                        KeyCode::KeyQ if pressed && !event.repeat => {
                            mouse_grabbed = !mouse_grabbed;
                            set_mouse_grab(&window, mouse_grabbed);
                        }
                        KeyCode::KeyV if pressed && !event.repeat => {
                            scene.handle(Action::ToggleNoclip)
                        }
                        KeyCode::KeyR if pressed && !event.repeat => {
                            scene.handle(Action::ToggleWireframe)
                        }
                        KeyCode::Escape if pressed => elwt.exit(),
                        code if pressed => {
                            if let Some(block) = hotbar_slot(code) {
                                scene.handle(Action::SelectBlock(block));
                            }
                        }
                        _ => {}
                    }
                }
                WindowEvent::MouseInput {
                    state: ElementState::Pressed,
                    button,
                    ..
                } => match button {
                    MouseButton::Left => scene.handle(Action::BreakBlock),
                    MouseButton::Right => scene.handle(Action::PlaceBlock),
                    _ => {}
                },
                WindowEvent::MouseWheel { delta, .. } => {
                    let amount = match delta {
                        MouseScrollDelta::LineDelta(_, y) => y,
                        MouseScrollDelta::PixelDelta(p) => p.y as f32,
                    };
                    if amount != 0.0 {
                        scene.handle(Action::CycleBlock {
                            forward: amount < 0.0,
                        });
                    }
                }
                WindowEvent::RedrawRequested => {
                    let now = Instant::now();
                    let dt = (now - last_frame).as_secs_f32();
                    last_frame = now;

                    let stats = scene.frame(&mut input, dt);

                    let size = window.inner_size();
                    let (Some(width), Some(height)) =
                        (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
                    else {
                        return;
                    };
                    if let Err(err) = present(&mut surface, scene.renderer(), width, height) {
                        tracing::error!(error = %err, "present failed");
                        elwt.exit();
                        return;
                    }

                    frame_count += 1;
                    if fps_timer.elapsed().as_secs() >= 1 {
                        tracing::info!(
                            fps = frame_count,
                            rendered = stats.rendered_faces,
                            culled = stats.culled_faces,
                            "frame stats"
                        );
                        frame_count = 0;
                        fps_timer = Instant::now();
                    }
                }
                _ => {}
            },
            Event::DeviceEvent {
                event: DeviceEvent::MouseMotion { delta },
                ..
            } if mouse_grabbed => {
                input.mouse_dx += delta.0 as f32;
                input.mouse_dy += delta.1 as f32;
            }
            Event::AboutToWait => window.request_redraw(),
            _ => {}
        }
    })?;

    #[cfg(feature = "profiling")]
    FUNCTION_COUNTERS.snapshot().log_report();

    Ok(())
}

type WindowSurface = softbuffer::Surface<Arc<Window>, Arc<Window>>;

fn present(
    surface: &mut WindowSurface,
    renderer: &FrameRenderer,
    width: NonZeroU32,
    height: NonZeroU32,
) -> std::result::Result<(), softbuffer::SoftBufferError> {
    surface.resize(width, height)?;
    let mut buffer = surface.buffer_mut()?;
    renderer.present_into(&mut buffer, width.get() as usize, height.get() as usize);
    buffer.present()
}

fn set_mouse_grab(window: &Window, grab: bool) {
    let result = if grab {
        window
            .set_cursor_grab(CursorGrabMode::Confined)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Locked))
    } else {
        window.set_cursor_grab(CursorGrabMode::None)
    };
    if let Err(err) = result {
        tracing::warn!(error = %err, "cursor grab unavailable");
    }
    window.set_cursor_visible(!grab);
}

fn hotbar_slot(code: KeyCode) -> Option<BlockType> {
    let slot = match code {
        KeyCode::Digit1 => 0,
        KeyCode::Digit2 => 1,
        KeyCode::Digit3 => 2,
        KeyCode::Digit4 => 3,
        KeyCode::Digit5 => 4,
        KeyCode::Digit6 => 5,
        KeyCode::Digit7 => 6,
        KeyCode::Digit8 => 7,
        _ => return None,
    };
    BlockType::PLACEABLE.get(slot).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digit_keys_map_to_the_hotbar_in_order() {
        assert_eq!(hotbar_slot(KeyCode::Digit1), Some(BlockType::PLACEABLE[0]));
        assert_eq!(hotbar_slot(KeyCode::Digit8), Some(BlockType::PLACEABLE[7]));
        assert_eq!(hotbar_slot(KeyCode::Digit9), None);
        assert_eq!(hotbar_slot(KeyCode::KeyW), None);
    }

    #[test]
    fn subcommands_parse() {
        let cli = Cli::parse_from(["soft_voxel", "--verbose", "model", "--obj", "cube.obj"]);
        assert!(cli.verbose);
        assert!(matches!(cli.mode, Some(Mode::Model { obj: Some(ref p) }) if p.ends_with("cube.obj")));

        let cli = Cli::parse_from(["soft_voxel"]);
        assert!(cli.mode.is_none() && cli.config.is_none());
    }
}
