/// Engine configuration
/// Loaded once at startup from an optional TOML file. Every section and
/// field has a default, so partial files are valid.
use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub render: RenderConfig,
    pub world: WorldConfig,
    pub physics: PhysicsConfig,
    pub input: InputConfig,
    pub assets: AssetConfig,
}

impl EngineConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| EngineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| EngineError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|source| EngineError::Config {
            path: PathBuf::from("<inline>"),
            source,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub window_width: u32,
    pub window_height: u32,
    /// Window pixels per rendered pixel along each axis.
    pub render_scale: u32,
    pub fov_y: f32,
    pub near_plane: f32,
    pub far_plane: f32,
    pub wireframe: bool,
    /// Frames slower than this are logged at warn level.
    pub frame_budget_ms: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            window_width: 960,
            window_height: 540,
            render_scale: 2,
            fov_y: std::f32::consts::FRAC_PI_3,
            near_plane: 0.1,
            far_plane: 500.0,
            wireframe: false,
            frame_budget_ms: 50.0,
        }
    }
}

/// World configuration parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub size_x: i32,
    pub size_z: i32,
    pub y_min: i32,
    pub y_max: i32,
    /// Half-width of the remeshed window, in chunks.
    pub render_distance_chunks: i32,
    pub spawn: [f32; 3],
    pub terrain: TerrainConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            size_x: 16 * 32,
            size_z: 16 * 32,
            y_min: 0,
            y_max: 31,
            render_distance_chunks: 4,
            spawn: [0.0, 1.5, 6.0],
            terrain: TerrainConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    pub seed: u32,
    /// Noise input units per block.
    pub scale: f64,
    pub octaves: usize,
    pub lacunarity: f64,
    pub gain: f64,
    /// Grid row of the lowest possible surface (grid Y grows downward).
    pub stone_start: i32,
    pub height_amplitude: f32,
    pub dirt_depth: i32,
    pub tree_chance: f32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            scale: 0.08,
            octaves: 4,
            lacunarity: 2.0,
            gain: 0.5,
            stone_start: 12,
            height_amplitude: 8.0,
            dirt_depth: 3,
            tree_chance: 0.01,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravity: f32,
    pub player_radius: f32,
    pub player_height: f32,
    pub jump_velocity: f32,
    pub walk_speed: f32,
    pub fly_speed: f32,
    pub max_substep: f32,
    pub max_frame_dt: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 9.81,
            player_radius: 0.3,
            player_height: 1.6,
            jump_velocity: 5.0,
            walk_speed: 4.0,
            fly_speed: 20.0,
            max_substep: 0.02,
            max_frame_dt: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub mouse_sensitivity: f32,
    /// Arrow-key look rate in radians per second.
    pub look_speed: f32,
    /// Maximum block editing distance.
    pub reach: f32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            mouse_sensitivity: 0.0025,
            look_speed: 1.5,
            reach: 6.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Directory holding `<texture>.png` files; procedural textures when unset.
    pub texture_dir: Option<PathBuf>,
}
