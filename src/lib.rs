/// Soft Voxel - CPU software rasterizer with a dense voxel world
/// Clipping, perspective-correct texturing, meshing, collision and raycasting
pub mod camera;
pub mod config;
pub mod error;
pub mod game;
pub mod math;
pub mod meshing;
pub mod model;
pub mod perf;
pub mod physics;
pub mod rendering;
pub mod voxel;
pub mod world;

pub use camera::{Camera, InputState};
pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use game::{Action, Game, ModelViewer, Scene};
pub use meshing::{build_faces, Face, FaceDir, FaceList, MeshWindow, Vertex};
pub use model::{ModelRenderer, ObjModel};
pub use perf::{CounterSnapshot, FunctionCounters, PerfTimer, FUNCTION_COUNTERS};
pub use physics::{raycast, Aabb, MoveIntent, PlayerBody, RayHit};
pub use rendering::{
    BlendMode, FrameRenderer, FrameStats, Framebuffer, GeometryPipeline, Outcome, Rasterizer,
    Texture, TextureId, TextureTable,
};
pub use voxel::{BlockGrid, BlockType, TerrainGenerator, CHUNK_SIZE};
pub use world::World;
