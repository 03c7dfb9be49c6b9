/// Software rasterization pipeline
/// Transform, clip and project triangles, then fill them into a color + depth target
pub mod framebuffer;
pub mod pipeline;
pub mod rasterizer;
pub mod renderer;
pub mod sky;
pub mod texture;

pub use framebuffer::{Framebuffer, DEPTH_CLEAR};
pub use pipeline::{
    clip_polygon_near, is_backface, norm_to_screen, outcode, screen_to_norm, BackfaceReference,
    ClipVertex, GeometryPipeline, Outcome, Projected, ScreenVertex,
};
pub use rasterizer::{blend_argb, edge_function, BlendMode, PixelTarget, Rasterizer};
pub use renderer::{render_size, FrameRenderer, FrameStats};
pub use sky::draw_sky;
pub use texture::{Texture, TextureId, TextureTable, TEXTURE_COUNT};
