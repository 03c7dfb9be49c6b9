/// Crate error type
/// Only fatal conditions are represented here; out-of-range voxels, culled
/// or degenerate triangles and malformed model lines are skipped silently.
use crate::rendering::texture::TextureId;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image {path:?}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("required texture {0:?} is unavailable")]
    MissingTexture(TextureId),
    #[error("invalid config {path:?}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid texture dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
}

pub type Result<T> = std::result::Result<T, EngineError>;
