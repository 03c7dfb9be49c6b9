/// Textures and the texture table
///
/// Pixels are stored as ARGB8888 (`0xAARRGGBB`). Faces refer to textures by
/// `TextureId`, an index into the `TextureTable` that owns the pixel data.
use crate::error::{EngineError, Result};
use std::path::Path;

/// Handle into the texture table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TextureId {
    Dirt = 0,
    Stone = 1,
    GrassSide = 2,
    GrassTop = 3,
    OakLogSide = 4,
    OakLogTop = 5,
    OakPlanks = 6,
    Cobblestone = 7,
    Leaves = 8,
    Glass = 9,
    Sky = 10,
}

pub const TEXTURE_COUNT: usize = 11;

const TEXTURE_FILE_NAMES: [&str; TEXTURE_COUNT] = [
    "dirt",
    "stone",
    "grass_side",
    "grass_top",
    "oak_log_side",
    "oak_log_top",
    "oak_planks",
    "cobblestone",
    "leaves",
    "glass",
    "sky",
];

impl TextureId {
    pub const ALL: [TextureId; TEXTURE_COUNT] = [
        TextureId::Dirt,
        TextureId::Stone,
        TextureId::GrassSide,
        TextureId::GrassTop,
        TextureId::OakLogSide,
        TextureId::OakLogTop,
        TextureId::OakPlanks,
        TextureId::Cobblestone,
        TextureId::Leaves,
        TextureId::Glass,
        TextureId::Sky,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// File stem looked up by `TextureTable::load_dir`.
    #[inline]
    pub const fn file_name(self) -> &'static str {
        TEXTURE_FILE_NAMES[self as usize]
    }

    /// Faces using a translucent texture are drawn after opaque ones, back to front.
    #[inline]
    pub const fn is_translucent(self) -> bool {
        matches!(self, TextureId::Leaves | TextureId::Glass)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Texture {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
}

impl Texture {
    /// Wrap an ARGB pixel array. Zero extents or a short pixel array are rejected.
    pub fn new(width: usize, height: usize, pixels: Vec<u32>) -> Result<Self> {
        if width == 0 || height == 0 || pixels.len() != width * height {
            return Err(EngineError::InvalidDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Single-colour texture.
    pub fn solid(color: u32) -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: vec![color],
        }
    }

    /// Decode an image file into ARGB pixels.
    pub fn from_image(path: &Path) -> Result<Self> {
        let rgba = image::open(path)
            .map_err(|source| EngineError::Image {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();
        let (width, height) = (rgba.width() as usize, rgba.height() as usize);
        let pixels = rgba
            .pixels()
            .map(|p| {
                let [r, g, b, a] = p.0;
                (a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32
            })
            .collect();
        Self::new(width, height, pixels)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Texel at integer coordinates, clamped to the texture.
    #[inline]
    pub fn texel(&self, x: usize, y: usize) -> u32 {
        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);
        self.pixels[y * self.width + x]
    }

    /// Nearest-neighbour sample; `u` and `v` are clamped to [0, 1].
    #[inline]
    pub fn sample(&self, u: f32, v: f32) -> u32 {
        let u = u.clamp(0.0, 1.0);
        let v = v.clamp(0.0, 1.0);
        let x = (u * (self.width - 1) as f32) as usize;
        let y = (v * (self.height - 1) as f32) as usize;
        self.texel(x, y)
    }

    /// Nearest-neighbour sample with `u` wrapping and `v` clamped (equirectangular maps).
    #[inline]
    pub fn sample_wrap_u(&self, u: f32, v: f32) -> u32 {
        let w = self.width as i32;
        let mut x = (u * (self.width - 1) as f32) as i32 % w;
        if x < 0 {
            x += w;
        }
        let y = ((v * (self.height - 1) as f32) as i32).clamp(0, self.height as i32 - 1);
        self.pixels[y as usize * self.width + x as usize]
    }
}

/// Owns one texture per `TextureId`.
#[derive(Clone, Debug)]
pub struct TextureTable {
    textures: Vec<Texture>,
}

impl TextureTable {
    /// Deterministic built-in textures; no files needed.
    pub fn procedural() -> Self {
        let textures = TextureId::ALL.iter().map(|&id| procedural_texture(id)).collect();
        Self { textures }
    }

    /// Load `<dir>/<file_name>.png` for every id. Any missing or undecodable
    /// file is fatal: the world cannot render without its textures.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(EngineError::Io {
                path: dir.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "texture directory"),
            });
        }

        let mut textures = Vec::with_capacity(TEXTURE_COUNT);
        for id in TextureId::ALL {
            let path = dir.join(format!("{}.png", id.file_name()));
            if !path.is_file() {
                return Err(EngineError::MissingTexture(id));
            }
            let texture = Texture::from_image(&path)?;
            tracing::debug!(
                texture = id.file_name(),
                width = texture.width(),
                height = texture.height(),
                "texture loaded"
            );
            textures.push(texture);
        }

        tracing::info!(dir = %dir.display(), count = textures.len(), "textures loaded");
        Ok(Self { textures })
    }

    #[inline]
    pub fn get(&self, id: TextureId) -> &Texture {
        &self.textures[id.index()]
    }

    /// Replace one texture, e.g. with a decoded override.
    pub fn insert(&mut self, id: TextureId, texture: Texture) {
        self.textures[id.index()] = texture;
    }

    #[inline]
    pub fn sky(&self) -> Option<&Texture> {
        self.textures.get(TextureId::Sky.index())
    }
}

impl Default for TextureTable {
    fn default() -> Self {
        Self::procedural()
    }
}

const PROCEDURAL_SIZE: usize = 16;

#[inline]
fn rgb(r: u8, g: u8, b: u8) -> u32 {
    argb(0xFF, r, g, b)
}

#[inline]
fn argb(a: u8, r: u8, g: u8, b: u8) -> u32 {
    (a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32
}

/// Scale the RGB channels of `color` by `f`, keeping alpha.
#[inline]
fn shade(color: u32, f: f32) -> u32 {
    let ch = |shift: u32| (((color >> shift) & 0xFF) as f32 * f).clamp(0.0, 255.0) as u32;
    (color & 0xFF00_0000) | ch(16) << 16 | ch(8) << 8 | ch(0)
}

/// Per-texel noise in [0, 1), fixed per texture.
#[inline]
fn texel_noise(seed: u32, x: usize, y: usize) -> f32 {
    let mut h = seed
        .wrapping_mul(1_103_515_245)
        .wrapping_add((x as u32).wrapping_mul(374_761_393))
        .wrapping_add((y as u32).wrapping_mul(668_265_263));
    h = (h ^ (h >> 13)).wrapping_mul(1_274_126_177);
    h ^= h >> 16;
    (h & 0xFFFF) as f32 / 65_536.0
}

fn noisy(seed: u32, base: u32, spread: f32) -> Texture {
    build(PROCEDURAL_SIZE, PROCEDURAL_SIZE, |x, y| {
        shade(base, 1.0 - spread + 2.0 * spread * texel_noise(seed, x, y))
    })
}

fn build(width: usize, height: usize, f: impl Fn(usize, usize) -> u32) -> Texture {
    let pixels = (0..height)
        .flat_map(|y| (0..width).map(move |x| (x, y)))
        .map(|(x, y)| f(x, y))
        .collect();
    Texture {
        width,
        height,
        pixels,
    }
}

fn procedural_texture(id: TextureId) -> Texture {
    let seed = id as u32 + 1;
    let dirt = rgb(134, 96, 67);
    let grass = rgb(95, 159, 53);
    let bark = rgb(104, 83, 50);
    match id {
        TextureId::Dirt => noisy(seed, dirt, 0.15),
        TextureId::Stone => noisy(seed, rgb(125, 125, 125), 0.12),
        TextureId::GrassTop => noisy(seed, grass, 0.15),
        TextureId::GrassSide => build(PROCEDURAL_SIZE, PROCEDURAL_SIZE, |x, y| {
            let n = texel_noise(seed, x, y);
            let fringe = 3 + (texel_noise(seed ^ 0x55, x, 0) * 2.0) as usize;
            let base = if y < fringe { grass } else { dirt };
            shade(base, 0.85 + 0.3 * n)
        }),
        TextureId::OakLogSide => build(PROCEDURAL_SIZE, PROCEDURAL_SIZE, |x, y| {
            let stripe = if x % 4 == 0 { 0.75 } else { 1.0 };
            shade(bark, stripe * (0.9 + 0.2 * texel_noise(seed, x, y)))
        }),
        TextureId::OakLogTop => build(PROCEDURAL_SIZE, PROCEDURAL_SIZE, |x, y| {
            let c = (PROCEDURAL_SIZE as f32 - 1.0) * 0.5;
            let r = ((x as f32 - c).powi(2) + (y as f32 - c).powi(2)).sqrt();
            if r > 6.5 {
                shade(bark, 0.9)
            } else {
                let ring = if (r as usize) % 2 == 0 { 1.0 } else { 0.85 };
                shade(rgb(176, 143, 88), ring)
            }
        }),
        TextureId::OakPlanks => build(PROCEDURAL_SIZE, PROCEDURAL_SIZE, |x, y| {
            let seam = y % 4 == 3 || (x + (y / 4) * 5) % 8 == 0;
            let f = if seam { 0.7 } else { 0.92 + 0.16 * texel_noise(seed, x, y) };
            shade(rgb(162, 130, 78), f)
        }),
        TextureId::Cobblestone => build(PROCEDURAL_SIZE, PROCEDURAL_SIZE, |x, y| {
            let cell = texel_noise(seed, x / 4, y / 4);
            let mortar = x % 4 == 0 || y % 4 == 0;
            let f = if mortar { 0.6 } else { 0.8 + 0.35 * cell };
            shade(rgb(122, 122, 122), f)
        }),
        TextureId::Leaves => build(PROCEDURAL_SIZE, PROCEDURAL_SIZE, |x, y| {
            let n = texel_noise(seed, x, y);
            if n < 0.2 {
                0
            } else {
                let base = shade(rgb(58, 120, 38), 0.75 + 0.4 * n);
                (base & 0x00FF_FFFF) | 0xD0u32 << 24
            }
        }),
        TextureId::Glass => build(PROCEDURAL_SIZE, PROCEDURAL_SIZE, |x, y| {
            let edge = x == 0 || y == 0 || x == PROCEDURAL_SIZE - 1 || y == PROCEDURAL_SIZE - 1;
            if edge {
                argb(0xFF, 200, 220, 230)
            } else if x == y + 3 || x + 1 == y + 3 {
                argb(0x80, 255, 255, 255)
            } else {
                argb(0x30, 190, 215, 235)
            }
        }),
        TextureId::Sky => build(64, 32, |_, y| {
            // zenith to horizon gradient; everything below the horizon is haze
            let t = (y as f32 / 15.5).min(1.0);
            let lerp = |a: f32, b: f32| (a + (b - a) * t) as u8;
            rgb(lerp(70.0, 170.0), lerp(120.0, 200.0), lerp(200.0, 235.0))
        }),
    }
}
