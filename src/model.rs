/// Wavefront OBJ models and the model render path
///
/// Supports `v`, `vt`, `f` (positive or negative indices, `v`, `v/t`, `v//n`,
/// `v/t/n`), `mtllib`, `usemtl`, `newmtl` and `map_Kd`. Polygons are fan
/// triangulated from their first vertex. Lines that fail to parse are skipped.
use crate::camera::Camera;
use crate::error::{EngineError, Result};
use crate::math;
use crate::meshing::{FaceDir, Vertex};
use crate::rendering::{BackfaceReference, BlendMode, FrameRenderer, FrameStats, GeometryPipeline, Texture};
use glam::{Mat4, Vec2, Vec3};
use std::path::{Path, PathBuf};

/// Colour of faces whose material has no diffuse map.
pub const UNTEXTURED_COLOR: u32 = 0xFFC8_C8C8;

#[derive(Debug, Clone)]
pub struct ObjMaterial {
    pub name: String,
    pub diffuse: Option<Texture>,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ObjTriangle {
    pub vertices: [Vertex; 3],
    /// Index into `ObjModel::materials`.
    pub material: Option<usize>,
}

/// Resolves the external files an OBJ document refers to.
pub trait MaterialSource {
    /// Text of a material library named by `mtllib`.
    fn read_library(&self, name: &Path) -> Result<String>;
    /// Diffuse texture named by `map_Kd`, relative to the library that names it.
    fn load_texture(&self, name: &Path) -> Result<Texture>;
}

/// Material source that ignores every reference.
pub struct NoMaterials;

impl MaterialSource for NoMaterials {
    fn read_library(&self, _name: &Path) -> Result<String> {
        Ok(String::new())
    }

    fn load_texture(&self, name: &Path) -> Result<Texture> {
        Err(EngineError::Io {
            path: name.to_path_buf(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        })
    }
}

/// Resolves references relative to a directory on disk.
pub struct FsMaterialSource {
    base_dir: PathBuf,
}

impl FsMaterialSource {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }
}

impl MaterialSource for FsMaterialSource {
    fn read_library(&self, name: &Path) -> Result<String> {
        let path = self.base_dir.join(name);
        std::fs::read_to_string(&path).map_err(|source| EngineError::Io { path, source })
    }

    fn load_texture(&self, name: &Path) -> Result<Texture> {
        Texture::from_image(&self.base_dir.join(name))
    }
}

#[derive(Debug, Clone, Default)]
pub struct ObjModel {
    pub triangles: Vec<ObjTriangle>,
    pub materials: Vec<ObjMaterial>,
    /// (min, max) over every `v` line; `None` for a model without vertices.
    pub bounds: Option<(Vec3, Vec3)>,
}

/// Resolve a 1-based or negative (relative to the end) OBJ index.
#[inline]
fn resolve_index(raw: i64, count: usize) -> Option<usize> {
    let idx = if raw < 0 { count as i64 + raw } else { raw - 1 };
    (idx >= 0 && (idx as usize) < count).then_some(idx as usize)
}

/// Split `v`, `v/t`, `v//n` or `v/t/n` into raw position and uv indices.
fn parse_corner(token: &str) -> Option<(i64, Option<i64>)> {
    let mut parts = token.split('/');
    let v = parts.next()?.parse::<i64>().ok()?;
    let t = match parts.next() {
        None | Some("") => None,
        Some(t) => Some(t.parse::<i64>().ok()?),
    };
    Some((v, t))
}

fn parse_floats<const N: usize>(parts: &mut std::str::SplitWhitespace<'_>) -> Option<[f32; N]> {
    let mut out = [0.0; N];
    for slot in &mut out {
        *slot = parts.next()?.parse().ok()?;
    }
    Some(out)
}

impl ObjModel {
    /// Parse OBJ text, resolving `mtllib` and `map_Kd` through `materials`.
    /// A library that cannot be read is an error; a texture that cannot be
    /// loaded leaves its material untextured.
    pub fn parse(text: &str, materials: &dyn MaterialSource) -> Result<Self> {
        let mut model = ObjModel::default();
        let mut positions: Vec<Vec3> = Vec::new();
        let mut uvs: Vec<Vec2> = Vec::new();
        let mut current: Option<usize> = None;

        for line in text.lines() {
            let line = line.trim();
            let mut parts = line.split_whitespace();
            let Some(keyword) = parts.next() else {
                continue;
            };
            match keyword {
                "v" => {
                    if let Some([x, y, z]) = parse_floats::<3>(&mut parts) {
                        let p = Vec3::new(x, y, z);
                        model.bounds = Some(match model.bounds {
                            Some((min, max)) => (min.min(p), max.max(p)),
                            None => (p, p),
                        });
                        positions.push(p);
                    }
                }
                "vt" => {
                    if let Some([u, v]) = parse_floats::<2>(&mut parts) {
                        uvs.push(Vec2::new(u, v));
                    }
                }
                "f" => {
                    let corners: Option<Vec<Vertex>> = parts
                        .map(|token| {
                            let (v, t) = parse_corner(token)?;
                            let position = positions[resolve_index(v, positions.len())?];
                            let uv = t
                                .and_then(|t| resolve_index(t, uvs.len()))
                                .map_or(Vec2::ZERO, |i| uvs[i]);
                            Some(Vertex::new(position, uv))
                        })
                        .collect();
                    let Some(corners) = corners else {
                        continue;
                    };
                    for i in 1..corners.len().saturating_sub(1) {
                        model.triangles.push(ObjTriangle {
                            vertices: [corners[0], corners[i], corners[i + 1]],
                            material: current,
                        });
                    }
                }
                "mtllib" => {
                    if let Some(name) = parts.next() {
                        let library = materials.read_library(Path::new(name))?;
                        let dir = Path::new(name).parent().unwrap_or(Path::new(""));
                        model.parse_library(&library, dir, materials);
                    }
                }
                "usemtl" => {
                    current = parts
                        .next()
                        .and_then(|name| model.materials.iter().position(|m| m.name == name));
                }
                _ => {}
            }
        }

        Ok(model)
    }

    fn parse_library(&mut self, text: &str, dir: &Path, materials: &dyn MaterialSource) {
        let mut current: Option<usize> = None;
        for line in text.lines() {
            let mut parts = line.split_whitespace();
            match parts.next() {
                Some("newmtl") => {
                    if let Some(name) = parts.next() {
                        self.materials.push(ObjMaterial {
                            name: name.to_string(),
                            diffuse: None,
                        });
                        current = Some(self.materials.len() - 1);
                    }
                }
                Some("map_Kd") => {
                    let (Some(index), Some(file)) = (current, parts.next()) else {
                        continue;
                    };
                    match materials.load_texture(&dir.join(file)) {
                        Ok(texture) => self.materials[index].diffuse = Some(texture),
                        Err(err) => {
                            tracing::warn!(material = %self.materials[index].name, error = %err, "diffuse map unavailable")
                        }
                    }
                }
                _ => {}
            }
        }
    }

    /// Load an OBJ file; material references resolve against its directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| EngineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let dir = path.parent().unwrap_or(Path::new(""));
        let model = Self::parse(&text, &FsMaterialSource::new(dir))?;
        tracing::info!(
            path = %path.display(),
            triangles = model.triangles.len(),
            materials = model.materials.len(),
            "model loaded"
        );
        Ok(model)
    }

    /// Unit cube centred on the origin, counter-clockwise from outside.
    pub fn cube() -> Self {
        let min = Vec3::splat(-0.5);
        let triangles = FaceDir::ALL
            .iter()
            .flat_map(|dir| dir.faces(min, crate::rendering::TextureId::Stone))
            .map(|face| ObjTriangle {
                vertices: face.vertices,
                material: None,
            })
            .collect();
        Self {
            triangles,
            materials: Vec::new(),
            bounds: Some((min, -min)),
        }
    }

    pub fn center(&self) -> Vec3 {
        self.bounds.map_or(Vec3::ZERO, |(min, max)| (min + max) * 0.5)
    }

    /// Half the diagonal of the bounding box.
    pub fn radius(&self) -> f32 {
        self.bounds.map_or(0.0, |(min, max)| (max - min).length() * 0.5)
    }
}

/// Draws an `ObjModel` spinning about its centre.
pub struct ModelRenderer {
    untextured: Texture,
}

impl Default for ModelRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelRenderer {
    pub fn new() -> Self {
        Self {
            untextured: Texture::solid(UNTEXTURED_COLOR),
        }
    }

    /// Model matrix for a spin `angle`: yaw at full rate, pitch at half rate,
    /// about the model's centre.
    pub fn model_matrix(model: &ObjModel, angle: f32) -> Mat4 {
        let spin = math::multiply(math::rotate_y(angle), math::rotate_x(angle * 0.5));
        math::multiply(spin, math::translate(-model.center()))
    }

    pub fn render(
        &self,
        renderer: &mut FrameRenderer,
        model: &ObjModel,
        camera: &Camera,
        angle: f32,
    ) -> FrameStats {
        let (width, height) = renderer.size();
        let pipeline = GeometryPipeline::new(
            math::multiply(camera.view_matrix(), Self::model_matrix(model, angle)),
            camera.projection_matrix(),
            camera.near,
            width,
            height,
            BackfaceReference::ViewAxis,
        );

        for tri in &model.triangles {
            let texture = tri
                .material
                .and_then(|i| model.materials.get(i))
                .and_then(|m| m.diffuse.as_ref())
                .unwrap_or(&self.untextured);
            renderer.draw_triangle(&pipeline, &tri.vertices, texture, BlendMode::Opaque);
        }
        renderer.stats()
    }
}
