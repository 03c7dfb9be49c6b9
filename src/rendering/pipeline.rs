/// Geometry pipeline: transform, outcode culling, near-plane clipping,
/// backface rejection and projection to integer screen coordinates.
///
/// Only the near plane is ever clipped geometrically. The other five planes
/// are handled by the trivial-reject outcode test, and whatever remains
/// off-screen is discarded by the rasterizer's bounding-box clamp.
use crate::count_call;
use crate::meshing::Vertex;
use glam::{IVec2, Mat4, Vec2, Vec3, Vec4};

pub const OUTCODE_LEFT: u8 = 1;
pub const OUTCODE_RIGHT: u8 = 2;
pub const OUTCODE_BOTTOM: u8 = 4;
pub const OUTCODE_TOP: u8 = 8;
pub const OUTCODE_NEAR: u8 = 16;
pub const OUTCODE_FAR: u8 = 32;
pub const OUTCODE_ALL: u8 = 0x3F;

/// Planes of the clip volume a clip-space point lies outside of.
#[inline]
pub fn outcode(clip: Vec4) -> u8 {
    let mut code = 0;
    if clip.x < -clip.w {
        code |= OUTCODE_LEFT;
    }
    if clip.x > clip.w {
        code |= OUTCODE_RIGHT;
    }
    if clip.y < -clip.w {
        code |= OUTCODE_BOTTOM;
    }
    if clip.y > clip.w {
        code |= OUTCODE_TOP;
    }
    if clip.z < 0.0 {
        code |= OUTCODE_NEAR;
    }
    if clip.z > clip.w {
        code |= OUTCODE_FAR;
    }
    code
}

/// NDC x/y to integer pixel coordinates, y pointing down.
#[inline]
pub fn norm_to_screen(ndc: Vec2, width: usize, height: usize) -> IVec2 {
    let w = width.saturating_sub(1) as f32;
    let h = height.saturating_sub(1) as f32;
    IVec2::new(
        ((ndc.x * 0.5 + 0.5) * w) as i32,
        ((-ndc.y * 0.5 + 0.5) * h) as i32,
    )
}

/// Inverse of `norm_to_screen` up to pixel rounding.
#[inline]
pub fn screen_to_norm(screen: IVec2, width: usize, height: usize) -> Vec2 {
    let w = width.saturating_sub(1).max(1) as f32;
    let h = height.saturating_sub(1).max(1) as f32;
    Vec2::new(
        2.0 * (screen.x as f32 / w) - 1.0,
        -(2.0 * (screen.y as f32 / h) - 1.0),
    )
}

/// Rasterizer input vertex.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ScreenVertex {
    pub pos: IVec2,
    pub uv: Vec2,
    pub inv_w: f32,
    /// Window depth in [0, 1].
    pub depth: f32,
}

/// View-space vertex carried through near-plane clipping.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ClipVertex {
    pub view: Vec3,
    pub uv: Vec2,
}

impl ClipVertex {
    #[inline]
    fn lerp_to_near(a: ClipVertex, b: ClipVertex, near: f32) -> ClipVertex {
        let t = (-near - a.view.z) / (b.view.z - a.view.z);
        ClipVertex {
            view: Vec3::new(
                a.view.x + (b.view.x - a.view.x) * t,
                a.view.y + (b.view.y - a.view.y) * t,
                -near,
            ),
            uv: a.uv + (b.uv - a.uv) * t,
        }
    }
}

/// Sutherland-Hodgman clip of a triangle against the view-space plane
/// `z = -near`, keeping the side with `z <= -near`.
///
/// Returns the vertex count (0, 3 or 4) and the polygon, wound like the input.
pub fn clip_polygon_near(tri: &[ClipVertex; 3], near: f32) -> (usize, [ClipVertex; 4]) {
    let mut out = [ClipVertex::default(); 4];
    let mut count = 0;
    let inside = |v: &ClipVertex| v.view.z <= -near;

    for i in 0..3 {
        let a = tri[i];
        let b = tri[(i + 1) % 3];
        match (inside(&a), inside(&b)) {
            (true, true) => {
                out[count] = b;
                count += 1;
            }
            (true, false) => {
                out[count] = ClipVertex::lerp_to_near(a, b, near);
                count += 1;
            }
            (false, true) => {
                out[count] = ClipVertex::lerp_to_near(a, b, near);
                out[count + 1] = b;
                count += 2;
            }
            (false, false) => {}
        }
    }

    if count < 3 {
        (0, out)
    } else {
        (count, out)
    }
}

/// Reference direction used by the backface test.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum BackfaceReference {
    /// Eye-to-first-vertex direction; exact under perspective (voxel faces).
    #[default]
    FirstVertex,
    /// The view axis `-Z`; cheaper, approximate near the screen edges (models).
    ViewAxis,
}

/// True when the counter-clockwise normal of (a, b, c) does not face the eye.
#[inline]
pub fn is_backface(a: Vec3, b: Vec3, c: Vec3, reference: BackfaceReference) -> bool {
    let normal = (b - a).cross(c - a);
    let towards = match reference {
        BackfaceReference::FirstVertex => a,
        BackfaceReference::ViewAxis => Vec3::NEG_Z,
    };
    normal.dot(towards) >= 0.0
}

/// Up to two projected triangles produced from one input triangle.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Projected {
    triangles: [[ScreenVertex; 3]; 2],
    count: usize,
    clipped: bool,
}

impl Projected {
    fn single(tri: [ScreenVertex; 3]) -> Self {
        Self {
            triangles: [tri, [ScreenVertex::default(); 3]],
            count: 1,
            clipped: false,
        }
    }

    #[inline]
    pub fn triangles(&self) -> &[[ScreenVertex; 3]] {
        &self.triangles[..self.count]
    }

    /// Whether the near plane cut the source triangle.
    #[inline]
    pub fn was_clipped(&self) -> bool {
        self.clipped
    }
}

/// Result of pushing one triangle through the pipeline.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Outcome {
    /// All three vertices outside one clip plane.
    FrustumCulled,
    /// Facing away from the eye.
    Backface,
    /// Degenerate (`w == 0`), outside the depth range, or clipped away entirely.
    Dropped,
    Visible(Projected),
}

impl Outcome {
    #[inline]
    pub fn projected(&self) -> Option<&Projected> {
        match self {
            Outcome::Visible(p) => Some(p),
            _ => None,
        }
    }
}

/// Per-draw transform state shared by every triangle of a batch.
#[derive(Copy, Clone, Debug)]
pub struct GeometryPipeline {
    pub model_view: Mat4,
    pub projection: Mat4,
    pub near_plane: f32,
    pub width: usize,
    pub height: usize,
    pub backface: BackfaceReference,
}

impl GeometryPipeline {
    pub fn new(
        model_view: Mat4,
        projection: Mat4,
        near_plane: f32,
        width: usize,
        height: usize,
        backface: BackfaceReference,
    ) -> Self {
        Self {
            model_view,
            projection,
            near_plane,
            width,
            height,
            backface,
        }
    }

    /// Project a view-space point. `None` when `w == 0`.
    #[inline]
    pub fn project_vertex(&self, v: &ClipVertex) -> Option<(ScreenVertex, u8)> {
        let clip = self.projection * v.view.extend(1.0);
        if clip.w == 0.0 {
            return None;
        }
        Some((self.to_screen(clip, v.uv), outcode(clip)))
    }

    #[inline]
    fn to_screen(&self, clip: Vec4, uv: Vec2) -> ScreenVertex {
        let inv_w = 1.0 / clip.w;
        let ndc = clip.truncate() * inv_w;
        ScreenVertex {
            pos: norm_to_screen(ndc.truncate(), self.width, self.height),
            uv,
            inv_w,
            depth: 0.5 * (ndc.z + 1.0),
        }
    }

    pub fn process(&self, tri: &[Vertex; 3]) -> Outcome {
        count_call!(crate::perf::FUNCTION_COUNTERS.triangles_submitted);

        let mut view = [Vec3::ZERO; 3];
        let mut screen = [ScreenVertex::default(); 3];
        let mut codes = [0u8; 3];
        let mut depth_ok = true;

        for (i, v) in tri.iter().enumerate() {
            let view4 = self.model_view * v.position.extend(1.0);
            let clip = self.projection * view4;
            if clip.w == 0.0 {
                count_call!(crate::perf::FUNCTION_COUNTERS.triangles_dropped);
                return Outcome::Dropped;
            }
            view[i] = view4.truncate();
            codes[i] = outcode(clip);
            screen[i] = self.to_screen(clip, v.uv);
            depth_ok &= (0.0..=1.0).contains(&screen[i].depth);
        }

        if codes[0] & codes[1] & codes[2] != 0 {
            count_call!(crate::perf::FUNCTION_COUNTERS.triangles_frustum_culled);
            return Outcome::FrustumCulled;
        }

        let near = self.near_plane;
        if view.iter().all(|p| p.z <= -near) {
            if !depth_ok {
                count_call!(crate::perf::FUNCTION_COUNTERS.triangles_dropped);
                return Outcome::Dropped;
            }
            if is_backface(view[0], view[1], view[2], self.backface) {
                count_call!(crate::perf::FUNCTION_COUNTERS.triangles_backface_culled);
                return Outcome::Backface;
            }
            return Outcome::Visible(Projected::single(screen));
        }

        count_call!(crate::perf::FUNCTION_COUNTERS.triangles_near_clipped);
        let input = [0, 1, 2].map(|i| ClipVertex {
            view: view[i],
            uv: tri[i].uv,
        });
        let (count, poly) = clip_polygon_near(&input, near);
        if count < 3 {
            count_call!(crate::perf::FUNCTION_COUNTERS.triangles_dropped);
            return Outcome::Dropped;
        }

        const FANS: [[usize; 3]; 2] = [[0, 1, 2], [0, 2, 3]];
        let mut out = Projected {
            triangles: [[ScreenVertex::default(); 3]; 2],
            count: 0,
            clipped: true,
        };
        let mut any_backface = false;

        for fan in &FANS[..count - 2] {
            let [a, b, c] = fan.map(|i| poly[i]);
            if is_backface(a.view, b.view, c.view, self.backface) {
                any_backface = true;
                continue;
            }
            let (Some((pa, ma)), Some((pb, mb)), Some((pc, mc))) = (
                self.project_vertex(&a),
                self.project_vertex(&b),
                self.project_vertex(&c),
            ) else {
                continue;
            };
            if ma & mb & mc != 0 {
                continue;
            }
            let mut projected = [pa, pb, pc];
            for v in &mut projected {
                v.depth = v.depth.clamp(0.0, 1.0);
            }
            out.triangles[out.count] = projected;
            out.count += 1;
        }

        match (out.count, any_backface) {
            (0, true) => {
                count_call!(crate::perf::FUNCTION_COUNTERS.triangles_backface_culled);
                Outcome::Backface
            }
            (0, false) => {
                count_call!(crate::perf::FUNCTION_COUNTERS.triangles_dropped);
                Outcome::Dropped
            }
            _ => Outcome::Visible(out),
        }
    }
}
