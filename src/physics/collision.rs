/// Player body: substep integration and AABB-vs-grid collision resolution
///
/// The player is an axis-aligned box hanging below the camera: `radius` to
/// each side horizontally, `height` downward from the eye.
use crate::config::PhysicsConfig;
use crate::voxel::BlockGrid;
use glam::{IVec3, Vec3};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    #[inline]
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Per-axis overlap lengths; all positive iff the boxes intersect.
    #[inline]
    pub fn overlap(&self, other: &Aabb) -> Vec3 {
        self.max.min(other.max) - self.min.max(other.min)
    }

    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        let o = self.overlap(other);
        o.x > 0.0 && o.y > 0.0 && o.z > 0.0
    }

    /// Grid cells (inclusive corners) touched by this box, clamped to the grid.
    pub fn cell_range(&self, grid: &BlockGrid) -> (IVec3, IVec3) {
        let half_x = grid.size_x() as f32 * 0.5;
        let half_z = grid.size_z() as f32 * 0.5;
        let lo = IVec3::new(
            ((self.min.x + half_x).floor() as i32).max(0),
            ((-self.max.y).floor() as i32).max(grid.y_min()),
            ((self.min.z + half_z).floor() as i32).max(0),
        );
        let hi = IVec3::new(
            ((self.max.x + half_x).floor() as i32).min(grid.size_x() - 1),
            ((-self.min.y).floor() as i32).min(grid.y_max()),
            ((self.max.z + half_z).floor() as i32).min(grid.size_z() - 1),
        );
        (lo, hi)
    }
}

/// Movement wish for one frame, already expressed in world space.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct MoveIntent {
    /// Horizontal direction; normalized before use, zero for no movement.
    pub direction: Vec3,
    pub jump: bool,
}

#[derive(Debug, Clone)]
pub struct PlayerBody {
    pub velocity: Vec3,
    pub grounded: bool,
    config: PhysicsConfig,
}

impl PlayerBody {
    pub fn new(config: PhysicsConfig) -> Self {
        Self {
            velocity: Vec3::ZERO,
            grounded: false,
            config,
        }
    }

    #[inline]
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Box for an eye at `pos`.
    #[inline]
    pub fn aabb(&self, pos: Vec3) -> Aabb {
        let r = self.config.player_radius;
        Aabb::new(
            pos - Vec3::new(r, self.config.player_height, r),
            pos + Vec3::new(r, 0.0, r),
        )
    }

    /// Push the box out of every solid cell it overlaps, one axis per cell:
    /// the axis of least penetration. Resolving vertically zeroes the vertical
    /// velocity and, when pushed upward, marks the body grounded.
    pub fn resolve_collisions(&mut self, grid: &BlockGrid, pos: &mut Vec3) {
        let mut body = self.aabb(*pos);
        let (lo, hi) = body.cell_range(grid);
        self.grounded = false;

        for x in lo.x..=hi.x {
            for z in lo.z..=hi.z {
                for y in lo.y..=hi.y {
                    if grid.get(x, y, z).is_air() {
                        continue;
                    }
                    let (bmin, bmax) = grid.cell_bounds(x, y, z);
                    let cell = Aabb::new(bmin, bmax);
                    let o = body.overlap(&cell);
                    if !(o.x > 0.0 && o.y > 0.0 && o.z > 0.0) {
                        continue;
                    }

                    let pc = body.center();
                    let cc = cell.center();
                    let push = if o.x <= o.y && o.x <= o.z {
                        Vec3::new(if pc.x < cc.x { -o.x } else { o.x }, 0.0, 0.0)
                    } else if o.y <= o.x && o.y <= o.z {
                        let dy = if pc.y < cc.y { -o.y } else { o.y };
                        self.velocity.y = 0.0;
                        if dy > 0.0 {
                            self.grounded = true;
                        }
                        Vec3::new(0.0, dy, 0.0)
                    } else {
                        Vec3::new(0.0, 0.0, if pc.z < cc.z { -o.z } else { o.z })
                    };

                    *pos += push;
                    body.min += push;
                    body.max += push;
                }
            }
        }
    }

    /// One fixed substep: walk, jump if grounded, integrate gravity, resolve.
    pub fn substep(&mut self, grid: &BlockGrid, pos: &mut Vec3, intent: &MoveIntent, step: f32) {
        let dir = Vec3::new(intent.direction.x, 0.0, intent.direction.z);
        if dir.length_squared() > 0.0 {
            *pos += dir.normalize() * self.config.walk_speed * step;
        }

        if self.grounded && intent.jump {
            self.velocity.y = self.config.jump_velocity;
            self.grounded = false;
        }

        self.velocity.y -= self.config.gravity * step;
        pos.y += self.velocity.y * step;

        self.resolve_collisions(grid, pos);
    }

    /// Advance `dt` seconds in substeps no longer than `max_substep`.
    /// Returns the number of substeps taken.
    pub fn step(&mut self, grid: &BlockGrid, pos: &mut Vec3, intent: &MoveIntent, dt: f32) -> usize {
        let max_step = self.config.max_substep.max(1e-4);
        let mut remaining = dt.min(self.config.max_frame_dt);
        let mut steps = 0;
        while remaining > 1e-6 {
            let step = remaining.min(max_step);
            remaining -= step;
            self.substep(grid, pos, intent, step);
            steps += 1;
        }
        steps
    }

    /// Noclip flight along `direction` (not normalized, may include vertical).
    /// Velocity is discarded and the body counts as grounded.
    pub fn fly(&mut self, pos: &mut Vec3, direction: Vec3, dt: f32) {
        *pos += direction * self.config.fly_speed * dt;
        self.velocity = Vec3::ZERO;
        self.grounded = true;
    }
}
