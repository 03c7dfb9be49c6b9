/// Player physics and block picking against the block grid
pub mod collision;
pub mod raycast;

pub use collision::{Aabb, MoveIntent, PlayerBody};
pub use raycast::{raycast, RayHit};
