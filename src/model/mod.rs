// MODEL: Player, camera and arena data
pub mod arena;
pub mod body;
pub mod camera;
pub mod player;

pub use arena::{Aabb, Arena, ArenaBody};
pub use body::{Axis, CollidableBody, FreeBody};
pub use camera::Camera;
pub use player::PlayerState;
