mod bounding_circle;
mod detector;
mod resolver;

pub use bounding_circle::BoundingCircle;
pub use detector::{
    detect_collision_point, detect_collision_time, detect_potential_collision, CollisionDetector,
};
pub use resolver::resolve_collision;
