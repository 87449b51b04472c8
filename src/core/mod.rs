pub mod world;
pub mod config;
pub mod storage;
pub mod events;
pub mod queue;

pub use self::world::PhysicsWorld;
pub use self::config::SimulationConfig;
pub use self::storage::{BodyStorage, Storage};
pub use self::events::{CollisionEvent, ResolvedCollision, EventRegistry};
pub use self::queue::{PriorityQueue, PriorityQueueSet};

/// A unique identifier for a body in the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(pub(crate) u32);

/// A unique identifier for a pending collision event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventHandle(pub(crate) u32);
