pub mod math;
pub mod core;
pub mod bodies;
pub mod collision;

/// Re-export common types for easier usage
pub use crate::core::{PhysicsWorld, SimulationConfig, BodyHandle};
pub use crate::bodies::{PhysicsBody, Circle};
pub use crate::math::Vector2;

/// Error types for the physics engine
pub mod error {
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum PhysicsError {
        #[error("Invalid parameter: {0}")]
        InvalidParameter(String),

        #[error("Resource not found: {0}")]
        ResourceNotFound(String),

        #[error("Invalid configuration: {0}")]
        InvalidConfiguration(String),

        #[error("Internal error: {0}")]
        InternalError(String),
    }
}

/// Result type for physics engine operations
pub type Result<T> = std::result::Result<T, error::PhysicsError>;

/// Engine version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
