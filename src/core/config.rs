#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Configuration parameters for the physics simulation
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct SimulationConfig {
    /// Linear friction deceleration applied to every body each tick,
    /// in velocity units per second
    pub friction: f32,

    /// Angular friction deceleration applied to every body each tick,
    /// in radians per second squared
    pub angular_friction: f32,

    /// Squared linear speed below which a body's velocity snaps to zero
    pub velocity_epsilon: f32,

    /// Absolute angular speed below which a body's angular velocity snaps to zero
    pub angular_velocity_epsilon: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            friction: 0.0,         // No damping unless the host opts in
            angular_friction: 0.0, // No damping unless the host opts in
            velocity_epsilon: 1.0e-6,
            angular_velocity_epsilon: 1.0e-4,
        }
    }
}
