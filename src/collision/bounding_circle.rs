use crate::math::Vector2;

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// A cheap conservative enclosing circle used for collision pruning.
///
/// The position is relative to the owning circle's or body's parent frame;
/// it is a pure cache, rewritten by the owner's update pass each tick.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct BoundingCircle {
    position: Vector2,
    radius: f32,
}

impl BoundingCircle {
    /// Creates a new bounding circle at the origin with zero radius
    pub fn new() -> Self {
        Self {
            position: Vector2::zero(),
            radius: 0.0,
        }
    }

    /// Returns the owner-relative center
    pub fn get_position(&self) -> Vector2 {
        self.position
    }

    /// Sets the owner-relative center
    pub fn set_position(&mut self, position: Vector2) {
        self.position = position;
    }

    /// Returns the radius
    pub fn get_radius(&self) -> f32 {
        self.radius
    }

    /// Sets the radius
    pub fn set_radius(&mut self, radius: f32) {
        self.radius = radius;
    }
}

impl Default for BoundingCircle {
    fn default() -> Self {
        Self::new()
    }
}
