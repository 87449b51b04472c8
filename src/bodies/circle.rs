use std::f32::consts::PI;

use crate::collision::BoundingCircle;
use crate::error::PhysicsError;
use crate::math::Vector2;
use crate::Result;

/// A leaf collision primitive owned by a physics body.
///
/// The position is relative to the owning body and is scaled by the
/// circle's own scale factor, as is the radius. World position and
/// velocity are derived on demand by the hierarchy helpers, never stored.
#[derive(Debug, Clone)]
pub struct Circle {
    position: Vector2,
    radius: f32,
    scale: f32,
    density: f32,
    bounding_circle: BoundingCircle,
}

impl Circle {
    /// Creates a new circle at the given body-relative position.
    ///
    /// Fails if the radius is negative; a zero radius is allowed but
    /// contributes no mass.
    pub fn new(position: Vector2, radius: f32) -> Result<Self> {
        if !(radius >= 0.0) {
            return Err(PhysicsError::InvalidParameter(format!(
                "circle radius must be non-negative, got {}",
                radius
            )));
        }

        Ok(Self {
            position,
            radius,
            scale: 1.0,
            density: 1.0,
            bounding_circle: BoundingCircle::new(),
        })
    }

    /// Returns the body-relative position
    pub fn get_position(&self) -> Vector2 {
        self.position
    }

    /// Sets the body-relative position
    pub fn set_position(&mut self, position: Vector2) {
        self.position = position;
    }

    /// Returns the unscaled radius
    pub fn get_radius(&self) -> f32 {
        self.radius
    }

    /// Sets the unscaled radius
    pub fn set_radius(&mut self, radius: f32) -> Result<()> {
        if !(radius >= 0.0) {
            return Err(PhysicsError::InvalidParameter(format!(
                "circle radius must be non-negative, got {}",
                radius
            )));
        }

        self.radius = radius;
        Ok(())
    }

    /// Returns the scale factor
    pub fn get_scale(&self) -> f32 {
        self.scale
    }

    /// Sets the scale factor applied to both the radius and the local offset
    pub fn set_scale(&mut self, scale: f32) -> Result<()> {
        if !(scale > 0.0) {
            return Err(PhysicsError::InvalidParameter(format!(
                "circle scale must be positive, got {}",
                scale
            )));
        }

        self.scale = scale;
        Ok(())
    }

    /// Returns the density
    pub fn get_density(&self) -> f32 {
        self.density
    }

    /// Sets the density
    pub fn set_density(&mut self, density: f32) -> Result<()> {
        if !(density > 0.0) {
            return Err(PhysicsError::InvalidParameter(format!(
                "circle density must be positive, got {}",
                density
            )));
        }

        self.density = density;
        Ok(())
    }

    /// Returns the collision radius after applying the scale factor
    pub fn effective_radius(&self) -> f32 {
        self.radius * self.scale
    }

    /// Returns the body-relative offset after applying the scale factor
    pub fn scaled_position(&self) -> Vector2 {
        self.position * self.scale
    }

    /// Returns the mass of the circle as a 2D disk
    pub fn get_mass(&self) -> f32 {
        let radius = self.effective_radius();
        PI * radius * radius * self.density
    }

    /// Returns the bounding circle cache
    pub fn get_bounding_circle(&self) -> &BoundingCircle {
        &self.bounding_circle
    }

    /// Rewrites the bounding circle from the current offset and radius
    pub fn update_bounding_circle(&mut self) {
        self.bounding_circle.set_position(self.scaled_position());
        self.bounding_circle.set_radius(self.effective_radius());
    }
}
