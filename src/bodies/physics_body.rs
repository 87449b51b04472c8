use crate::bodies::Circle;
use crate::collision::BoundingCircle;
use crate::core::{BodyHandle, SimulationConfig};
use crate::error::PhysicsError;
use crate::math::Vector2;
use crate::Result;

/// A node in a physics-body tree.
///
/// Position, velocity, angle and angular velocity are relative to the
/// parent body (or the world for a root). Mass, center of mass, moment of
/// inertia and the bounding circle are derived aggregates, recomputed by
/// the hierarchy passes each tick; they are never authoritative inputs.
///
/// Parent/child edges are stored as arena handles and only ever mutated
/// together by the world's attach/detach methods, which keeps the graph a
/// tree by construction.
pub struct PhysicsBody {
    parent: Option<BodyHandle>,
    children: Vec<BodyHandle>,
    circles: Vec<Circle>,

    position: Vector2,
    velocity: Vector2,
    angle: f32,
    angular_velocity: f32,

    mass: f32,
    center_of_mass: Vector2,
    moment_of_inertia: f32,
    elasticity: f32,

    bounding_circle: BoundingCircle,

    pending_impulse: Vector2,
    pending_angular_impulse: f32,
}

impl PhysicsBody {
    /// Creates a new body at the origin with no children or circles
    pub fn new() -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            circles: Vec::new(),
            position: Vector2::zero(),
            velocity: Vector2::zero(),
            angle: 0.0,
            angular_velocity: 0.0,
            mass: 0.0,
            center_of_mass: Vector2::zero(),
            moment_of_inertia: 0.0,
            elasticity: 1.0,
            bounding_circle: BoundingCircle::new(),
            pending_impulse: Vector2::zero(),
            pending_angular_impulse: 0.0,
        }
    }

    /// Returns the parent body handle, if attached
    pub fn get_parent(&self) -> Option<BodyHandle> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: Option<BodyHandle>) {
        self.parent = parent;
    }

    /// Returns the handles of the child bodies
    pub fn get_children(&self) -> &[BodyHandle] {
        &self.children
    }

    pub(crate) fn add_child(&mut self, child: BodyHandle) {
        self.children.push(child);
    }

    pub(crate) fn remove_child(&mut self, child: BodyHandle) {
        self.children.retain(|current| *current != child);
    }

    /// Returns the circles owned by this body
    pub fn get_circles(&self) -> &[Circle] {
        &self.circles
    }

    /// Gets a mutable reference to an owned circle by index
    pub fn get_circle_mut(&mut self, index: usize) -> Option<&mut Circle> {
        self.circles.get_mut(index)
    }

    pub(crate) fn circles_mut(&mut self) -> &mut [Circle] {
        &mut self.circles
    }

    /// Adds a circle to this body
    pub fn add_circle(&mut self, circle: Circle) {
        self.circles.push(circle);
    }

    /// Returns the parent-relative position
    pub fn get_position(&self) -> Vector2 {
        self.position
    }

    /// Sets the parent-relative position
    pub fn set_position(&mut self, position: Vector2) {
        self.position = position;
    }

    /// Returns the parent-relative velocity
    pub fn get_velocity(&self) -> Vector2 {
        self.velocity
    }

    /// Sets the parent-relative velocity
    pub fn set_velocity(&mut self, velocity: Vector2) {
        self.velocity = velocity;
    }

    /// Returns the parent-relative angle in radians
    pub fn get_angle(&self) -> f32 {
        self.angle
    }

    /// Sets the parent-relative angle in radians
    pub fn set_angle(&mut self, angle: f32) {
        self.angle = angle;
    }

    /// Returns the parent-relative angular velocity in radians per second
    pub fn get_angular_velocity(&self) -> f32 {
        self.angular_velocity
    }

    /// Sets the parent-relative angular velocity in radians per second
    pub fn set_angular_velocity(&mut self, angular_velocity: f32) {
        self.angular_velocity = angular_velocity;
    }

    /// Returns the derived total mass of the subtree
    pub fn get_mass(&self) -> f32 {
        self.mass
    }

    pub(crate) fn set_mass(&mut self, mass: f32) {
        self.mass = mass;
    }

    /// Returns the derived world-space center of mass
    pub fn get_center_of_mass(&self) -> Vector2 {
        self.center_of_mass
    }

    pub(crate) fn set_center_of_mass(&mut self, center_of_mass: Vector2) {
        self.center_of_mass = center_of_mass;
    }

    /// Returns the derived moment of inertia about the center of mass
    pub fn get_moment_of_inertia(&self) -> f32 {
        self.moment_of_inertia
    }

    pub(crate) fn set_moment_of_inertia(&mut self, moment_of_inertia: f32) {
        self.moment_of_inertia = moment_of_inertia;
    }

    /// Returns the elasticity used for collision restitution
    pub fn get_elasticity(&self) -> f32 {
        self.elasticity
    }

    /// Sets the elasticity; must lie in [0, 1]
    pub fn set_elasticity(&mut self, elasticity: f32) -> Result<()> {
        if !(0.0..=1.0).contains(&elasticity) {
            return Err(PhysicsError::InvalidParameter(format!(
                "elasticity must lie in [0, 1], got {}",
                elasticity
            )));
        }

        self.elasticity = elasticity;
        Ok(())
    }

    /// Returns the derived bounding circle, relative to the parent frame
    pub fn get_bounding_circle(&self) -> &BoundingCircle {
        &self.bounding_circle
    }

    pub(crate) fn bounding_circle_mut(&mut self) -> &mut BoundingCircle {
        &mut self.bounding_circle
    }

    /// Queues an impulse to be applied at the start of the next tick
    pub fn apply_impulse(&mut self, impulse: Vector2) {
        self.pending_impulse += impulse;
    }

    /// Queues an angular impulse to be applied at the start of the next tick
    pub fn apply_angular_impulse(&mut self, impulse: f32) {
        self.pending_angular_impulse += impulse;
    }

    /// Applies pending impulses, then friction damping.
    ///
    /// Velocities below the configured epsilons snap to exactly zero so
    /// resting bodies stop jittering; otherwise the speed is reduced by the
    /// friction deceleration with direction preserved.
    pub(crate) fn update_acceleration(&mut self, config: &SimulationConfig, interval: f32) {
        // Impulses wait until the mass pass has run at least once
        if self.mass > 0.0 {
            self.velocity += self.pending_impulse / self.mass;
            if self.moment_of_inertia > 0.0 {
                self.angular_velocity += self.pending_angular_impulse / self.moment_of_inertia;
            }

            self.pending_impulse = Vector2::zero();
            self.pending_angular_impulse = 0.0;
        }

        let speed_squared = self.velocity.length_squared();
        if speed_squared < config.velocity_epsilon {
            self.velocity = Vector2::zero();
        } else if config.friction > 0.0 {
            let speed = speed_squared.sqrt();
            let reduced = (speed - config.friction * interval).max(0.0);
            self.velocity *= reduced / speed;
        }

        if self.angular_velocity.abs() < config.angular_velocity_epsilon {
            self.angular_velocity = 0.0;
        } else if config.angular_friction > 0.0 {
            let reduced = self.angular_velocity.abs() - config.angular_friction * interval;
            self.angular_velocity = if reduced <= 0.0 {
                0.0
            } else {
                self.angular_velocity.signum() * reduced
            };
        }
    }

    /// Integrates position and angle forward by `interval`
    pub(crate) fn integrate(&mut self, interval: f32) {
        self.position += self.velocity * interval;
        self.angle += self.angular_velocity * interval;
    }
}

impl Default for PhysicsBody {
    fn default() -> Self {
        Self::new()
    }
}
