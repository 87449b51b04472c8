use crate::bodies::{hierarchy, Circle, PhysicsBody};
use crate::collision::{resolve_collision, CollisionDetector};
use crate::core::storage::Storage;
use crate::core::{
    BodyHandle, BodyStorage, EventRegistry, ResolvedCollision, SimulationConfig,
};
use crate::error::PhysicsError;
use crate::math::Vector2;
use crate::Result;

/// The main physics world that owns all bodies and drives the simulation.
///
/// One `update(interval)` call fully resolves one tick: it refreshes every
/// root's derived state, predicts all collisions over the interval, then
/// repeatedly advances to the earliest scheduled contact, resolves it,
/// invalidates and re-detects the affected pairs, and integrates the
/// remainder of the interval.
pub struct PhysicsWorld {
    /// Arena of every body in the world, roots and descendants alike
    bodies: BodyStorage<PhysicsBody>,

    /// Top-level bodies, in insertion order
    roots: Vec<BodyHandle>,

    /// Pending collision events for the tick in flight
    registry: EventRegistry,

    /// Configuration for the simulation
    config: SimulationConfig,

    /// Collisions resolved during the last update call
    resolved: Vec<ResolvedCollision>,

    /// The total elapsed simulation time
    time: f32,
}

impl PhysicsWorld {
    /// Creates a new physics world with default settings
    pub fn new() -> Self {
        Self::with_config(SimulationConfig::default())
    }

    /// Creates a new physics world with the given configuration
    pub fn with_config(config: SimulationConfig) -> Self {
        Self {
            bodies: BodyStorage::new(),
            roots: Vec::new(),
            registry: EventRegistry::new(),
            config,
            resolved: Vec::new(),
            time: 0.0,
        }
    }

    /// Returns the current simulation time
    pub fn get_time(&self) -> f32 {
        self.time
    }

    /// Returns a reference to the simulation configuration
    pub fn get_config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Returns a mutable reference to the simulation configuration
    pub fn get_config_mut(&mut self) -> &mut SimulationConfig {
        &mut self.config
    }

    /// Adds a top-level body to the world and returns its handle
    pub fn add_physics_body(&mut self, body: PhysicsBody) -> BodyHandle {
        let handle = self.bodies.add(body);
        self.roots.push(handle);
        handle
    }

    /// Adds a body as a child of `parent` and returns its handle.
    ///
    /// The freshly inserted body cannot appear anywhere above `parent`, so
    /// the parent/child edge keeps the graph a tree by construction.
    pub fn add_child_body(&mut self, parent: BodyHandle, body: PhysicsBody) -> Result<BodyHandle> {
        if self.bodies.get(parent).is_none() {
            return Err(PhysicsError::ResourceNotFound(format!(
                "Body with handle {:?} not found",
                parent
            )));
        }

        let handle = self.bodies.add(body);
        self.bodies.get_body_mut(handle)?.set_parent(Some(parent));
        self.bodies.get_body_mut(parent)?.add_child(handle);

        Ok(handle)
    }

    /// Adds a circle to the body identified by `handle`
    pub fn add_circle(&mut self, handle: BodyHandle, circle: Circle) -> Result<()> {
        self.bodies.get_body_mut(handle)?.add_circle(circle);
        Ok(())
    }

    /// Removes a body and its entire subtree from the world.
    ///
    /// The body is detached from its parent, its pending events are
    /// dropped and every descendant is removed from the arena.
    pub fn remove_physics_body(&mut self, handle: BodyHandle) -> Result<()> {
        let parent = self.bodies.get_body(handle)?.get_parent();

        if let Some(parent) = parent {
            self.bodies.get_body_mut(parent)?.remove_child(handle);
        } else {
            self.roots.retain(|current| *current != handle);
        }

        self.registry.remove_events_for(handle);
        self.remove_subtree(handle);

        Ok(())
    }

    fn remove_subtree(&mut self, handle: BodyHandle) {
        let children = match self.bodies.get(handle) {
            Some(body) => body.get_children().to_vec(),
            None => return,
        };

        for child in children {
            self.remove_subtree(child);
        }

        self.bodies.remove(handle);
    }

    /// Gets a reference to a body by its handle
    pub fn get_body(&self, handle: BodyHandle) -> Result<&PhysicsBody> {
        self.bodies.get_body(handle)
    }

    /// Gets a mutable reference to a body by its handle
    pub fn get_body_mut(&mut self, handle: BodyHandle) -> Result<&mut PhysicsBody> {
        self.bodies.get_body_mut(handle)
    }

    /// Returns the world-frame position and angle of a body
    pub fn get_world_transform(&self, handle: BodyHandle) -> Result<(Vector2, f32)> {
        hierarchy::world_transform(&self.bodies, handle)
    }

    /// Returns the world-frame position of a circle owned by `handle`
    pub fn get_circle_world_position(
        &self,
        handle: BodyHandle,
        circle_index: usize,
    ) -> Result<Vector2> {
        let body = self.bodies.get_body(handle)?;
        let circle = body.get_circles().get(circle_index).ok_or_else(|| {
            PhysicsError::ResourceNotFound(format!(
                "Body {:?} has no circle at index {}",
                handle, circle_index
            ))
        })?;

        hierarchy::circle_world_position(&self.bodies, handle, circle)
    }

    /// Returns the number of bodies in the world, including descendants
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Returns the collisions resolved during the last update call
    pub fn resolved_collisions(&self) -> &[ResolvedCollision] {
        &self.resolved
    }

    /// Clears the world of all bodies and pending events
    pub fn clear(&mut self) {
        self.bodies.clear();
        self.roots.clear();
        self.registry.clear();
        self.resolved.clear();
        self.time = 0.0;
    }

    /// Advances the simulation by `interval` seconds.
    ///
    /// Fails fast on a non-positive or non-finite interval and on
    /// malformed bodies (zero total mass, no circles anywhere in a
    /// subtree), since those corrupt every derived aggregate.
    pub fn update(&mut self, interval: f32) -> Result<()> {
        if !interval.is_finite() || interval <= 0.0 {
            return Err(PhysicsError::InvalidParameter(format!(
                "update interval must be positive and finite, got {}",
                interval
            )));
        }

        self.resolved.clear();
        self.registry.clear();

        let roots = self.roots.clone();

        // Derived-state pipeline; ordering is a contract, each pass reads
        // only what earlier passes wrote
        for &root in &roots {
            hierarchy::update_acceleration(&mut self.bodies, root, &self.config, interval)?;
            hierarchy::update_mass(&mut self.bodies, root)?;
            hierarchy::update_center_of_mass(&mut self.bodies, root)?;
            hierarchy::update_moment_of_inertia(&mut self.bodies, root)?;
            hierarchy::update_bounding_circle(&mut self.bodies, root)?;
        }

        // Initial collection over every unordered root pair
        for i in 0..roots.len() {
            for j in (i + 1)..roots.len() {
                let events = CollisionDetector::detect_pair(
                    &self.bodies,
                    roots[i],
                    roots[j],
                    interval,
                    0.0,
                )?;
                for event in events {
                    self.registry.insert(event);
                }
            }
        }

        let mut processed = 0.0f32;
        while processed < interval {
            // Resolve everything scheduled for this instant, in insertion
            // order. Roots are only invalidated when an impulse actually
            // landed: a skipped (already separating) contact changes no
            // state, and re-detecting it would reschedule the same instant
            // forever.
            let due = self.registry.take_events_at(processed);
            let mut invalidated: Vec<BodyHandle> = Vec::new();

            for event in &due {
                if let Some(impulse) = resolve_collision(&mut self.bodies, event)? {
                    self.resolved.push(ResolvedCollision {
                        time: processed,
                        body_a: event.body_a,
                        body_b: event.body_b,
                        point: event.point,
                        normal: event.normal,
                        impulse,
                    });

                    if !invalidated.contains(&event.body_a) {
                        invalidated.push(event.body_a);
                    }
                    if !invalidated.contains(&event.body_b) {
                        invalidated.push(event.body_b);
                    }
                }
            }

            // Every prediction involving a deflected body is now stale
            for &body in &invalidated {
                self.registry.remove_events_for(body);
            }

            // Re-detect the deflected bodies against the rest of the world
            // over the remaining interval
            let remaining = interval - processed;
            for &body in &invalidated {
                for &other in &roots {
                    if other == body {
                        continue;
                    }

                    let events = CollisionDetector::detect_pair(
                        &self.bodies,
                        body,
                        other,
                        remaining,
                        processed,
                    )?;
                    for event in events {
                        self.registry.insert(event);
                    }
                }
            }

            // Advance to the next contact, or the end of the tick
            let next = self.registry.next_time().unwrap_or(interval).min(interval);
            let step = next - processed;
            if step > 0.0 {
                for &root in &roots {
                    hierarchy::integrate(&mut self.bodies, root, step)?;
                }
            }

            processed = next;
        }

        self.time += interval;

        Ok(())
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}
