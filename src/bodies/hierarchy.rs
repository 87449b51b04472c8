//! Derived-state passes and world-frame queries over the body arena.
//!
//! Each tick runs the passes in a fixed order, every pass reading only
//! fields written by earlier ones: acceleration/damping, mass (post-order),
//! center of mass (needs mass), moment of inertia (needs mass and center of
//! mass), bounding circle (post-order), then integration between collision
//! events.

use std::f32::consts::PI;

use crate::bodies::{Circle, PhysicsBody};
use crate::core::{BodyHandle, BodyStorage, SimulationConfig};
use crate::error::PhysicsError;
use crate::math::{convert_angular_velocity, Vector2};
use crate::Result;

/// World-frame position and angle of a body, composed up the parent chain
pub fn world_transform(
    bodies: &BodyStorage<PhysicsBody>,
    handle: BodyHandle,
) -> Result<(Vector2, f32)> {
    let body = bodies.get_body(handle)?;

    match body.get_parent() {
        None => Ok((body.get_position(), body.get_angle())),
        Some(parent) => {
            let (parent_position, parent_angle) = world_transform(bodies, parent)?;
            Ok((
                parent_position + body.get_position().rotate(parent_angle),
                parent_angle + body.get_angle(),
            ))
        }
    }
}

/// World-frame linear and angular velocity of a body.
///
/// The linear part composes each ancestor's velocity with the displacement
/// its angular velocity induces at this body's offset; the angular part is
/// the sum of the chain's angular velocities.
pub fn world_velocity(
    bodies: &BodyStorage<PhysicsBody>,
    handle: BodyHandle,
) -> Result<(Vector2, f32)> {
    let body = bodies.get_body(handle)?;

    match body.get_parent() {
        None => Ok((body.get_velocity(), body.get_angular_velocity())),
        Some(parent) => {
            let (parent_velocity, parent_angular) = world_velocity(bodies, parent)?;
            let (_, parent_angle) = world_transform(bodies, parent)?;

            let offset = body.get_position().rotate(parent_angle);
            let velocity = parent_velocity
                + convert_angular_velocity(parent_angular, offset)
                + body.get_velocity().rotate(parent_angle);

            Ok((velocity, parent_angular + body.get_angular_velocity()))
        }
    }
}

/// World-frame position of a circle owned by `handle`
pub fn circle_world_position(
    bodies: &BodyStorage<PhysicsBody>,
    handle: BodyHandle,
    circle: &Circle,
) -> Result<Vector2> {
    let (position, angle) = world_transform(bodies, handle)?;
    Ok(position + circle.scaled_position().rotate(angle))
}

/// World-frame velocity of a circle owned by `handle`
pub fn circle_world_velocity(
    bodies: &BodyStorage<PhysicsBody>,
    handle: BodyHandle,
    circle: &Circle,
) -> Result<Vector2> {
    let (velocity, angular_velocity) = world_velocity(bodies, handle)?;
    let (_, angle) = world_transform(bodies, handle)?;

    let offset = circle.scaled_position().rotate(angle);
    Ok(velocity + convert_angular_velocity(angular_velocity, offset))
}

/// Applies pending impulses and friction damping over the subtree
pub fn update_acceleration(
    bodies: &mut BodyStorage<PhysicsBody>,
    handle: BodyHandle,
    config: &SimulationConfig,
    interval: f32,
) -> Result<()> {
    let children = bodies.get_body(handle)?.get_children().to_vec();

    bodies.get_body_mut(handle)?.update_acceleration(config, interval);

    for child in children {
        update_acceleration(bodies, child, config, interval)?;
    }

    Ok(())
}

/// Recomputes subtree masses, children first
pub fn update_mass(bodies: &mut BodyStorage<PhysicsBody>, handle: BodyHandle) -> Result<()> {
    let children = bodies.get_body(handle)?.get_children().to_vec();

    let mut mass = 0.0;
    for &child in &children {
        update_mass(bodies, child)?;
        mass += bodies.get_body(child)?.get_mass();
    }

    let body = bodies.get_body_mut(handle)?;
    for circle in body.get_circles() {
        mass += circle.get_mass();
    }
    body.set_mass(mass);

    Ok(())
}

/// Recomputes world-frame centers of mass, children first.
///
/// Requires the mass pass. A zero subtree mass leaves the center of mass
/// undefined and is reported as a configuration error.
pub fn update_center_of_mass(
    bodies: &mut BodyStorage<PhysicsBody>,
    handle: BodyHandle,
) -> Result<()> {
    let children = bodies.get_body(handle)?.get_children().to_vec();

    for &child in &children {
        update_center_of_mass(bodies, child)?;
    }

    let mut weighted = Vector2::zero();
    let mut mass = 0.0;

    for &child in &children {
        let child_body = bodies.get_body(child)?;
        weighted += child_body.get_center_of_mass() * child_body.get_mass();
        mass += child_body.get_mass();
    }

    let body = bodies.get_body(handle)?;
    for circle in body.get_circles() {
        let position = circle_world_position(bodies, handle, circle)?;
        weighted += position * circle.get_mass();
        mass += circle.get_mass();
    }

    if mass <= 0.0 {
        return Err(PhysicsError::InvalidConfiguration(format!(
            "body {:?} has zero total mass",
            handle
        )));
    }

    bodies.get_body_mut(handle)?.set_center_of_mass(weighted / mass);

    Ok(())
}

/// Recomputes moments of inertia about each body's center of mass.
///
/// Requires the mass and center-of-mass passes.
pub fn update_moment_of_inertia(
    bodies: &mut BodyStorage<PhysicsBody>,
    handle: BodyHandle,
) -> Result<()> {
    let children = bodies.get_body(handle)?.get_children().to_vec();

    for &child in &children {
        update_moment_of_inertia(bodies, child)?;
    }

    let center_of_mass = bodies.get_body(handle)?.get_center_of_mass();
    let inertia = accumulate_inertia(bodies, handle, center_of_mass)?;
    bodies.get_body_mut(handle)?.set_moment_of_inertia(inertia);

    Ok(())
}

fn accumulate_inertia(
    bodies: &BodyStorage<PhysicsBody>,
    handle: BodyHandle,
    center_of_mass: Vector2,
) -> Result<f32> {
    let body = bodies.get_body(handle)?;
    let mut inertia = 0.0;

    for circle in body.get_circles() {
        let position = circle_world_position(bodies, handle, circle)?;
        let radius = circle.effective_radius();
        let offset_squared = position.distance_squared(&center_of_mass);

        inertia += 2.0
            * PI
            * circle.get_density()
            * radius
            * radius
            * (2.0 * offset_squared + radius * radius);
    }

    for &child in body.get_children() {
        inertia += accumulate_inertia(bodies, child, center_of_mass)?;
    }

    Ok(inertia)
}

/// Recomputes bounding circles, children first.
///
/// A body's bounding circle is centered on the count-weighted average of
/// its children's and circles' bounding centers, with a radius reaching the
/// farthest bounding edge: conservative, not minimal. A body with neither
/// children nor circles has no meaningful bound and is reported as a
/// configuration error.
pub fn update_bounding_circle(
    bodies: &mut BodyStorage<PhysicsBody>,
    handle: BodyHandle,
) -> Result<()> {
    let children = bodies.get_body(handle)?.get_children().to_vec();

    for &child in &children {
        update_bounding_circle(bodies, child)?;
    }

    {
        let body = bodies.get_body_mut(handle)?;
        for circle in body.circles_mut() {
            circle.update_bounding_circle();
        }
    }

    let mut entries: Vec<(Vector2, f32)> = Vec::new();
    {
        let body = bodies.get_body(handle)?;

        for &child in body.get_children() {
            let child_body = bodies.get_body(child)?;
            let bounding = child_body.get_bounding_circle();
            entries.push((
                child_body.get_position() + bounding.get_position(),
                bounding.get_radius(),
            ));
        }

        for circle in body.get_circles() {
            let bounding = circle.get_bounding_circle();
            entries.push((bounding.get_position(), bounding.get_radius()));
        }
    }

    if entries.is_empty() {
        return Err(PhysicsError::InvalidConfiguration(format!(
            "body {:?} has no circles or child bodies",
            handle
        )));
    }

    let mut average = Vector2::zero();
    for (position, _) in &entries {
        average += *position;
    }
    average /= entries.len() as f32;

    let mut max_distance = 0.0f32;
    for (position, radius) in &entries {
        max_distance = max_distance.max(position.distance(&average) + radius);
    }

    let bounding = bodies.get_body_mut(handle)?.bounding_circle_mut();
    bounding.set_position(average);
    bounding.set_radius(max_distance);

    Ok(())
}

/// Integrates position and angle over the subtree
pub fn integrate(
    bodies: &mut BodyStorage<PhysicsBody>,
    handle: BodyHandle,
    interval: f32,
) -> Result<()> {
    let children = bodies.get_body(handle)?.get_children().to_vec();

    bodies.get_body_mut(handle)?.integrate(interval);

    for child in children {
        integrate(bodies, child, interval)?;
    }

    Ok(())
}
