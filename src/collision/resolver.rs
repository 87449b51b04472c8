use crate::bodies::{hierarchy, PhysicsBody};
use crate::core::{BodyStorage, CollisionEvent};
use crate::Result;

/// Applies the collision impulse for `event` to both root bodies.
///
/// Returns the impulse magnitude, or `None` when the contact points are no
/// longer closing along the normal, which happens when an earlier
/// resolution this tick already pushed the pair apart. Centers of mass are
/// recomputed first because both roots have integrated forward since the
/// tick's derived-state passes ran; masses and moments of inertia are
/// rigid-motion invariant and stay valid.
pub fn resolve_collision(
    bodies: &mut BodyStorage<PhysicsBody>,
    event: &CollisionEvent,
) -> Result<Option<f32>> {
    hierarchy::update_center_of_mass(bodies, event.body_a)?;
    hierarchy::update_center_of_mass(bodies, event.body_b)?;

    let normal = event.normal;

    let body_a = bodies.get_body(event.body_a)?;
    let mass_a = body_a.get_mass();
    let inertia_a = body_a.get_moment_of_inertia();
    let elasticity_a = body_a.get_elasticity();
    let velocity_a = body_a.get_velocity();
    let angular_a = body_a.get_angular_velocity();
    let contact_a = event.point - body_a.get_center_of_mass();

    let body_b = bodies.get_body(event.body_b)?;
    let mass_b = body_b.get_mass();
    let inertia_b = body_b.get_moment_of_inertia();
    let elasticity_b = body_b.get_elasticity();
    let velocity_b = body_b.get_velocity();
    let angular_b = body_b.get_angular_velocity();
    let contact_b = event.point - body_b.get_center_of_mass();

    // Contact-point velocities: linear plus the tangential contribution of
    // the spin at the contact radius
    let point_velocity_a = velocity_a + contact_a.perpendicular() * angular_a;
    let point_velocity_b = velocity_b + contact_b.perpendicular() * angular_b;

    let relative_normal = (point_velocity_a - point_velocity_b).dot(&normal);
    if relative_normal >= 0.0 {
        // Already separating
        return Ok(None);
    }

    let elasticity = elasticity_a.max(elasticity_b);

    let denominator = 1.0 / mass_a
        + 1.0 / mass_b
        + contact_a.cross(&normal).powi(2) / inertia_a
        + contact_b.cross(&normal).powi(2) / inertia_b;

    let impulse = -(1.0 + elasticity) * relative_normal / denominator;
    let impulse_vector = normal * impulse;

    let body_a = bodies.get_body_mut(event.body_a)?;
    body_a.set_velocity(velocity_a + impulse_vector / mass_a);
    body_a.set_angular_velocity(angular_a + contact_a.cross(&impulse_vector) / inertia_a);

    let body_b = bodies.get_body_mut(event.body_b)?;
    body_b.set_velocity(velocity_b - impulse_vector / mass_b);
    body_b.set_angular_velocity(angular_b - contact_b.cross(&impulse_vector) / inertia_b);

    Ok(Some(impulse))
}
