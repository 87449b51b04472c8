use crate::bodies::{hierarchy, Circle, PhysicsBody};
use crate::collision::BoundingCircle;
use crate::core::{BodyHandle, BodyStorage, CollisionEvent};
use crate::math::{closest_point_on_segment, Vector2};
use crate::Result;

/// Conservative sweep test between two bounding circles.
///
/// Passing is necessary but not sufficient for a collision within the
/// interval: the combined relative displacement is folded into the radius
/// sum, so a `false` result proves the pair cannot touch and the traversal
/// can stop descending.
pub fn detect_potential_collision(
    bounding_a: &BoundingCircle,
    bounding_b: &BoundingCircle,
    position_a: Vector2,
    position_b: Vector2,
    velocity_a: Vector2,
    velocity_b: Vector2,
    interval: f32,
) -> bool {
    let displacement = (velocity_a - velocity_b) * interval;

    let center_a = position_a + bounding_a.get_position();
    let center_b = position_b + bounding_b.get_position();

    let reach = bounding_a.get_radius() + bounding_b.get_radius() + displacement.length();
    center_a.distance_squared(&center_b) <= reach * reach
}

/// Exact time of first contact between two circles under constant relative
/// velocity, within `[0, interval]`.
///
/// Works in A's swept frame: B is held fixed while A travels the combined
/// relative displacement. The closest approach on that segment decides
/// whether the radii ever overlap; if so, the contact center is found by
/// backing off along the travel direction, and the arc length traveled
/// converts to a fraction of the interval. Fractions outside [0, 1] are
/// rejected, which also discards pairs already overlapping at the interval
/// start.
pub fn detect_collision_time(
    circle_a: &Circle,
    circle_b: &Circle,
    position_a: Vector2,
    position_b: Vector2,
    velocity_a: Vector2,
    velocity_b: Vector2,
    interval: f32,
) -> Option<f32> {
    let displacement = (velocity_a - velocity_b) * interval;
    let combined = displacement.length();
    if combined <= 0.0 {
        // Identical motion cannot produce a new contact
        return None;
    }

    let start = position_a + circle_a.scaled_position();
    let center_b = position_b + circle_b.scaled_position();

    let closest = closest_point_on_segment(start, start + displacement, center_b);
    let distance_squared = closest.distance_squared(&center_b);

    let radius_total = circle_a.effective_radius() + circle_b.effective_radius();
    if distance_squared > radius_total * radius_total {
        return None;
    }

    let back_off = (radius_total * radius_total - distance_squared).sqrt();
    let direction = displacement / combined;
    let contact_center = closest - direction * back_off;

    let fraction = (contact_center - start).dot(&direction) / combined;
    if !(0.0..=1.0).contains(&fraction) {
        return None;
    }

    Some(fraction * interval)
}

/// Contact point between two circles whose centers are exactly a radius
/// sum apart.
///
/// Only valid for centers advanced to the predicted impact instant; the
/// point divides the center line at the ratio of A's radius.
pub fn detect_collision_point(
    circle_a: &Circle,
    circle_b: &Circle,
    center_a: Vector2,
    center_b: Vector2,
) -> Vector2 {
    let fraction = circle_a.effective_radius()
        / (circle_a.effective_radius() + circle_b.effective_radius());
    center_a + (center_b - center_a) * fraction
}

/// Recursive pairwise traversal of two body hierarchies.
///
/// Position and velocity offsets accumulate translationally down the
/// trees, matching the bounding-circle frames. Body-versus-body tests only
/// prune; every event comes from a leaf circle pair and is tagged with the
/// two ROOT handles, since resolution acts on whole rigid assemblies.
pub struct CollisionDetector;

impl CollisionDetector {
    /// Detects every collision between the hierarchies rooted at `root_a`
    /// and `root_b` within `interval`, offsetting event times by
    /// `time_offset`
    pub fn detect_pair(
        bodies: &BodyStorage<PhysicsBody>,
        root_a: BodyHandle,
        root_b: BodyHandle,
        interval: f32,
        time_offset: f32,
    ) -> Result<Vec<CollisionEvent>> {
        let mut events = Vec::new();

        Self::detect_bodies(
            bodies,
            (root_a, root_b),
            (root_a, root_b),
            (Vector2::zero(), Vector2::zero()),
            (Vector2::zero(), Vector2::zero()),
            interval,
            time_offset,
            &mut events,
        )?;

        Ok(events)
    }

    #[allow(clippy::too_many_arguments)]
    fn detect_bodies(
        bodies: &BodyStorage<PhysicsBody>,
        roots: (BodyHandle, BodyHandle),
        handles: (BodyHandle, BodyHandle),
        position_offsets: (Vector2, Vector2),
        velocity_offsets: (Vector2, Vector2),
        interval: f32,
        time_offset: f32,
        events: &mut Vec<CollisionEvent>,
    ) -> Result<()> {
        let (handle_a, handle_b) = handles;
        let body_a = bodies.get_body(handle_a)?;
        let body_b = bodies.get_body(handle_b)?;

        let position_a = position_offsets.0 + body_a.get_position();
        let position_b = position_offsets.1 + body_b.get_position();
        let velocity_a = velocity_offsets.0 + body_a.get_velocity();
        let velocity_b = velocity_offsets.1 + body_b.get_velocity();

        if !detect_potential_collision(
            body_a.get_bounding_circle(),
            body_b.get_bounding_circle(),
            position_a,
            position_b,
            velocity_a,
            velocity_b,
            interval,
        ) {
            return Ok(());
        }

        // Body A against B's children
        for &child_b in body_b.get_children() {
            Self::detect_bodies(
                bodies,
                roots,
                (handle_a, child_b),
                (position_offsets.0, position_b),
                (velocity_offsets.0, velocity_b),
                interval,
                time_offset,
                events,
            )?;
        }

        // Body B against A's children
        for &child_a in body_a.get_children() {
            Self::detect_bodies(
                bodies,
                roots,
                (child_a, handle_b),
                (position_a, position_offsets.1),
                (velocity_a, velocity_offsets.1),
                interval,
                time_offset,
                events,
            )?;
        }

        // All child pairs
        for &child_a in body_a.get_children() {
            for &child_b in body_b.get_children() {
                Self::detect_bodies(
                    bodies,
                    roots,
                    (child_a, child_b),
                    (position_a, position_b),
                    (velocity_a, velocity_b),
                    interval,
                    time_offset,
                    events,
                )?;
            }
        }

        // Leaf circle pairs are the only event sources
        for circle_a in body_a.get_circles() {
            for circle_b in body_b.get_circles() {
                let relative_time = match detect_collision_time(
                    circle_a, circle_b, position_a, position_b, velocity_a, velocity_b, interval,
                ) {
                    Some(time) => time,
                    None => continue,
                };

                let advanced_a =
                    position_a + circle_a.scaled_position() + velocity_a * relative_time;
                let advanced_b =
                    position_b + circle_b.scaled_position() + velocity_b * relative_time;

                let point = detect_collision_point(circle_a, circle_b, advanced_a, advanced_b);
                let normal = (advanced_a - advanced_b).normalize();

                events.push(CollisionEvent {
                    time: time_offset + relative_time,
                    body_a: roots.0,
                    body_b: roots.1,
                    point,
                    normal,
                    point_velocity_a: hierarchy::circle_world_velocity(bodies, handle_a, circle_a)?,
                    point_velocity_b: hierarchy::circle_world_velocity(bodies, handle_b, circle_b)?,
                });
            }
        }

        Ok(())
    }
}
