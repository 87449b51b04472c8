use impulse2d::{BodyHandle, Circle, PhysicsBody, PhysicsWorld, SimulationConfig, Vector2};
use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::PI;

/// Builds a free body carrying a single circle centered on its origin
fn ball(position: Vector2, velocity: Vector2, radius: f32) -> PhysicsBody {
    let mut body = PhysicsBody::new();
    body.set_position(position);
    body.set_velocity(velocity);
    body.add_circle(Circle::new(Vector2::zero(), radius).unwrap());
    body
}

#[test]
fn test_head_on_collision_swaps_velocities() {
    let mut world = PhysicsWorld::new();
    let a = world.add_physics_body(ball(Vector2::new(-2.0, 0.0), Vector2::new(1.0, 0.0), 1.0));
    let b = world.add_physics_body(ball(Vector2::new(2.0, 0.0), Vector2::new(-1.0, 0.0), 1.0));

    world.update(2.0).unwrap();

    // Equal masses with elasticity 1: the exact elastic 1D result swaps
    // the velocities
    let velocity_a = world.get_body(a).unwrap().get_velocity();
    let velocity_b = world.get_body(b).unwrap().get_velocity();
    assert_relative_eq!(velocity_a.x, -1.0, epsilon = 1e-5);
    assert_relative_eq!(velocity_a.y, 0.0, epsilon = 1e-5);
    assert_relative_eq!(velocity_b.x, 1.0, epsilon = 1e-5);
    assert_relative_eq!(velocity_b.y, 0.0, epsilon = 1e-5);

    // Contact at t = 1, then one second of rebound returns both bodies to
    // their starting positions
    let position_a = world.get_body(a).unwrap().get_position();
    let position_b = world.get_body(b).unwrap().get_position();
    assert_relative_eq!(position_a.x, -2.0, epsilon = 1e-4);
    assert_relative_eq!(position_b.x, 2.0, epsilon = 1e-4);

    let resolved = world.resolved_collisions();
    assert_eq!(resolved.len(), 1);
    assert_relative_eq!(resolved[0].time, 1.0, epsilon = 1e-5);
    assert!(resolved[0].impulse > 0.0);
    assert_relative_eq!(resolved[0].point.x, 0.0, epsilon = 1e-4);
}

#[test]
fn test_stationary_target_takes_full_velocity() {
    let mut world = PhysicsWorld::new();
    let a = world.add_physics_body(ball(Vector2::new(-3.0, 0.0), Vector2::new(1.0, 0.0), 1.0));
    let b = world.add_physics_body(ball(Vector2::new(0.0, 0.0), Vector2::zero(), 1.0));

    world.update(2.0).unwrap();

    let velocity_a = world.get_body(a).unwrap().get_velocity();
    let velocity_b = world.get_body(b).unwrap().get_velocity();
    assert_relative_eq!(velocity_a.x, 0.0, epsilon = 1e-5);
    assert_relative_eq!(velocity_b.x, 1.0, epsilon = 1e-5);

    let position_a = world.get_body(a).unwrap().get_position();
    let position_b = world.get_body(b).unwrap().get_position();
    assert_relative_eq!(position_a.x, -2.0, epsilon = 1e-4);
    assert_relative_eq!(position_b.x, 1.0, epsilon = 1e-4);
}

#[test]
fn test_parallel_trajectories_never_collide() {
    let mut world = PhysicsWorld::new();
    let a = world.add_physics_body(ball(Vector2::new(0.0, 0.0), Vector2::new(1.0, 0.0), 1.0));
    let b = world.add_physics_body(ball(Vector2::new(0.0, 5.0), Vector2::new(1.0, 0.0), 1.0));

    world.update(1.0).unwrap();

    assert!(world.resolved_collisions().is_empty());

    // Plain integration only
    let body_a = world.get_body(a).unwrap();
    let body_b = world.get_body(b).unwrap();
    assert_relative_eq!(body_a.get_velocity().x, 1.0);
    assert_relative_eq!(body_b.get_velocity().x, 1.0);
    assert_relative_eq!(body_a.get_position().x, 1.0, epsilon = 1e-6);
    assert_relative_eq!(body_a.get_position().y, 0.0, epsilon = 1e-6);
    assert_relative_eq!(body_b.get_position().x, 1.0, epsilon = 1e-6);
    assert_relative_eq!(body_b.get_position().y, 5.0, epsilon = 1e-6);
}

#[test]
fn test_elastic_collision_conserves_energy_and_momentum() {
    let mut world = PhysicsWorld::new();
    let a = world.add_physics_body(ball(Vector2::new(-3.0, 0.0), Vector2::new(2.0, 0.0), 1.0));
    let b = world.add_physics_body(ball(Vector2::new(1.0, 0.0), Vector2::new(-1.0, 0.0), 0.5));

    let mass_a = PI;
    let mass_b = PI * 0.25;
    let energy_before = 0.5 * (mass_a * 4.0 + mass_b * 1.0);
    let momentum_before = mass_a * 2.0 + mass_b * (-1.0);

    world.update(1.5).unwrap();
    assert_eq!(world.resolved_collisions().len(), 1);

    let body_a = world.get_body(a).unwrap();
    let body_b = world.get_body(b).unwrap();
    let velocity_a = body_a.get_velocity();
    let velocity_b = body_b.get_velocity();

    // Exact elastic 1D solution for these masses
    assert_relative_eq!(velocity_a.x, 0.8, epsilon = 1e-4);
    assert_relative_eq!(velocity_b.x, 3.8, epsilon = 1e-4);

    let energy_after = 0.5
        * (body_a.get_mass() * velocity_a.length_squared()
            + body_b.get_mass() * velocity_b.length_squared());
    let momentum_after = body_a.get_mass() * velocity_a.x + body_b.get_mass() * velocity_b.x;

    assert_relative_eq!(energy_after, energy_before, max_relative = 1e-4);
    assert_relative_eq!(momentum_after, momentum_before, max_relative = 1e-4);
}

#[test]
fn test_no_interpenetration_after_update() {
    let mut world = PhysicsWorld::new();
    let a = world.add_physics_body(ball(Vector2::new(-2.0, 0.0), Vector2::new(1.0, 0.0), 1.0));
    let b = world.add_physics_body(ball(Vector2::new(2.0, 0.0), Vector2::new(-1.0, 0.0), 1.0));

    // Contact happens at t = 1, well inside the tick
    world.update(1.2).unwrap();
    assert_eq!(world.resolved_collisions().len(), 1);

    let center_a = world.get_circle_world_position(a, 0).unwrap();
    let center_b = world.get_circle_world_position(b, 0).unwrap();
    assert!(center_a.distance(&center_b) >= 2.0 - 1e-4);
}

fn random_world(seed: u64) -> (PhysicsWorld, Vec<BodyHandle>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut world = PhysicsWorld::new();
    let mut handles = Vec::new();

    for i in 0..3 {
        for j in 0..2 {
            let position = Vector2::new(
                i as f32 * 4.0 + rng.gen_range(-0.5..0.5),
                j as f32 * 4.0 + rng.gen_range(-0.5..0.5),
            );
            let velocity = Vector2::new(rng.gen_range(-2.0..2.0), rng.gen_range(-2.0..2.0));
            handles.push(world.add_physics_body(ball(position, velocity, 1.0)));
        }
    }

    (world, handles)
}

#[test]
fn test_update_is_deterministic() {
    let (mut first, first_handles) = random_world(42);
    let (mut second, second_handles) = random_world(42);

    for _ in 0..10 {
        first.update(0.1).unwrap();
        second.update(0.1).unwrap();
    }

    // Bit-identical replay: no outcome may depend on unordered iteration
    for (&handle_a, &handle_b) in first_handles.iter().zip(&second_handles) {
        let body_a = first.get_body(handle_a).unwrap();
        let body_b = second.get_body(handle_b).unwrap();

        assert_eq!(body_a.get_position().x.to_bits(), body_b.get_position().x.to_bits());
        assert_eq!(body_a.get_position().y.to_bits(), body_b.get_position().y.to_bits());
        assert_eq!(body_a.get_velocity().x.to_bits(), body_b.get_velocity().x.to_bits());
        assert_eq!(body_a.get_velocity().y.to_bits(), body_b.get_velocity().y.to_bits());
        assert_eq!(body_a.get_angle().to_bits(), body_b.get_angle().to_bits());
        assert_eq!(
            body_a.get_angular_velocity().to_bits(),
            body_b.get_angular_velocity().to_bits()
        );
    }
}

#[test]
fn test_tree_edges_stay_consistent() {
    let mut world = PhysicsWorld::new();

    let mut root_body = PhysicsBody::new();
    root_body.add_circle(Circle::new(Vector2::zero(), 1.0).unwrap());
    let root = world.add_physics_body(root_body);

    let mut child_body = PhysicsBody::new();
    child_body.set_position(Vector2::new(2.0, 0.0));
    child_body.add_circle(Circle::new(Vector2::zero(), 0.5).unwrap());
    let child = world.add_child_body(root, child_body).unwrap();

    let mut grandchild_body = PhysicsBody::new();
    grandchild_body.set_position(Vector2::new(1.0, 0.0));
    grandchild_body.add_circle(Circle::new(Vector2::zero(), 0.25).unwrap());
    let grandchild = world.add_child_body(child, grandchild_body).unwrap();

    let check = |world: &PhysicsWorld| {
        assert_eq!(world.get_body(root).unwrap().get_parent(), None);
        assert_eq!(world.get_body(child).unwrap().get_parent(), Some(root));
        assert_eq!(world.get_body(grandchild).unwrap().get_parent(), Some(child));
        assert!(world.get_body(root).unwrap().get_children().contains(&child));
        assert!(world.get_body(child).unwrap().get_children().contains(&grandchild));
        assert!(world.get_body(grandchild).unwrap().get_children().is_empty());
    };

    check(&world);
    world.update(0.5).unwrap();
    check(&world);
}

#[test]
fn test_derived_aggregates_for_compound_body() {
    let mut world = PhysicsWorld::new();

    let mut body = PhysicsBody::new();
    body.set_position(Vector2::new(5.0, 0.0));
    body.add_circle(Circle::new(Vector2::new(-1.0, 0.0), 1.0).unwrap());
    body.add_circle(Circle::new(Vector2::new(1.0, 0.0), 1.0).unwrap());
    let handle = world.add_physics_body(body);

    world.update(0.1).unwrap();

    let body = world.get_body(handle).unwrap();

    // Two unit disks of density 1
    assert_relative_eq!(body.get_mass(), 2.0 * PI, epsilon = 1e-4);

    // World-frame center of mass sits on the body origin
    let center_of_mass = body.get_center_of_mass();
    assert_relative_eq!(center_of_mass.x, 5.0, epsilon = 1e-4);
    assert_relative_eq!(center_of_mass.y, 0.0, epsilon = 1e-4);

    // Each disk offset by 1 from the center of mass
    let expected_inertia = 2.0 * (2.0 * PI * (2.0 + 1.0));
    assert_relative_eq!(body.get_moment_of_inertia(), expected_inertia, max_relative = 1e-4);

    // Bounding circle spans both disks, centered between them
    let bounding = body.get_bounding_circle();
    assert_relative_eq!(bounding.get_position().x, 0.0, epsilon = 1e-5);
    assert_relative_eq!(bounding.get_radius(), 2.0, epsilon = 1e-5);
}

#[test]
fn test_world_transforms_compose_through_the_tree() {
    let mut world = PhysicsWorld::new();

    let mut root_body = PhysicsBody::new();
    root_body.set_angle(PI / 2.0);
    root_body.add_circle(Circle::new(Vector2::zero(), 0.5).unwrap());
    let root = world.add_physics_body(root_body);

    let mut child_body = PhysicsBody::new();
    child_body.set_position(Vector2::new(1.0, 0.0));
    child_body.add_circle(Circle::new(Vector2::new(1.0, 0.0), 0.5).unwrap());
    let child = world.add_child_body(root, child_body).unwrap();

    let (position, angle) = world.get_world_transform(child).unwrap();
    assert_relative_eq!(position.x, 0.0, epsilon = 1e-6);
    assert_relative_eq!(position.y, 1.0, epsilon = 1e-6);
    assert_relative_eq!(angle, PI / 2.0, epsilon = 1e-6);

    // The child's circle offset rotates through the accumulated angle
    let circle_position = world.get_circle_world_position(child, 0).unwrap();
    assert_relative_eq!(circle_position.x, 0.0, epsilon = 1e-6);
    assert_relative_eq!(circle_position.y, 2.0, epsilon = 1e-6);

    // The scale factor stretches the offset before rotation
    world
        .get_body_mut(child)
        .unwrap()
        .get_circle_mut(0)
        .unwrap()
        .set_scale(2.0)
        .unwrap();
    let scaled_position = world.get_circle_world_position(child, 0).unwrap();
    assert_relative_eq!(scaled_position.x, 0.0, epsilon = 1e-6);
    assert_relative_eq!(scaled_position.y, 3.0, epsilon = 1e-6);
}

#[test]
fn test_resolving_first_collision_reroutes_later_one() {
    let mut world = PhysicsWorld::new();
    let a = world.add_physics_body(ball(Vector2::new(-4.0, 0.0), Vector2::new(4.0, 0.0), 1.0));
    let b = world.add_physics_body(ball(Vector2::new(0.0, 0.0), Vector2::zero(), 1.0));
    let c = world.add_physics_body(ball(Vector2::new(4.0, 0.0), Vector2::new(-1.0, 0.0), 1.0));

    world.update(3.0).unwrap();

    // A hits B at t = 0.5 and stops; B races ahead and meets C much
    // earlier than the initially scheduled B-C contact, which must have
    // been recomputed; B then rebounds into the stopped A at t = 2
    let resolved = world.resolved_collisions();
    assert_eq!(resolved.len(), 3);
    assert_relative_eq!(resolved[0].time, 0.5, epsilon = 1e-4);
    assert_relative_eq!(resolved[1].time, 0.8, epsilon = 1e-4);
    assert_relative_eq!(resolved[2].time, 2.0, epsilon = 1e-4);

    let velocity_a = world.get_body(a).unwrap().get_velocity();
    let velocity_b = world.get_body(b).unwrap().get_velocity();
    let velocity_c = world.get_body(c).unwrap().get_velocity();
    assert_relative_eq!(velocity_a.x, -1.0, epsilon = 1e-4);
    assert_relative_eq!(velocity_b.x, 0.0, epsilon = 1e-4);
    assert_relative_eq!(velocity_c.x, 4.0, epsilon = 1e-4);

    let position_a = world.get_body(a).unwrap().get_position();
    let position_b = world.get_body(b).unwrap().get_position();
    let position_c = world.get_body(c).unwrap().get_position();
    assert_relative_eq!(position_a.x, -3.0, epsilon = 1e-3);
    assert_relative_eq!(position_b.x, 0.0, epsilon = 1e-3);
    assert_relative_eq!(position_c.x, 12.0, epsilon = 1e-3);
}

#[test]
fn test_off_center_hit_spins_the_target() {
    let mut world = PhysicsWorld::new();

    let projectile =
        world.add_physics_body(ball(Vector2::new(-3.0, 1.0), Vector2::new(1.0, 0.0), 0.5));

    // A vertical dumbbell: two disks either side of the center of mass
    let mut dumbbell = PhysicsBody::new();
    dumbbell.add_circle(Circle::new(Vector2::new(0.0, 1.0), 0.5).unwrap());
    dumbbell.add_circle(Circle::new(Vector2::new(0.0, -1.0), 0.5).unwrap());
    let target = world.add_physics_body(dumbbell);

    let mass_projectile = PI * 0.25;
    let mass_target = PI * 0.5;

    world.update(2.5).unwrap();
    assert_eq!(world.resolved_collisions().len(), 1);

    let velocity_projectile = world.get_body(projectile).unwrap().get_velocity();
    let target_body = world.get_body(target).unwrap();
    let velocity_target = target_body.get_velocity();

    // The hit lands above the target's center of mass: the target picks up
    // forward velocity and clockwise spin, the projectile slows
    assert!(velocity_target.x > 0.0);
    assert!(target_body.get_angular_velocity() < 0.0);
    assert!(velocity_projectile.x < 1.0);

    // The impulse acts along x, so y velocities stay untouched and linear
    // momentum is conserved
    assert_relative_eq!(velocity_projectile.y, 0.0, epsilon = 1e-5);
    assert_relative_eq!(velocity_target.y, 0.0, epsilon = 1e-5);

    let momentum_after =
        mass_projectile * velocity_projectile.x + mass_target * velocity_target.x;
    assert_relative_eq!(momentum_after, mass_projectile * 1.0, max_relative = 1e-4);
}

#[test]
fn test_friction_slows_and_snaps_velocities() {
    let config = SimulationConfig {
        friction: 1.0,
        angular_friction: 0.5,
        ..SimulationConfig::default()
    };
    let mut world = PhysicsWorld::with_config(config);

    let mut body = ball(Vector2::zero(), Vector2::new(3.0, 0.0), 1.0);
    body.set_angular_velocity(-2.0);
    let moving = world.add_physics_body(body);

    let creeping = world.add_physics_body(ball(
        Vector2::new(10.0, 0.0),
        Vector2::new(1.0e-4, 0.0),
        1.0,
    ));

    world.update(1.0).unwrap();

    let moving_body = world.get_body(moving).unwrap();
    assert_relative_eq!(moving_body.get_velocity().x, 2.0, epsilon = 1e-5);
    assert_relative_eq!(moving_body.get_angular_velocity(), -1.5, epsilon = 1e-5);

    // Below the epsilon the velocity snaps to exactly zero
    let creeping_body = world.get_body(creeping).unwrap();
    assert_eq!(creeping_body.get_velocity().x, 0.0);
    assert_eq!(creeping_body.get_position().x, 10.0);
}

#[test]
fn test_pending_impulse_applies_next_tick() {
    let mut world = PhysicsWorld::new();
    let handle = world.add_physics_body(ball(Vector2::zero(), Vector2::zero(), 1.0));

    // First tick populates the derived mass the impulse divides by
    world.update(0.1).unwrap();

    world.get_body_mut(handle).unwrap().apply_impulse(Vector2::new(PI, 0.0));
    world.update(1.0).unwrap();

    let body = world.get_body(handle).unwrap();
    assert_relative_eq!(body.get_velocity().x, 1.0, epsilon = 1e-5);
    assert_relative_eq!(body.get_position().x, 1.0, epsilon = 1e-4);
}

#[test]
fn test_configuration_errors_fail_fast() {
    // Negative radius is rejected at construction
    assert!(Circle::new(Vector2::zero(), -1.0).is_err());

    let mut circle = Circle::new(Vector2::zero(), 1.0).unwrap();
    assert!(circle.set_density(0.0).is_err());
    assert!(circle.set_scale(0.0).is_err());
    assert!(circle.set_radius(-2.0).is_err());

    let mut body = PhysicsBody::new();
    assert!(body.set_elasticity(1.5).is_err());
    assert!(body.set_elasticity(-0.1).is_err());
    assert!(body.set_elasticity(0.5).is_ok());

    // Non-positive or non-finite intervals are rejected
    let mut world = PhysicsWorld::new();
    world.add_physics_body(ball(Vector2::zero(), Vector2::zero(), 1.0));
    assert!(world.update(0.0).is_err());
    assert!(world.update(-1.0).is_err());
    assert!(world.update(f32::NAN).is_err());
    assert!(world.update(0.1).is_ok());

    // A body without any circles has no mass or bound to derive
    let mut empty_world = PhysicsWorld::new();
    empty_world.add_physics_body(PhysicsBody::new());
    assert!(empty_world.update(0.1).is_err());

    // A zero-radius circle carries no mass, which is equally malformed
    let mut weightless_world = PhysicsWorld::new();
    weightless_world.add_physics_body(ball(Vector2::zero(), Vector2::zero(), 0.0));
    assert!(weightless_world.update(0.1).is_err());
}

#[test]
fn test_remove_physics_body_drops_subtree() {
    let mut world = PhysicsWorld::new();

    let kept = world.add_physics_body(ball(Vector2::new(10.0, 0.0), Vector2::zero(), 1.0));

    let mut root_body = PhysicsBody::new();
    root_body.add_circle(Circle::new(Vector2::zero(), 1.0).unwrap());
    let root = world.add_physics_body(root_body);

    let mut child_body = PhysicsBody::new();
    child_body.set_position(Vector2::new(2.0, 0.0));
    child_body.add_circle(Circle::new(Vector2::zero(), 0.5).unwrap());
    let child = world.add_child_body(root, child_body).unwrap();

    assert_eq!(world.body_count(), 3);

    world.remove_physics_body(root).unwrap();
    assert_eq!(world.body_count(), 1);
    assert!(world.get_body(root).is_err());
    assert!(world.get_body(child).is_err());

    // The remaining world still simulates
    world.update(0.5).unwrap();
    assert!(world.get_body(kept).is_ok());
}

#[test]
fn test_world_time_and_clear() {
    let mut world = PhysicsWorld::new();
    world.add_physics_body(ball(Vector2::zero(), Vector2::zero(), 1.0));

    world.update(0.5).unwrap();
    world.update(0.25).unwrap();
    assert_relative_eq!(world.get_time(), 0.75);

    world.clear();
    assert_eq!(world.body_count(), 0);
    assert_eq!(world.get_time(), 0.0);
    assert!(world.resolved_collisions().is_empty());
}
