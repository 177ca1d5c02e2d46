use catapult2d::{
    collider::Aabb,
    collision::{self, Side},
    Body, Entities, LinkConstraint, Scene, UnitConverter,
};
use glam::Vec2;
use proptest::prelude::*;

fn vec2(range: std::ops::Range<f32>) -> impl Strategy<Value = Vec2> {
    (range.clone(), range).prop_map(|(x, y)| Vec2::new(x, y))
}

// =============================================================================
// Units and integration
// =============================================================================

proptest! {
    #[test]
    fn unit_conversion_round_trips(
        scale in 0.001f32..100.0,
        v in vec2(-1e4..1e4),
    ) {
        let units = UnitConverter::new(scale).unwrap();
        let back = units.to_physical_units(units.to_world_units(v));
        prop_assert!(
            (back - v).length() <= v.length() * 1e-5 + 1e-6,
            "round trip drifted: {} -> {}", v, back
        );
    }

    #[test]
    fn drag_never_reverses_velocity(
        v in vec2(-500.0..500.0),
        k in 0.0f32..50.0,
        dt in 0.001f32..0.5,
    ) {
        let mut body = Body::euler().drag(k).with_velocity(v);
        body.apply_environment(0.0, dt);

        for (before, after) in [(v.x, body.velocity.x), (v.y, body.velocity.y)] {
            prop_assert!(after.abs() <= before.abs() + 1e-3);
            prop_assert!(after == 0.0 || after.signum() == before.signum());
        }
    }

    #[test]
    fn kinematic_bodies_never_move(
        start in vec2(-100.0..100.0),
        v in vec2(-100.0..100.0),
        a in vec2(-100.0..100.0),
        verlet in any::<bool>(),
    ) {
        let units = UnitConverter::default();
        let body = if verlet { Body::verlet() } else { Body::euler() };
        let mut body = body.kinematic(true).with_velocity(v).with_acceleration(a);
        let mut position = start;

        for _ in 0..5 {
            body.apply_environment(9.8, 0.02);
            body.physics_step(&mut position, 0.02, &units);
        }

        prop_assert_eq!(position, start);
        prop_assert_eq!(body.velocity, Vec2::ZERO);
        prop_assert_eq!(body.acceleration, Vec2::ZERO);
    }
}

// =============================================================================
// Constraints and contacts
// =============================================================================

proptest! {
    #[test]
    fn link_solve_hits_rest_distance(
        a in vec2(-50.0..50.0),
        b in vec2(-50.0..50.0),
        rest in 0.1f32..20.0,
    ) {
        prop_assume!(a.distance(b) > 1e-2);
        let mut scene = Entities::new();
        let ea = scene.spawn_at(a);
        let eb = scene.spawn_at(b);

        LinkConstraint::with_distance(ea, eb, rest).solve(&mut scene);

        let d = scene.position(ea).unwrap().distance(scene.position(eb).unwrap());
        prop_assert!((d - rest).abs() < 1e-3 * rest.max(a.distance(b)), "distance {} rest {}", d, rest);
        // The midpoint is preserved
        let mid = (scene.position(ea).unwrap() + scene.position(eb).unwrap()) * 0.5;
        prop_assert!((mid - (a + b) * 0.5).length() < 1e-3);
    }

    #[test]
    fn circle_box_escape_clears_the_box(
        offset in vec2(-2.0..2.0),
        velocity in vec2(-10.0..10.0),
        radius in 0.05f32..1.0,
    ) {
        let bounds = Aabb::new(Vec2::ZERO, 2.0, 1.0);
        let circle = Side {
            position: offset,
            velocity,
            is_kinematic: false,
            bounciness: 0.0,
        };

        if let Some(contact) = collision::circle_box(&circle, radius, &bounds, Vec2::ZERO) {
            let moved = offset + contact.mtv;
            let gap = bounds.closest_point(moved).distance(moved);
            prop_assert!(gap >= radius - 1e-4, "still inside: gap {} radius {}", gap, radius);
            prop_assert!(contact.mtv.x == 0.0 || contact.mtv.y == 0.0);
        }
    }

    #[test]
    fn circles_leaving_an_edge_are_ignored(
        center in vec2(-1.0..1.0),
        velocity in vec2(-10.0..10.0),
        radius in 0.05f32..1.0,
    ) {
        // Edge along +x faces +y
        let (start, end) = (Vec2::new(-2.0, 0.0), Vec2::new(2.0, 0.0));
        let contact = collision::circle_edge(center, radius, velocity, start, end);
        if velocity.y >= 0.0 {
            prop_assert!(contact.is_none());
        }
        if let Some(contact) = contact {
            prop_assert_eq!(contact.normal, Vec2::Y);
        }
    }
}
