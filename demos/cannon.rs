use std::sync::{Arc, Mutex};

use catapult2d::{
    Body, Collider, Entities, Entity, PhysicsError, PhysicsWorld, PinConstraint, Scene,
    ShapeConstraint, WindLimit,
};
use glam::Vec2;
use tracing_subscriber::EnvFilter;

const DT: f32 = 0.02;

fn main() -> Result<(), PhysicsError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut scene = Entities::new();
    let mut world = PhysicsWorld::builder()
        .wind_magnitude(3.0)
        .seed(2024)
        .build()?;
    world.set_wind_listener(|wind| tracing::info!(wind, "wind changed"));

    // Flat ground and a hill the goat should stick to
    let ground = scene.spawn_at(Vec2::new(0.0, -1.0));
    world.register_body(&scene, ground, Body::euler().kinematic(true))?;
    world.attach_collider(ground, Collider::boxed(40.0, 1.0, 0.6)?)?;

    let hill = scene.spawn_at(Vec2::new(6.0, -0.5));
    world.register_body(&scene, hill, Body::euler().kinematic(true))?;
    world.attach_collider(
        hill,
        Collider::polygon(
            vec![
                Vec2::new(-2.0, 0.0),
                Vec2::new(0.0, 1.5),
                Vec2::new(2.0, 0.0),
            ],
            0.2,
        )?,
    )?;

    // Goat: four verlet points held together by a shape constraint
    let goat = scene.spawn_at(Vec2::new(-8.0, 0.25));
    let mut hooves = Vec::new();
    for offset in [Vec2::new(-0.2, 0.0), Vec2::new(0.2, 0.0), Vec2::new(0.2, 0.4), Vec2::new(-0.2, 0.4)] {
        let point = scene.spawn_at(Vec2::new(-8.0, 0.0) + offset);
        world.register_body(&scene, point, Body::verlet().drag(0.01))?;
        world.attach_collider(point, Collider::circle(0.1, 0.3)?)?;
        hooves.push(point);
    }
    world.register_group(&scene, goat, &hooves)?;
    world.add_constraint(goat, ShapeConstraint::new(&scene, &hooves))?;
    world.set_group_velocity(goat, Vec2::new(18.0, 22.0))?;

    // Cannon ball, pushed around by the wind
    let ball = scene.spawn_at(Vec2::new(-10.0, 0.0));
    world.register_body(&scene, ball, Body::euler().drag(0.005).with_velocity(Vec2::new(25.0, 25.0)))?;
    world.attach_collider(ball, Collider::circle(0.15, 0.8)?)?;

    let touching_hill: Arc<Mutex<Vec<Entity>>> = Default::default();
    for hoof in &hooves {
        let (hoof, touched) = (*hoof, Arc::clone(&touching_hill));
        scene.set_handler(hoof, move |other: Entity| {
            if other == hill {
                if let Ok(mut touched) = touched.lock() {
                    touched.push(hoof);
                }
            }
        });
    }
    scene.set_handler(ball, move |other: Entity| tracing::info!(?other, "cannon ball hit"));

    let mut pinned = Vec::new();
    for frame in 0..600 {
        let wind = world.active_wind();
        if let Some(body) = world.body_mut(ball) {
            body.apply_wind(wind, DT, WindLimit::NonNegative);
        }

        world.step(&mut scene, DT);

        let touched: Vec<Entity> = touching_hill
            .lock()
            .map(|mut touched| touched.drain(..).collect())
            .unwrap_or_default();
        for hoof in touched {
            if pinned.contains(&hoof) {
                continue;
            }
            let (Some(group), Some(pin)) = (world.group_of(hoof), PinConstraint::new(&scene, hoof)) else {
                continue;
            };
            if let Some(body) = world.body_mut(hoof) {
                body.is_kinematic = true;
            }
            world.add_constraint(group, pin)?;
            pinned.push(hoof);
            tracing::info!(frame, ?hoof, "goat grabbed the hill");
        }

        if frame % 100 == 0 {
            tracing::info!(
                frame,
                goat = ?scene.position(hooves[0]),
                ball = ?scene.position(ball),
                "progress"
            );
        }
    }

    // Let the goat go again
    scene.destroy(goat);
    world.step(&mut scene, DT);
    tracing::info!(bodies = world.body_count(), groups = world.group_count(), "goat removed");
    Ok(())
}
