use catapult2d::{Body, Collider, Entities, Entity, PhysicsWorld, ShapeConstraint};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec2;
use rand::{rngs::StdRng, Rng, SeedableRng};

const BODIES: [u32; 6] = [10, 50, 100, 250, 500, 1000];

fn world() -> PhysicsWorld {
    PhysicsWorld::builder().seed(7).build().unwrap()
}

fn ground(scene: &mut Entities, world: &mut PhysicsWorld, w: f32) {
    let ground = scene.spawn_at(Vec2::ZERO);
    world
        .register_body(scene, ground, Body::euler().kinematic(true))
        .unwrap();
    let outline = vec![
        Vec2::new(-w / 2.0, 0.0),
        Vec2::new(w / 2.0, 0.0),
        Vec2::new(w / 2.0, -2.0),
        Vec2::new(-w / 2.0, -2.0),
    ];
    world
        .attach_collider(ground, Collider::polygon(outline, 1.0).unwrap())
        .unwrap();
}

fn world_step(c: &mut Criterion) {
    let w = 100.0;
    let mut rng = StdRng::seed_from_u64(42);
    let mut group = c.benchmark_group("World step");
    for i in BODIES {
        let mut scene = Entities::new();
        let mut world = world();
        ground(&mut scene, &mut world, w);
        for _ in 0..i {
            let ball = scene.spawn_at(Vec2::new(
                rng.gen_range((-w / 2.0)..(w / 2.0)),
                rng.gen_range(0.5..10.0),
            ));
            world.register_body(&scene, ball, Body::euler().drag(0.01)).unwrap();
            world
                .attach_collider(ball, Collider::circle(0.1, 0.5).unwrap())
                .unwrap();
        }

        group.throughput(criterion::Throughput::Elements(i as u64));
        group.bench_function(BenchmarkId::new("Circles over polygon", i), |b| {
            b.iter(|| world.step(black_box(&mut scene), 0.02));
        });
    }
}

fn shape_relaxation(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let mut group = c.benchmark_group("Shape relaxation");
    for i in [4u32, 8, 16, 32] {
        let mut scene = Entities::new();
        let mut world = world();
        let owner = scene.spawn_at(Vec2::ZERO);
        let points: Vec<Entity> = (0..i)
            .map(|_| {
                let point = scene.spawn_at(Vec2::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)));
                world.register_body(&scene, point, Body::verlet()).unwrap();
                point
            })
            .collect();
        world.register_group(&scene, owner, &points).unwrap();
        world
            .add_constraint(owner, ShapeConstraint::new(&scene, &points))
            .unwrap();

        group.bench_function(BenchmarkId::new("All pairs", i), |b| {
            b.iter(|| world.relax_constraints(black_box(&mut scene)));
        });
    }
}

criterion_group!(simulation, world_step, shape_relaxation);
criterion_main!(simulation);
