//! Lightweight 2D physics for small interactive simulations.
//!
//! Bodies integrate with explicit euler or with verlet, verlet bodies are held in
//! shape by iterative constraints, and circles collide with boxes, polygon
//! outlines and each other.
//!
//! # Example
//! ```rust
//! use catapult2d::{Body, Collider, Entities, PhysicsWorld, Scene};
//! use glam::Vec2;
//!
//! let mut scene = Entities::new();
//! let mut world = PhysicsWorld::builder().seed(1).build().unwrap();
//!
//! let ground = scene.spawn_at(Vec2::new(0.0, -5.0));
//! world.register_body(&scene, ground, Body::euler().kinematic(true)).unwrap();
//! world.attach_collider(ground, Collider::boxed(20.0, 1.0, 1.0).unwrap()).unwrap();
//!
//! let ball = scene.spawn_at(Vec2::new(0.0, 0.0));
//! world.register_body(&scene, ball, Body::euler().drag(0.001)).unwrap();
//! world.attach_collider(ball, Collider::circle(0.2, 0.5).unwrap()).unwrap();
//!
//! for _ in 0..500 {
//!     world.step(&mut scene, 0.02);
//! }
//! assert!(scene.position(ball).unwrap().y > -5.0);
//! ```

pub mod body;
pub mod collider;
pub mod collision;
pub mod config;
pub mod constraint;
pub mod entity;
pub mod error;
pub mod units;
pub mod verlet_group;
pub mod wind;
pub mod world;

pub use body::{Body, BodyKind, WindLimit};
pub use collider::{Collider, Shape, ShapeKind};
pub use config::WorldConfig;
pub use constraint::{Constraint, LinkConstraint, PinConstraint, ShapeConstraint};
pub use entity::{CollisionHandler, Entities, Entity, Scene, Transform};
pub use error::PhysicsError;
pub use units::UnitConverter;
pub use verlet_group::VerletGroup;
pub use world::{PhysicsWorld, WorldBuilder};
