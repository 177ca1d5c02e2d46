use std::fmt::{self, Debug};

use glam::Vec2;
use tracing::{debug, trace, warn};

use crate::{
    body::Body,
    collider::{Collider, Shape},
    collision::{self, Contact, NarrowPhase, Side},
    config::WorldConfig,
    constraint::Constraint,
    entity::{Entity, Scene},
    error::{PhysicsError, Result},
    units::UnitConverter,
    verlet_group::VerletGroup,
    wind::Wind,
};

type WindListener = Box<dyn FnMut(f32) + Send>;

#[derive(Debug, Clone)]
struct BodyEntry {
    entity: Entity,
    body: Body,
    collider: Option<Collider>,
}

/// Owns the registry of bodies and verlet groups and runs the fixed step pipeline.
pub struct PhysicsWorld {
    gravity: f32,
    units: UnitConverter,
    wind: Wind,
    constraint_strength: usize,
    bodies: Vec<BodyEntry>,
    groups: Vec<VerletGroup>,
    wind_listener: Option<WindListener>,
}

impl PhysicsWorld {
    pub fn builder() -> WorldBuilder {
        WorldBuilder::default()
    }

    pub fn from_config(config: &WorldConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            gravity: config.gravity,
            units: UnitConverter::new(config.world_units_per_meter)?,
            wind: Wind::new(config.wind_magnitude, config.wind_interval, config.seed),
            constraint_strength: config.constraint_strength,
            bodies: Vec::new(),
            groups: Vec::new(),
            wind_listener: None,
        })
    }

    pub fn gravity(&self) -> f32 {
        self.gravity
    }

    /// Fails for non-finite values and keeps the old gravity.
    pub fn set_gravity(&mut self, gravity: f32) -> Result<()> {
        if !gravity.is_finite() {
            return Err(PhysicsError::InvalidGravity(gravity));
        }
        self.gravity = gravity;
        Ok(())
    }

    pub fn units(&self) -> &UnitConverter {
        &self.units
    }

    /// Changes the unit scale. Verlet bodies keep their old positions, so the
    /// next step derives their inertia at the new scale.
    pub fn set_world_units_per_meter(&mut self, world_units_per_meter: f32) -> Result<()> {
        self.units = UnitConverter::new(world_units_per_meter)?;
        Ok(())
    }

    /// Current wind in m/s, for bodies that opt into wind.
    pub fn active_wind(&self) -> f32 {
        self.wind.active()
    }

    pub fn set_wind_magnitude(&mut self, magnitude: f32) -> Result<()> {
        self.wind.set_magnitude(magnitude)
    }

    /// Called with the new wind every time it is resampled.
    pub fn set_wind_listener<F>(&mut self, listener: F)
    where
        F: FnMut(f32) + Send + 'static,
    {
        self.wind_listener = Some(Box::new(listener));
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn is_registered(&self, entity: Entity) -> bool {
        self.entry_index(entity).is_some() || self.group_index(entity).is_some()
    }

    /// Registers the body of a live entity. Verlet bodies start at rest from the
    /// entity's current position, keeping the velocity they were built with.
    pub fn register_body<S: Scene + ?Sized>(
        &mut self,
        scene: &S,
        entity: Entity,
        mut body: Body,
    ) -> Result<()> {
        let position = scene
            .position(entity)
            .ok_or(PhysicsError::DeadEntity(entity))?;
        if self.is_registered(entity) {
            return Err(PhysicsError::AlreadyRegistered(entity));
        }

        body.prime(position);
        debug!(?entity, verlet = body.is_verlet(), "registered body");
        self.bodies.push(BodyEntry {
            entity,
            body,
            collider: None,
        });
        Ok(())
    }

    /// Attaches (or replaces) the collider of an entity that already has a body.
    pub fn attach_collider(&mut self, entity: Entity, collider: Collider) -> Result<()> {
        let index = self
            .entry_index(entity)
            .ok_or(PhysicsError::MissingBody(entity))?;
        debug!(?entity, kind = ?collider.kind(), "attached collider");
        self.bodies[index].collider = Some(collider);
        Ok(())
    }

    /// Creates a verlet group owned by `entity` from registered verlet bodies.
    ///
    /// Members that are not verlet bodies, or already belong to another group,
    /// are left out.
    pub fn register_group<S: Scene + ?Sized>(
        &mut self,
        scene: &S,
        entity: Entity,
        members: &[Entity],
    ) -> Result<()> {
        if !scene.is_alive(entity) {
            return Err(PhysicsError::DeadEntity(entity));
        }
        if self.is_registered(entity) {
            return Err(PhysicsError::AlreadyRegistered(entity));
        }

        let mut accepted = Vec::with_capacity(members.len());
        for member in members {
            let joinable = self
                .entry_index(*member)
                .map(|i| &self.bodies[i].body)
                .filter(|body| body.is_verlet() && body.group().is_none());

            if joinable.is_some() && !accepted.contains(member) {
                accepted.push(*member);
            } else {
                warn!(group = ?entity, ?member, "left out of group: not a free verlet body");
            }
        }

        for member in &accepted {
            if let Some(body) = self.body_mut(*member) {
                body.set_group(Some(entity));
            }
        }

        debug!(group = ?entity, members = accepted.len(), "registered verlet group");
        self.groups
            .push(VerletGroup::new(entity, accepted, self.constraint_strength));
        Ok(())
    }

    /// Appends a constraint to a group. Every body it moves must be a member.
    pub fn add_constraint(&mut self, group: Entity, constraint: impl Into<Constraint>) -> Result<()> {
        let constraint = constraint.into();
        let index = self
            .group_index(group)
            .ok_or(PhysicsError::UnknownGroup(group))?;
        let target = &mut self.groups[index];

        if let Some(member) = constraint.bodies().into_iter().find(|b| !target.contains(*b)) {
            return Err(PhysicsError::ForeignMember { group, member });
        }
        target.push_constraint(constraint);
        Ok(())
    }

    pub fn body(&self, entity: Entity) -> Option<&Body> {
        self.entry_index(entity).map(|i| &self.bodies[i].body)
    }

    pub fn body_mut(&mut self, entity: Entity) -> Option<&mut Body> {
        let index = self.entry_index(entity)?;
        Some(&mut self.bodies[index].body)
    }

    pub fn collider(&self, entity: Entity) -> Option<&Collider> {
        self.entry_index(entity)
            .and_then(|i| self.bodies[i].collider.as_ref())
    }

    pub fn collider_mut(&mut self, entity: Entity) -> Option<&mut Collider> {
        let index = self.entry_index(entity)?;
        self.bodies[index].collider.as_mut()
    }

    pub fn group(&self, entity: Entity) -> Option<&VerletGroup> {
        self.group_index(entity).map(|i| &self.groups[i])
    }

    pub fn group_mut(&mut self, entity: Entity) -> Option<&mut VerletGroup> {
        let index = self.group_index(entity)?;
        Some(&mut self.groups[index])
    }

    /// The group a verlet body belongs to.
    pub fn group_of(&self, body: Entity) -> Option<Entity> {
        self.body(body).and_then(Body::group)
    }

    /// Sets the velocity of every member of a group.
    pub fn set_group_velocity(&mut self, group: Entity, velocity: Vec2) -> Result<()> {
        let index = self
            .group_index(group)
            .ok_or(PhysicsError::UnknownGroup(group))?;
        let members = self.groups[index].members().to_vec();
        for member in members {
            if let Some(body) = self.body_mut(member) {
                body.velocity = velocity;
            }
        }
        Ok(())
    }

    /// Runs one fixed step of `dt` seconds.
    pub fn step<S: Scene + ?Sized>(&mut self, scene: &mut S, dt: f32) {
        self.prune(scene);
        self.update_wind(dt);
        self.apply_environmental_forces(dt);
        self.integrate(scene, dt);
        self.relax_constraints(scene);
        self.resolve_collisions(scene);
    }

    /// Drops registrations of destroyed entities. A destroyed group takes its
    /// members' registrations with it. Returns the number of removed entries.
    pub fn prune<S: Scene + ?Sized>(&mut self, scene: &S) -> usize {
        let before = self.bodies.len() + self.groups.len();

        let mut orphans = Vec::new();
        self.groups.retain_mut(|group| {
            if scene.is_alive(group.entity()) {
                group.retain_members(|member| scene.is_alive(member));
                true
            } else {
                orphans.extend_from_slice(group.members());
                false
            }
        });
        self.bodies
            .retain(|entry| scene.is_alive(entry.entity) && !orphans.contains(&entry.entity));

        let removed = before - (self.bodies.len() + self.groups.len());
        if removed > 0 {
            debug!(removed, "pruned stale registrations");
        }
        removed
    }

    pub fn update_wind(&mut self, dt: f32) {
        if let Some(wind) = self.wind.update(dt) {
            if let Some(listener) = self.wind_listener.as_mut() {
                listener(wind);
            }
        }
    }

    /// Gravity and drag for every body, kinematic or not.
    pub fn apply_environmental_forces(&mut self, dt: f32) {
        for entry in &mut self.bodies {
            entry.body.apply_environment(self.gravity, dt);
        }
    }

    pub fn integrate<S: Scene + ?Sized>(&mut self, scene: &mut S, dt: f32) {
        for entry in &mut self.bodies {
            if let Some(transform) = scene.transform_mut(entry.entity) {
                entry.body.physics_step(&mut transform.position, dt, &self.units);
            }
        }
    }

    pub fn relax_constraints<S: Scene + ?Sized>(&mut self, scene: &mut S) {
        for group in &self.groups {
            group.resolve_constraints(scene);
        }
    }

    /// Tests every unordered pair of collider-bearing bodies once.
    pub fn resolve_collisions<S: Scene + ?Sized>(&mut self, scene: &mut S) {
        let count = self.bodies.len();
        for i in 0..count {
            for j in i + 1..count {
                self.test_pair(scene, i, j);
            }
        }
    }

    fn test_pair<S: Scene + ?Sized>(&mut self, scene: &mut S, i: usize, j: usize) {
        let (Some(a), Some(b)) = (&self.bodies[i].collider, &self.bodies[j].collider) else {
            return;
        };

        match collision::narrow_phase(a.kind(), b.kind()) {
            NarrowPhase::CircleBox { circle_first } => {
                let (circle, boxed) = if circle_first { (i, j) } else { (j, i) };
                self.circle_box(scene, circle, boxed);
            }
            NarrowPhase::CirclePolygon { circle_first } => {
                let (circle, polygon) = if circle_first { (i, j) } else { (j, i) };
                self.circle_polygon(scene, circle, polygon);
            }
            NarrowPhase::CircleCircle => self.circle_circle(scene, i, j),
            NarrowPhase::Unsupported => {}
        }
    }

    fn circle_box<S: Scene + ?Sized>(&mut self, scene: &mut S, circle: usize, boxed: usize) {
        let (Some(circle_position), Some(box_transform)) = (
            scene.position(self.bodies[circle].entity),
            scene.transform(self.bodies[boxed].entity).copied(),
        ) else {
            return;
        };
        let (Some(radius), Some(bounds)) = (
            self.shape(circle).and_then(Shape::radius),
            self.shape(boxed).and_then(|s| s.world_bounds(&box_transform)),
        ) else {
            return;
        };

        let a = self.side(circle, circle_position);
        let b = self.side(boxed, box_transform.position);
        if let Some(contact) = collision::circle_box(&a, radius, &bounds, b.velocity) {
            self.respond(scene, circle, boxed, &a, &b, &contact);
        }
    }

    /// Edges are handled one after another, each seeing the corrections of the
    /// previous ones.
    fn circle_polygon<S: Scene + ?Sized>(&mut self, scene: &mut S, circle: usize, polygon: usize) {
        let Some(radius) = self.shape(circle).and_then(Shape::radius) else {
            return;
        };
        let Some(shape) = self.shape(polygon).cloned() else {
            return;
        };

        let (circle_entity, polygon_entity) = (self.bodies[circle].entity, self.bodies[polygon].entity);
        for i in 0..shape.edge_count() {
            let (Some(center), Some(transform)) = (
                scene.position(circle_entity),
                scene.transform(polygon_entity).copied(),
            ) else {
                return;
            };
            let Some((start, end)) = shape.world_edge(i, &transform) else {
                return;
            };

            let a = self.side(circle, center);
            let b = self.side(polygon, transform.position);
            if let Some(contact) =
                collision::circle_edge(center, radius, a.velocity - b.velocity, start, end)
            {
                self.respond(scene, circle, polygon, &a, &b, &contact);
            }
        }
    }

    /// Reported only: overlapping circles are never pushed apart.
    fn circle_circle<S: Scene + ?Sized>(&mut self, scene: &mut S, i: usize, j: usize) {
        let (a, b) = (self.bodies[i].entity, self.bodies[j].entity);
        let (Some(center_a), Some(center_b)) = (scene.position(a), scene.position(b)) else {
            return;
        };
        let (Some(radius_a), Some(radius_b)) = (
            self.shape(i).and_then(Shape::radius),
            self.shape(j).and_then(Shape::radius),
        ) else {
            return;
        };

        if collision::circles_overlap(center_a, radius_a, center_b, radius_b) {
            trace!(?a, ?b, "circle overlap");
            notify(scene, a, b);
        }
    }

    fn respond<S: Scene + ?Sized>(
        &mut self,
        scene: &mut S,
        i: usize,
        j: usize,
        a: &Side,
        b: &Side,
        contact: &Contact,
    ) {
        let correction = collision::resolve(a, b, contact);
        let (entity_a, entity_b) = (self.bodies[i].entity, self.bodies[j].entity);

        scene.translate(entity_a, correction.offset_a);
        scene.translate(entity_b, correction.offset_b);
        self.bodies[i].body.velocity += correction.velocity_a;
        self.bodies[j].body.velocity += correction.velocity_b;

        trace!(a = ?entity_a, b = ?entity_b, mtv = ?contact.mtv, "contact resolved");
        notify(scene, entity_a, entity_b);
    }

    fn side(&self, index: usize, position: Vec2) -> Side {
        let entry = &self.bodies[index];
        Side {
            position,
            velocity: entry.body.velocity,
            is_kinematic: entry.body.is_kinematic,
            bounciness: entry.collider.as_ref().map_or(1.0, Collider::bounciness),
        }
    }

    fn shape(&self, index: usize) -> Option<&Shape> {
        self.bodies[index].collider.as_ref().map(Collider::shape)
    }

    fn entry_index(&self, entity: Entity) -> Option<usize> {
        self.bodies.iter().position(|entry| entry.entity == entity)
    }

    fn group_index(&self, entity: Entity) -> Option<usize> {
        self.groups.iter().position(|group| group.entity() == entity)
    }
}

fn notify<S: Scene + ?Sized>(scene: &mut S, a: Entity, b: Entity) {
    if let Some(handler) = scene.collision_handler(a) {
        handler.on_collision(b);
    }
    if let Some(handler) = scene.collision_handler(b) {
        handler.on_collision(a);
    }
}

impl Debug for PhysicsWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhysicsWorld")
            .field("gravity", &self.gravity)
            .field("units", &self.units)
            .field("wind", &self.wind)
            .field("bodies", &self.bodies)
            .field("groups", &self.groups)
            .finish_non_exhaustive()
    }
}

/// Builder for `PhysicsWorld`
pub struct WorldBuilder {
    config: WorldConfig,
}

impl WorldBuilder {
    /// Get a Instance of `WorldBuilder` with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration, e.g. one loaded from disk.
    pub fn from_config(config: WorldConfig) -> Self {
        Self { config }
    }

    /// Downward acceleration in m/s².
    pub fn gravity(mut self, gravity: f32) -> Self {
        self.config.gravity = gravity;
        self
    }

    /// Largest wind speed in m/s. The active wind is drawn from
    /// `[-wind_magnitude, wind_magnitude]`.
    /// `0.0` -> No wind
    pub fn wind_magnitude(mut self, wind_magnitude: f32) -> Self {
        self.config.wind_magnitude = wind_magnitude;
        self
    }

    /// Seconds between wind changes.
    pub fn wind_interval(mut self, wind_interval: f32) -> Self {
        self.config.wind_interval = wind_interval;
        self
    }

    /// How many world units make up one meter.
    /// Positions are in world units, velocities in m/s.
    /// The step length must be picked to match this scale.
    pub fn world_units_per_meter(mut self, world_units_per_meter: f32) -> Self {
        self.config.world_units_per_meter = world_units_per_meter;
        self
    }

    /// Relaxation sweeps per step given to new verlet groups.
    /// Higher numbers hold shapes stiffer but cost more.
    pub fn constraint_strength(mut self, constraint_strength: usize) -> Self {
        self.config.constraint_strength = constraint_strength;
        self
    }

    /// Seed the wind so runs are reproducible.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Constructs a instance of `PhysicsWorld`
    pub fn build(self) -> Result<PhysicsWorld> {
        PhysicsWorld::from_config(&self.config)
    }
}

impl Default for WorldBuilder {
    /// Get a Instance of `WorldBuilder` with default values
    fn default() -> Self {
        Self {
            config: WorldConfig::default(),
        }
    }
}
