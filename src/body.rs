use glam::Vec2;

use crate::{entity::Entity, units::UnitConverter};

/// Per-entity kinematic state. Every body has implicit unit mass, so forces and
/// velocity changes are interchangeable.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    /// Velocity in m/s. Freely writable between steps, also for verlet bodies.
    pub velocity: Vec2,
    pub acceleration: Vec2,
    /// Kinematic bodies ignore forces and collisions but can still anchor constraints.
    pub is_kinematic: bool,
    /// Coefficient `k` of the quadratic air resistance `-k * v * |v|`.
    pub drag_coefficient: f32,
    kind: BodyKind,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BodyKind {
    /// Explicit euler integration of velocity and position.
    Euler,
    /// Position based integration that also honours velocity written from outside.
    Verlet(VerletState),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerletState {
    pub old_velocity: Vec2,
    /// World units.
    pub old_position: Vec2,
    group: Option<Entity>,
}

/// Which way wind may push a body's horizontal velocity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindLimit {
    #[default]
    None,
    /// Wind is skipped when it would leave `velocity.x` negative.
    NonNegative,
    /// Wind is skipped when it would leave `velocity.x` positive.
    NonPositive,
}

impl Body {
    fn new(kind: BodyKind) -> Self {
        Self {
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            is_kinematic: false,
            drag_coefficient: 0.0,
            kind,
        }
    }

    pub fn euler() -> Self {
        Self::new(BodyKind::Euler)
    }

    pub fn verlet() -> Self {
        Self::new(BodyKind::Verlet(VerletState {
            old_velocity: Vec2::ZERO,
            old_position: Vec2::ZERO,
            group: None,
        }))
    }

    pub fn kinematic(mut self, is_kinematic: bool) -> Self {
        self.is_kinematic = is_kinematic;
        self
    }

    pub fn drag(mut self, drag_coefficient: f32) -> Self {
        self.drag_coefficient = drag_coefficient;
        self
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_acceleration(mut self, acceleration: Vec2) -> Self {
        self.acceleration = acceleration;
        self
    }

    pub fn kind(&self) -> &BodyKind {
        &self.kind
    }

    pub fn is_verlet(&self) -> bool {
        matches!(self.kind, BodyKind::Verlet(_))
    }

    pub fn verlet_state(&self) -> Option<&VerletState> {
        match &self.kind {
            BodyKind::Verlet(state) => Some(state),
            BodyKind::Euler => None,
        }
    }

    /// The verlet group this body belongs to, if any.
    pub fn group(&self) -> Option<Entity> {
        self.verlet_state().and_then(|state| state.group)
    }

    /// Called once on registration so the first verlet step starts from rest
    /// and only sees the velocity the body was launched with.
    pub(crate) fn prime(&mut self, position: Vec2) {
        if let BodyKind::Verlet(state) = &mut self.kind {
            state.old_position = position;
            state.old_velocity = Vec2::ZERO;
        }
    }

    pub(crate) fn set_group(&mut self, group: Option<Entity>) {
        if let BodyKind::Verlet(state) = &mut self.kind {
            state.group = group;
        }
    }

    /// Adds gravity and quadratic drag for one step of `dt` seconds.
    ///
    /// Drag is applied per axis with a sign preserving square and never pushes a
    /// component past zero. Kinematic bodies receive the change too and drop it
    /// in their own step.
    pub fn apply_environment(&mut self, gravity: f32, dt: f32) {
        let limit = self.velocity.abs();
        let drag = (-self.drag_coefficient * self.velocity * limit * dt).clamp(-limit, limit);
        self.velocity += drag + Vec2::new(0.0, -gravity * dt);
    }

    /// Adds `wind * dt` to the horizontal velocity unless the result violates `limit`.
    pub fn apply_wind(&mut self, wind: f32, dt: f32, limit: WindLimit) {
        let gust = wind * dt;
        let next = self.velocity.x + gust;
        let allowed = match limit {
            WindLimit::None => true,
            WindLimit::NonNegative => next >= 0.0,
            WindLimit::NonPositive => next <= 0.0,
        };
        if allowed {
            self.velocity.x = next;
        }
    }

    /// Advances `position` (world units) by one fixed step.
    ///
    /// One step moves the body by its velocity converted to world units; `dt`
    /// only scales the acceleration.
    pub fn physics_step(&mut self, position: &mut Vec2, dt: f32, units: &UnitConverter) {
        if self.is_kinematic {
            self.velocity = Vec2::ZERO;
            self.acceleration = Vec2::ZERO;
            return;
        }

        match &mut self.kind {
            BodyKind::Euler => {
                self.velocity += self.acceleration * dt;
                *position += units.to_world_units(self.velocity);
            }
            BodyKind::Verlet(state) => {
                // Whatever the world did to velocity since the last step
                let delta_v = self.velocity - state.old_velocity;
                let inertia = units.to_physical_units(*position - state.old_position);

                self.velocity = inertia + delta_v;
                state.old_velocity = self.velocity;
                state.old_position = *position;

                *position += units.to_world_units(self.velocity);
            }
        }
    }
}
