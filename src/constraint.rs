//! Positional correction rules for verlet bodies.
//!
//! Constraints move entity positions directly. The verlet integrator turns the
//! displacement into velocity on the next step.

use glam::Vec2;

use crate::entity::{Entity, Scene};

/// Link endpoints closer than this are left alone instead of dividing by ~0.
pub const LINK_EPSILON: f32 = 1e-6;

#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    Link(LinkConstraint),
    Pin(PinConstraint),
    Shape(ShapeConstraint),
}

impl Constraint {
    pub fn solve<S: Scene + ?Sized>(&self, scene: &mut S) {
        match self {
            Constraint::Link(link) => link.solve(scene),
            Constraint::Pin(pin) => pin.solve(scene),
            Constraint::Shape(shape) => shape.solve(scene),
        }
    }

    /// Every entity this constraint moves.
    pub fn bodies(&self) -> Vec<Entity> {
        match self {
            Constraint::Link(link) => vec![link.a, link.b],
            Constraint::Pin(pin) => vec![pin.body],
            Constraint::Shape(shape) => {
                let mut bodies: Vec<Entity> = shape.links.iter().flat_map(|l| [l.a, l.b]).collect();
                bodies.sort();
                bodies.dedup();
                bodies
            }
        }
    }
}

impl From<LinkConstraint> for Constraint {
    fn from(link: LinkConstraint) -> Self {
        Constraint::Link(link)
    }
}

impl From<PinConstraint> for Constraint {
    fn from(pin: PinConstraint) -> Self {
        Constraint::Pin(pin)
    }
}

impl From<ShapeConstraint> for Constraint {
    fn from(shape: ShapeConstraint) -> Self {
        Constraint::Shape(shape)
    }
}

/// Keeps two bodies at a fixed distance; both absorb half of the correction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkConstraint {
    a: Entity,
    b: Entity,
    rest_distance: f32,
}

impl LinkConstraint {
    /// Links `a` and `b` at their current distance. `None` if either is gone.
    pub fn new<S: Scene + ?Sized>(scene: &S, a: Entity, b: Entity) -> Option<Self> {
        let rest_distance = scene.position(a)?.distance(scene.position(b)?);
        Some(Self::with_distance(a, b, rest_distance))
    }

    pub fn with_distance(a: Entity, b: Entity, rest_distance: f32) -> Self {
        Self {
            a,
            b,
            rest_distance,
        }
    }

    pub fn rest_distance(&self) -> f32 {
        self.rest_distance
    }

    pub fn endpoints(&self) -> (Entity, Entity) {
        (self.a, self.b)
    }

    pub fn solve<S: Scene + ?Sized>(&self, scene: &mut S) {
        let (Some(pos_a), Some(pos_b)) = (scene.position(self.a), scene.position(self.b)) else {
            return;
        };

        let difference = pos_a - pos_b;
        let length = difference.length();
        if length < LINK_EPSILON {
            return;
        }

        let correction = difference * 0.5 * (self.rest_distance - length) / length;
        scene.translate(self.a, correction);
        scene.translate(self.b, -correction);
    }
}

/// Nails a body to a fixed world position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinConstraint {
    body: Entity,
    pin_position: Vec2,
}

impl PinConstraint {
    /// Pins `body` where it currently is. `None` if it is gone.
    pub fn new<S: Scene + ?Sized>(scene: &S, body: Entity) -> Option<Self> {
        Some(Self::at(body, scene.position(body)?))
    }

    pub fn at(body: Entity, pin_position: Vec2) -> Self {
        Self { body, pin_position }
    }

    pub fn body(&self) -> Entity {
        self.body
    }

    pub fn pin_position(&self) -> Vec2 {
        self.pin_position
    }

    pub fn solve<S: Scene + ?Sized>(&self, scene: &mut S) {
        scene.set_position(self.body, self.pin_position);
    }
}

/// All-pairs link lattice approximating a rigid shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeConstraint {
    links: Vec<LinkConstraint>,
}

impl ShapeConstraint {
    /// One link per unordered pair of `members`, at their current distances.
    /// Members that are no longer alive are left out.
    pub fn new<S: Scene + ?Sized>(scene: &S, members: &[Entity]) -> Self {
        let mut links = Vec::with_capacity(members.len() * members.len().saturating_sub(1) / 2);
        for (i, a) in members.iter().enumerate() {
            for b in &members[i + 1..] {
                if let Some(link) = LinkConstraint::new(scene, *a, *b) {
                    links.push(link);
                }
            }
        }
        Self { links }
    }

    pub fn links(&self) -> &[LinkConstraint] {
        &self.links
    }

    pub fn solve<S: Scene + ?Sized>(&self, scene: &mut S) {
        for link in &self.links {
            link.solve(scene);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entities;

    #[test]
    fn single_link_reaches_rest_distance_in_one_solve() {
        let mut scene = Entities::new();
        let a = scene.spawn_at(Vec2::new(0.0, 0.0));
        let b = scene.spawn_at(Vec2::new(4.0, 0.0));
        let link = LinkConstraint::with_distance(a, b, 2.0);

        link.solve(&mut scene);

        assert_eq!(scene.position(a), Some(Vec2::new(1.0, 0.0)));
        assert_eq!(scene.position(b), Some(Vec2::new(3.0, 0.0)));
    }

    #[test]
    fn link_defaults_to_current_distance() {
        let mut scene = Entities::new();
        let a = scene.spawn_at(Vec2::new(0.0, 0.0));
        let b = scene.spawn_at(Vec2::new(3.0, 4.0));
        let link = LinkConstraint::new(&scene, a, b).unwrap();
        assert_eq!(link.rest_distance(), 5.0);

        scene.destroy(b);
        assert!(LinkConstraint::new(&scene, a, b).is_none());
        // Dead endpoint: nothing moves
        link.solve(&mut scene);
        assert_eq!(scene.position(a), Some(Vec2::ZERO));
    }

    #[test]
    fn coincident_link_endpoints_are_skipped() {
        let mut scene = Entities::new();
        let a = scene.spawn_at(Vec2::ONE);
        let b = scene.spawn_at(Vec2::ONE);
        LinkConstraint::with_distance(a, b, 1.0).solve(&mut scene);

        let pa = scene.position(a).unwrap();
        assert!(pa.is_finite());
        assert_eq!(pa, Vec2::ONE);
    }

    #[test]
    fn pin_is_idempotent() {
        let mut scene = Entities::new();
        let body = scene.spawn_at(Vec2::new(2.0, 2.0));
        let pin = PinConstraint::new(&scene, body).unwrap();

        scene.set_position(body, Vec2::new(9.0, -1.0));
        pin.solve(&mut scene);
        assert_eq!(scene.position(body), Some(Vec2::new(2.0, 2.0)));
        pin.solve(&mut scene);
        assert_eq!(scene.position(body), Some(pin.pin_position()));
    }

    #[test]
    fn shape_links_every_unordered_pair() {
        let mut scene = Entities::new();
        let members: Vec<Entity> = (0..5)
            .map(|i| scene.spawn_at(Vec2::new(i as f32, (i * i) as f32)))
            .collect();
        let shape = ShapeConstraint::new(&scene, &members);

        assert_eq!(shape.links().len(), 10);
        assert_eq!(Constraint::from(shape).bodies(), members);
    }
}
