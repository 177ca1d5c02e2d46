//! Narrow phase tests and the shared collision response.
//!
//! Everything here is pure: the world gathers a [`Side`] for each participant,
//! asks for a contact, and applies the returned [`Correction`].

use glam::Vec2;

use crate::collider::{Aabb, ShapeKind};

/// Edges shorter than this are skipped by the polygon test.
pub const EDGE_EPSILON: f32 = 1e-6;

/// Which test handles a pair of shapes. `circle_first` tells whether the circle
/// is the first entity of the pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarrowPhase {
    CircleBox { circle_first: bool },
    CirclePolygon { circle_first: bool },
    /// Overlap is reported but never corrected.
    CircleCircle,
    Unsupported,
}

/// Dispatch table keyed by the unordered pair of shape kinds.
pub fn narrow_phase(a: ShapeKind, b: ShapeKind) -> NarrowPhase {
    use ShapeKind::*;

    match (a, b) {
        (Circle, Box) => NarrowPhase::CircleBox { circle_first: true },
        (Box, Circle) => NarrowPhase::CircleBox {
            circle_first: false,
        },
        (Circle, Polygon) => NarrowPhase::CirclePolygon { circle_first: true },
        (Polygon, Circle) => NarrowPhase::CirclePolygon {
            circle_first: false,
        },
        (Circle, Circle) => NarrowPhase::CircleCircle,
        (Box, Box) | (Box, Polygon) | (Polygon, Box) | (Polygon, Polygon) => {
            NarrowPhase::Unsupported
        }
    }
}

/// One participant of a collision as seen by the response.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Side {
    /// World units.
    pub position: Vec2,
    /// m/s.
    pub velocity: Vec2,
    pub is_kinematic: bool,
    pub bounciness: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Translation that moves the circle out of the other shape.
    pub mtv: Vec2,
    /// Unit normal pointing toward the circle, or zero if it could not be derived.
    pub normal: Vec2,
}

/// What to add to each side after a contact.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Correction {
    pub offset_a: Vec2,
    pub offset_b: Vec2,
    pub velocity_a: Vec2,
    pub velocity_b: Vec2,
}

/// Circle against an axis aligned box.
///
/// The escape axis is the shorter of the vertical and horizontal escapes, and
/// the face on each axis is picked from the sign of the relative velocity. A
/// shallow hit on a corner can therefore resolve through the wrong face.
pub fn circle_box(circle: &Side, radius: f32, bounds: &Aabb, box_velocity: Vec2) -> Option<Contact> {
    let center = circle.position;
    let closest = bounds.closest_point(center);
    if closest.distance(center) >= radius {
        return None;
    }

    let relative = circle.velocity - box_velocity;

    let y_distance = if relative.y <= 0.0 {
        (bounds.top() - center.y) + radius
    } else {
        (bounds.bottom() - center.y) - radius
    };
    let x_distance = if relative.x <= 0.0 {
        (bounds.right() - center.x) + radius
    } else {
        (bounds.left() - center.x) - radius
    };

    let mtv = if y_distance.abs() <= x_distance.abs() {
        Vec2::new(0.0, y_distance)
    } else {
        Vec2::new(x_distance, 0.0)
    };

    Some(Contact {
        mtv,
        normal: mtv.normalize_or_zero(),
    })
}

/// Circle against a one-sided segment from `start` to `end`.
///
/// The surface faces `perp(end - start)`; circles moving away from it (or
/// resting on it without approaching) are not reported.
pub fn circle_edge(
    center: Vec2,
    radius: f32,
    relative_velocity: Vec2,
    start: Vec2,
    end: Vec2,
) -> Option<Contact> {
    let line = end - start;
    let length = line.length();
    if length < EDGE_EPSILON {
        return None;
    }
    let direction = line / length;

    let projection = (center - start).dot(direction);
    let closest = start + direction * projection.clamp(0.0, length);

    let to_circle = center - closest;
    let normal = direction.perp();

    if to_circle.length() < radius && relative_velocity.dot(normal) < 0.0 {
        Some(Contact {
            mtv: normal * radius - to_circle,
            normal,
        })
    } else {
        None
    }
}

pub fn circles_overlap(center_a: Vec2, radius_a: f32, center_b: Vec2, radius_b: f32) -> bool {
    center_a.distance(center_b) < radius_a + radius_b
}

/// Share of the correction each side takes. Unit masses split evenly and a
/// kinematic side never moves.
pub fn portions(a_kinematic: bool, b_kinematic: bool) -> (f32, f32) {
    match (a_kinematic, b_kinematic) {
        (false, false) => (0.5, 0.5),
        (true, false) => (0.0, 1.0),
        (false, true) => (1.0, 0.0),
        (true, true) => (0.0, 0.0),
    }
}

/// Shared response for corrected pairs; `a` is the circle.
///
/// Both sides are pushed by the MTV plus a bounciness scaled overshoot. The
/// velocity change is the reflection of `a`'s velocity with its normal part
/// damped by `1 - bounciness_a * bounciness_b`, split by portion.
pub fn resolve(a: &Side, b: &Side, contact: &Contact) -> Correction {
    let (portion_a, portion_b) = portions(a.is_kinematic, b.is_kinematic);
    let restitution = a.bounciness * b.bounciness;

    let push = contact.mtv * (1.0 + restitution);

    let normal = contact.normal;
    let reflected = a.velocity - 2.0 * a.velocity.dot(normal) * normal;
    let bounce = reflected - reflected.dot(normal) * normal * (1.0 - restitution);
    let difference = bounce - a.velocity;

    Correction {
        offset_a: push * portion_a,
        offset_b: -push * portion_b,
        velocity_a: difference * portion_a,
        velocity_b: -difference * portion_b,
    }
}
