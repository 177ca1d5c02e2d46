use glam::Vec2;

use crate::{
    entity::Transform,
    error::{PhysicsError, Result},
};

/// Collision geometry plus restitution, stored next to the body of the same entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Collider {
    bounciness: f32,
    shape: Shape,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Axis aligned box; the size is local and multiplied by the entity scale.
    Box { width: f32, height: f32 },
    /// Radius in world units.
    Circle { radius: f32 },
    /// Closed vertex loop in local space. Edges face outward for a clockwise loop.
    Polygon { vertices: Vec<Vec2> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Box,
    Circle,
    Polygon,
}

impl Collider {
    pub fn new(shape: Shape, bounciness: f32) -> Result<Self> {
        if !(0.0..=1.0).contains(&bounciness) {
            return Err(PhysicsError::InvalidBounciness(bounciness));
        }
        match &shape {
            Shape::Box { width, height } => {
                let valid = |v: &f32| v.is_finite() && *v > 0.0;
                if !valid(width) || !valid(height) {
                    return Err(PhysicsError::InvalidBoxSize {
                        width: *width,
                        height: *height,
                    });
                }
            }
            Shape::Circle { radius } => {
                if !radius.is_finite() || *radius <= 0.0 {
                    return Err(PhysicsError::InvalidRadius(*radius));
                }
            }
            Shape::Polygon { vertices } => {
                if vertices.len() < 2 {
                    return Err(PhysicsError::DegeneratePolygon(vertices.len()));
                }
            }
        }
        Ok(Self { bounciness, shape })
    }

    pub fn circle(radius: f32, bounciness: f32) -> Result<Self> {
        Self::new(Shape::Circle { radius }, bounciness)
    }

    pub fn boxed(width: f32, height: f32, bounciness: f32) -> Result<Self> {
        Self::new(Shape::Box { width, height }, bounciness)
    }

    pub fn polygon(vertices: Vec<Vec2>, bounciness: f32) -> Result<Self> {
        Self::new(Shape::Polygon { vertices }, bounciness)
    }

    /// 1 keeps all normal energy in a collision, 0 keeps none.
    pub fn bounciness(&self) -> f32 {
        self.bounciness
    }

    pub fn set_bounciness(&mut self, bounciness: f32) -> Result<()> {
        if !(0.0..=1.0).contains(&bounciness) {
            return Err(PhysicsError::InvalidBounciness(bounciness));
        }
        self.bounciness = bounciness;
        Ok(())
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn kind(&self) -> ShapeKind {
        match self.shape {
            Shape::Box { .. } => ShapeKind::Box,
            Shape::Circle { .. } => ShapeKind::Circle,
            Shape::Polygon { .. } => ShapeKind::Polygon,
        }
    }
}

impl Shape {
    pub fn radius(&self) -> Option<f32> {
        match self {
            Shape::Circle { radius } => Some(*radius),
            _ => None,
        }
    }

    /// World space extent of a box, `None` for other shapes. Rotation is ignored.
    pub fn world_bounds(&self, transform: &Transform) -> Option<Aabb> {
        match self {
            Shape::Box { width, height } => Some(Aabb::new(
                transform.position,
                width * transform.scale.x.abs(),
                height * transform.scale.y.abs(),
            )),
            _ => None,
        }
    }

    /// Number of edges of a polygon loop, `0` for other shapes.
    pub fn edge_count(&self) -> usize {
        match self {
            Shape::Polygon { vertices } => vertices.len(),
            _ => 0,
        }
    }

    /// World space edge `index` of a polygon, from vertex `index` to the next
    /// one, wrapping around. `None` for other shapes or out of range indices.
    pub fn world_edge(&self, index: usize, transform: &Transform) -> Option<(Vec2, Vec2)> {
        match self {
            Shape::Polygon { vertices } if index < vertices.len() => Some((
                transform.transform_point(vertices[index]),
                transform.transform_point(vertices[(index + 1) % vertices.len()]),
            )),
            _ => None,
        }
    }
}

/// Axis aligned rectangle described by its center and full size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub center: Vec2,
    pub width: f32,
    pub height: f32,
}

impl Aabb {
    pub fn new(center: Vec2, width: f32, height: f32) -> Self {
        Self {
            center,
            width,
            height,
        }
    }

    pub fn top(&self) -> f32 {
        self.center.y + 0.5 * self.height
    }

    pub fn bottom(&self) -> f32 {
        self.center.y - 0.5 * self.height
    }

    pub fn left(&self) -> f32 {
        self.center.x - 0.5 * self.width
    }

    pub fn right(&self) -> f32 {
        self.center.x + 0.5 * self.width
    }

    pub fn min(&self) -> Vec2 {
        Vec2::new(self.left(), self.bottom())
    }

    pub fn max(&self) -> Vec2 {
        Vec2::new(self.right(), self.top())
    }

    /// Closest point of the (filled) box to `point`.
    pub fn closest_point(&self, point: Vec2) -> Vec2 {
        point.clamp(self.min(), self.max())
    }
}
