use thiserror::Error;

use crate::entity::Entity;

/// Errors returned by setup-time operations. The step pipeline itself never fails.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhysicsError {
    #[error("invalid world configuration: {0}")]
    InvalidConfig(String),

    #[error("entity {0:?} is not alive")]
    DeadEntity(Entity),

    #[error("entity {0:?} is already registered")]
    AlreadyRegistered(Entity),

    #[error("entity {0:?} has no registered body")]
    MissingBody(Entity),

    #[error("entity {0:?} is not a registered verlet group")]
    UnknownGroup(Entity),

    #[error("constraint references {member:?}, which is not a member of group {group:?}")]
    ForeignMember { group: Entity, member: Entity },

    #[error("world units per meter must be positive and finite, got {0}")]
    InvalidScale(f32),

    #[error("gravity must be finite, got {0}")]
    InvalidGravity(f32),

    #[error("wind magnitude must be finite and not negative, got {0}")]
    InvalidWindMagnitude(f32),

    #[error("bounciness must be within [0, 1], got {0}")]
    InvalidBounciness(f32),

    #[error("circle radius must be positive and finite, got {0}")]
    InvalidRadius(f32),

    #[error("box size must be positive and finite, got {width}x{height}")]
    InvalidBoxSize { width: f32, height: f32 },

    #[error("polygon needs at least 2 vertices, got {0}")]
    DegeneratePolygon(usize),
}

pub type Result<T> = std::result::Result<T, PhysicsError>;
