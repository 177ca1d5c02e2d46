use crate::{
    constraint::Constraint,
    entity::{Entity, Scene},
};

pub const DEFAULT_CONSTRAINT_STRENGTH: usize = 10;

/// A set of verlet bodies relaxed together against a list of constraints.
#[derive(Debug, Clone)]
pub struct VerletGroup {
    entity: Entity,
    members: Vec<Entity>,
    constraints: Vec<Constraint>,
    /// Relaxation sweeps per step. More sweeps converge further.
    pub constraint_strength: usize,
}

impl VerletGroup {
    pub(crate) fn new(entity: Entity, members: Vec<Entity>, constraint_strength: usize) -> Self {
        Self {
            entity,
            members,
            constraints: Vec::new(),
            constraint_strength,
        }
    }

    pub fn entity(&self) -> Entity {
        self.entity
    }

    /// Members in the order they were handed to the group.
    pub fn members(&self) -> &[Entity] {
        &self.members
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.members.contains(&entity)
    }

    /// Appends a constraint. Membership is checked by `PhysicsWorld::add_constraint`.
    pub(crate) fn push_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    pub(crate) fn retain_members(&mut self, mut keep: impl FnMut(Entity) -> bool) {
        self.members.retain(|member| keep(*member));
    }

    /// Gauss-Seidel style relaxation: `constraint_strength` sweeps over every
    /// constraint in insertion order.
    pub fn resolve_constraints<S: Scene + ?Sized>(&self, scene: &mut S) {
        for _ in 0..self.constraint_strength {
            for constraint in &self.constraints {
                constraint.solve(scene);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::constraint::{LinkConstraint, PinConstraint};
    use crate::entity::Entities;

    #[test]
    fn link_distance_converges_monotonically() {
        let mut scene = Entities::new();
        let owner = scene.spawn_at(Vec2::ZERO);
        let a = scene.spawn_at(Vec2::new(0.0, 0.0));
        let b = scene.spawn_at(Vec2::new(0.0, 5.0));
        let c = scene.spawn_at(Vec2::new(1.0, 5.0));

        let mut group = VerletGroup::new(owner, vec![a, b, c], 1);
        group.push_constraint(LinkConstraint::with_distance(a, b, 2.0).into());
        group.push_constraint(PinConstraint::at(c, Vec2::new(1.0, 5.0)).into());

        let mut last = f32::INFINITY;
        for _ in 0..20 {
            group.resolve_constraints(&mut scene);
            let d = scene.position(a).unwrap().distance(scene.position(b).unwrap());
            let error = (d - 2.0).abs();
            assert!(error <= last + 1e-6);
            last = error;
        }
        assert!(last < 1e-5);
    }

    #[test]
    fn zero_strength_does_nothing() {
        let mut scene = Entities::new();
        let owner = scene.spawn_at(Vec2::ZERO);
        let a = scene.spawn_at(Vec2::ZERO);
        let b = scene.spawn_at(Vec2::new(3.0, 0.0));
        let mut group = VerletGroup::new(owner, vec![a, b], 0);
        group.push_constraint(LinkConstraint::with_distance(a, b, 1.0).into());

        group.resolve_constraints(&mut scene);
        assert_eq!(scene.position(b), Some(Vec2::new(3.0, 0.0)));
        assert!(group.contains(a));
        assert_eq!(group.constraints().len(), 1);
    }
}
