//! The boundary between the physics core and the application owning the entities.
//!
//! The core never owns entity lifetime. It reads and writes transforms through a
//! [`Scene`], checks liveness before touching anything, and asks the scene for an
//! optional [`CollisionHandler`] when a contact is found.

use glam::Vec2;

/// Generational handle to an entity owned by a [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity {
    index: u32,
    generation: u32,
}

impl Entity {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Position in world units.
    pub position: Vec2,
    /// Rotation in radians, counter-clockwise.
    pub rotation: f32,
    pub scale: Vec2,
}

impl Transform {
    pub fn from_position(position: Vec2) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    /// Maps a local-space point to world space (scale, then rotate, then translate).
    pub fn transform_point(&self, local: Vec2) -> Vec2 {
        self.position + Vec2::from_angle(self.rotation).rotate(local * self.scale)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation: 0.0,
            scale: Vec2::ONE,
        }
    }
}

/// Optional capability: entities that want to hear about contacts.
pub trait CollisionHandler {
    fn on_collision(&mut self, other: Entity);
}

impl<F> CollisionHandler for F
where
    F: FnMut(Entity),
{
    fn on_collision(&mut self, other: Entity) {
        self(other)
    }
}

/// Everything the physics core needs from the application.
pub trait Scene {
    fn is_alive(&self, entity: Entity) -> bool;

    fn transform(&self, entity: Entity) -> Option<&Transform>;

    fn transform_mut(&mut self, entity: Entity) -> Option<&mut Transform>;

    /// Capability query for collision notifications. Entities without a handler
    /// are skipped silently.
    fn collision_handler(&mut self, _entity: Entity) -> Option<&mut dyn CollisionHandler> {
        None
    }

    fn position(&self, entity: Entity) -> Option<Vec2> {
        self.transform(entity).map(|t| t.position)
    }

    /// Returns false if the entity is gone.
    fn set_position(&mut self, entity: Entity, position: Vec2) -> bool {
        match self.transform_mut(entity) {
            Some(t) => {
                t.position = position;
                true
            }
            None => false,
        }
    }

    fn translate(&mut self, entity: Entity, offset: Vec2) -> bool {
        match self.transform_mut(entity) {
            Some(t) => {
                t.position += offset;
                true
            }
            None => false,
        }
    }
}

struct EntityData {
    transform: Transform,
    handler: Option<Box<dyn CollisionHandler + Send>>,
}

struct Slot {
    generation: u32,
    data: Option<EntityData>,
}

/// A small generational arena implementing [`Scene`].
///
/// Destroyed slots are reused with a bumped generation, so stale handles never
/// alias a newer entity.
#[derive(Default)]
pub struct Entities {
    slots: Vec<Slot>,
    free: Vec<u32>,
    alive: usize,
}

impl Entities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, transform: Transform) -> Entity {
        let data = EntityData {
            transform,
            handler: None,
        };
        self.alive += 1;

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.data = Some(data);
            return Entity {
                index,
                generation: slot.generation,
            };
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            data: Some(data),
        });
        Entity {
            index,
            generation: 0,
        }
    }

    pub fn spawn_at(&mut self, position: Vec2) -> Entity {
        self.spawn(Transform::from_position(position))
    }

    /// Returns false if the entity was already gone.
    pub fn destroy(&mut self, entity: Entity) -> bool {
        let Some(slot) = self.slot_mut(entity) else {
            return false;
        };
        slot.data = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(entity.index);
        self.alive -= 1;
        true
    }

    /// Installs the collision handler of an entity, replacing any previous one.
    pub fn set_handler<H>(&mut self, entity: Entity, handler: H) -> bool
    where
        H: CollisionHandler + Send + 'static,
    {
        match self.data_mut(entity) {
            Some(data) => {
                data.handler = Some(Box::new(handler));
                true
            }
            None => false,
        }
    }

    pub fn clear_handler(&mut self, entity: Entity) {
        if let Some(data) = self.data_mut(entity) {
            data.handler = None;
        }
    }

    pub fn len(&self) -> usize {
        self.alive
    }

    pub fn is_empty(&self) -> bool {
        self.alive == 0
    }

    fn slot_mut(&mut self, entity: Entity) -> Option<&mut Slot> {
        self.slots
            .get_mut(entity.index as usize)
            .filter(|slot| slot.generation == entity.generation && slot.data.is_some())
    }

    fn data(&self, entity: Entity) -> Option<&EntityData> {
        self.slots
            .get(entity.index as usize)
            .filter(|slot| slot.generation == entity.generation)
            .and_then(|slot| slot.data.as_ref())
    }

    fn data_mut(&mut self, entity: Entity) -> Option<&mut EntityData> {
        self.slot_mut(entity).and_then(|slot| slot.data.as_mut())
    }
}

impl Scene for Entities {
    fn is_alive(&self, entity: Entity) -> bool {
        self.data(entity).is_some()
    }

    fn transform(&self, entity: Entity) -> Option<&Transform> {
        self.data(entity).map(|data| &data.transform)
    }

    fn transform_mut(&mut self, entity: Entity) -> Option<&mut Transform> {
        self.data_mut(entity).map(|data| &mut data.transform)
    }

    fn collision_handler(&mut self, entity: Entity) -> Option<&mut dyn CollisionHandler> {
        let handler = self.data_mut(entity)?.handler.as_mut()?;
        let handler: &mut dyn CollisionHandler = &mut **handler;
        Some(handler)
    }
}
