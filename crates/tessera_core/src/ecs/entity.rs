//! Entity handles and the entity store
//!
//! Entities are lightweight handles (8 bytes) that reference a slot in the
//! store. The generation counter makes handles to removed entities stale
//! instead of silently aliasing a newer entity that reuses the slot.

use crate::ecs::{ComponentData, ComponentId};
use std::collections::HashMap;
use std::fmt;

/// Components held by a single entity.
pub type Components = HashMap<ComponentId, ComponentData>;

/// Entity handle (generation-indexed for safety)
///
/// Format: [32-bit index | 32-bit generation]
/// - Index: Slot in the entity store
/// - Generation: Incremented on entity removal (prevents use-after-free)
///
/// Example:
/// ```ignore
/// let entity = world.create_entity();
/// world.remove_entity(entity, Removal::Immediate);
/// // entity handle is now stale (generation mismatch)
/// ```
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Entity {
    index: u32,
    generation: u32,
}

impl Entity {
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Serialize to 64-bit integer (for telemetry/save files)
    pub fn to_bits(&self) -> u64 {
        ((self.generation as u64) << 32) | (self.index as u64)
    }

    /// Deserialize from 64-bit integer
    pub fn from_bits(bits: u64) -> Self {
        Self {
            index: bits as u32,
            generation: (bits >> 32) as u32,
        }
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

struct Slot {
    generation: u32,
    components: Option<Components>,
}

/// Slot storage plus the insertion-ordered list of live entities.
///
/// The ordered list is what queries scan when a filter is first created and
/// what deferred entity removals are sorted by.
#[derive(Default)]
pub(crate) struct EntityStore {
    slots: Vec<Slot>,
    free: Vec<u32>,
    order: Vec<Entity>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an empty entity at the end of the ordered list.
    pub fn spawn(&mut self) -> Entity {
        let entity = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.components = Some(Components::new());
                Entity::new(index, slot.generation)
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    components: Some(Components::new()),
                });
                Entity::new(index, 0)
            }
        };
        self.order.push(entity);
        entity
    }

    /// Remove an entity, returning the components it held.
    ///
    /// The slot's generation is bumped so outstanding handles go stale.
    pub fn despawn(&mut self, entity: Entity) -> Option<Components> {
        let slot = self.slot_mut(entity)?;
        let components = slot.components.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(entity.index);

        if let Some(position) = self.position(entity) {
            self.order.remove(position);
        }
        Some(components)
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.components(entity).is_some()
    }

    pub fn components(&self, entity: Entity) -> Option<&Components> {
        self.slots
            .get(entity.index as usize)
            .filter(|slot| slot.generation == entity.generation)
            .and_then(|slot| slot.components.as_ref())
    }

    pub fn components_mut(&mut self, entity: Entity) -> Option<&mut Components> {
        self.slot_mut(entity)
            .and_then(|slot| slot.components.as_mut())
    }

    /// Current position of `entity` in the ordered list.
    pub fn position(&self, entity: Entity) -> Option<usize> {
        self.order.iter().position(|&e| e == entity)
    }

    pub fn entities(&self) -> &[Entity] {
        &self.order
    }

    fn slot_mut(&mut self, entity: Entity) -> Option<&mut Slot> {
        self.slots
            .get_mut(entity.index as usize)
            .filter(|slot| slot.generation == entity.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_round_trip() {
        let entity = Entity::new(12, 3);
        assert_eq!(Entity::from_bits(entity.to_bits()), entity);
    }

    #[test]
    fn despawn_invalidates_handle() {
        let mut store = EntityStore::new();
        let a = store.spawn();
        let b = store.spawn();

        assert!(store.despawn(a).is_some());
        assert!(!store.contains(a));
        assert!(store.despawn(a).is_none());
        assert_eq!(store.entities(), &[b]);

        // Slot reuse hands out a new generation
        let c = store.spawn();
        assert_eq!(c.index(), a.index());
        assert_ne!(c, a);
        assert!(store.components(a).is_none());
        assert_eq!(store.entities(), &[b, c]);
    }

    #[test]
    fn components_are_per_entity() {
        let mut store = EntityStore::new();
        let a = store.spawn();
        let b = store.spawn();
        let id = ComponentId::intern("entity_test_marker");

        store
            .components_mut(a)
            .unwrap()
            .insert(id, serde_json::json!(1));

        assert!(store.components(a).unwrap().contains_key(&id));
        assert!(!store.components(b).unwrap().contains_key(&id));
        assert_eq!(store.position(b), Some(1));
        assert_eq!(store.entities().len(), 2);
    }
}
