//! Deferred removal queue.
//!
//! Removals requested with [`Removal::Deferred`] are parked here and applied
//! by [`World::cleanup`](crate::ecs::World::cleanup), so every system in a
//! frame sees the same entities and components.

use crate::ecs::entity::EntityStore;
use crate::ecs::{ComponentId, Entity};

/// When a removal takes effect.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Removal {
    /// Apply at the end-of-frame cleanup.
    #[default]
    Deferred,
    /// Apply right away.
    Immediate,
}

#[derive(Debug, Default)]
pub(crate) struct RemovalQueue {
    components: Vec<(Entity, ComponentId)>,
    entities: Vec<Entity>,
}

impl RemovalQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a component removal. Returns `false` if it was already queued.
    pub fn enqueue_component(&mut self, entity: Entity, component: ComponentId) -> bool {
        if self.components.contains(&(entity, component)) {
            return false;
        }
        self.components.push((entity, component));
        true
    }

    /// Queue an entity removal. Returns `false` if it was already queued.
    pub fn enqueue_entity(&mut self, entity: Entity) -> bool {
        if self.entities.contains(&entity) {
            return false;
        }
        self.entities.push(entity);
        true
    }

    /// Drop a pending entity removal. Returns `true` if one was pending.
    pub fn cancel_entity(&mut self, entity: Entity) -> bool {
        match self.entities.iter().position(|&e| e == entity) {
            Some(position) => {
                self.entities.remove(position);
                true
            }
            None => false,
        }
    }

    pub fn is_entity_pending(&self, entity: Entity) -> bool {
        self.entities.contains(&entity)
    }

    pub fn take_components(&mut self) -> Vec<(Entity, ComponentId)> {
        std::mem::take(&mut self.components)
    }

    /// Drain pending entity removals, highest store position first.
    ///
    /// Removing an entity never reorders the ones that remain, so the order
    /// computed here matches the order at the time of each request. Handles
    /// that went stale in the meantime are dropped.
    pub fn take_entities(&mut self, store: &EntityStore) -> Vec<Entity> {
        let mut pending: Vec<(usize, Entity)> = self
            .entities
            .drain(..)
            .filter_map(|entity| store.position(entity).map(|position| (position, entity)))
            .collect();
        pending.sort_unstable_by(|a, b| b.0.cmp(&a.0));
        pending.into_iter().map(|(_, entity)| entity).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_requests_are_ignored() {
        let mut queue = RemovalQueue::new();
        let entity = Entity::new(0, 0);
        let id = ComponentId::intern("removal_test_marker");

        assert!(queue.enqueue_component(entity, id));
        assert!(!queue.enqueue_component(entity, id));
        assert!(queue.enqueue_entity(entity));
        assert!(!queue.enqueue_entity(entity));

        assert_eq!(queue.take_components(), vec![(entity, id)]);
        assert!(queue.is_entity_pending(entity));
    }

    #[test]
    fn entities_drain_in_descending_position() {
        let mut store = EntityStore::new();
        let spawned: Vec<Entity> = (0..5).map(|_| store.spawn()).collect();

        let mut queue = RemovalQueue::new();
        queue.enqueue_entity(spawned[1]);
        queue.enqueue_entity(spawned[3]);
        queue.enqueue_entity(spawned[2]);

        assert_eq!(
            queue.take_entities(&store),
            vec![spawned[3], spawned[2], spawned[1]]
        );
        assert!(!queue.is_entity_pending(spawned[1]));
    }

    #[test]
    fn stale_and_cancelled_entities_are_dropped() {
        let mut store = EntityStore::new();
        let a = store.spawn();
        let b = store.spawn();
        let c = store.spawn();

        let mut queue = RemovalQueue::new();
        queue.enqueue_entity(a);
        queue.enqueue_entity(b);
        queue.enqueue_entity(c);
        store.despawn(a);

        assert!(queue.cancel_entity(c));
        assert!(!queue.cancel_entity(c));
        assert!(queue.is_entity_pending(b));
        assert_eq!(queue.take_entities(&store), vec![b]);
    }
}
