// world.rs - ECS World with entity management, queries and the frame flush

use crate::ecs::entity::EntityStore;
use crate::ecs::filter::FilterIndex;
use crate::ecs::removal::RemovalQueue;
use crate::ecs::{
    empty_component, ComponentData, ComponentId, Entity, FilterKey, Listener, Removal,
    StatsEvent, StatsObserver, System, WorldStats,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tessera_metrics::Throttle;

/// Default minimum time between two frame snapshots sent to an observer.
pub const DEFAULT_PUBLISH_INTERVAL: Duration = Duration::from_millis(250);

/// Construction-time settings for a [`World`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Identifier reported alongside published stats.
    pub id: Option<String>,
    /// Minimum milliseconds between two frame snapshots.
    pub publish_interval_ms: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            id: None,
            publish_interval_ms: DEFAULT_PUBLISH_INTERVAL.as_millis() as u64,
        }
    }
}

/// The main ECS world containing all entities, filters and systems.
pub struct World {
    id: Option<String>,
    pub(crate) store: EntityStore,
    pub(crate) filters: FilterIndex,
    pub(crate) removals: RemovalQueue,
    pub(crate) systems: Vec<Box<dyn System>>,
    pub(crate) stats: WorldStats,
    observer: Option<Box<dyn StatsObserver>>,
    publish_throttle: Throttle,
}

impl World {
    /// Create a new empty world.
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    /// Create a world reporting stats under `id`.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self::with_config(WorldConfig {
            id: Some(id.into()),
            ..WorldConfig::default()
        })
    }

    pub fn with_config(config: WorldConfig) -> Self {
        Self {
            id: config.id,
            store: EntityStore::new(),
            filters: FilterIndex::new(),
            removals: RemovalQueue::new(),
            systems: Vec::new(),
            stats: WorldStats::new(),
            observer: None,
            publish_throttle: Throttle::new(Duration::from_millis(config.publish_interval_ms)),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Attach a stats observer and send it an initial snapshot.
    ///
    /// Replaces any previously attached observer.
    pub fn attach_observer(&mut self, observer: Box<dyn StatsObserver>) {
        let observer = self.observer.insert(observer);
        let snapshot = self.stats.snapshot(self.id.as_deref());
        observer.publish(StatsEvent::Created, &snapshot);
    }

    pub fn detach_observer(&mut self) -> Option<Box<dyn StatsObserver>> {
        self.observer.take()
    }

    pub fn stats(&self) -> &WorldStats {
        &self.stats
    }

    // ── Entities ────────────────────────────────────────────────────────

    /// Append a new empty entity.
    pub fn create_entity(&mut self) -> Entity {
        let entity = self.store.spawn();
        self.stats.entity_created();

        // An empty entity already satisfies purely negated filters
        if let Some(components) = self.store.components(entity) {
            self.filters.reconcile(entity, Some(components));
            self.filters.record_spawn(entity, components);
        }
        tracing::trace!(?entity, "entity created");
        entity
    }

    /// Remove `entity` now or at the next cleanup.
    ///
    /// The entity is added to every "removed" list whose filter it matches
    /// at the time of the call. A deferred removal lowers the entity count
    /// immediately; the entity itself stays queryable until cleanup.
    /// Unknown or stale handles are ignored.
    pub fn remove_entity(&mut self, entity: Entity, removal: Removal) {
        let Some(components) = self.store.components(entity) else {
            return;
        };
        self.filters.record_despawn(entity, components);

        match removal {
            Removal::Deferred => {
                if self.removals.enqueue_entity(entity) {
                    self.stats.entity_removed();
                    tracing::trace!(?entity, "entity removal deferred");
                }
            }
            Removal::Immediate => {
                // A pending deferred request already lowered the count
                if !self.removals.cancel_entity(entity) {
                    self.stats.entity_removed();
                }
                self.despawn(entity);
            }
        }
    }

    /// Whether `entity` is still in the world (including pending removals).
    pub fn contains(&self, entity: Entity) -> bool {
        self.store.contains(entity)
    }

    /// Whether a deferred removal of `entity` is waiting for cleanup.
    pub fn is_removal_pending(&self, entity: Entity) -> bool {
        self.removals.is_entity_pending(entity)
    }

    /// Number of distinct filters queried so far.
    pub fn filter_count(&self) -> usize {
        self.filters.len()
    }

    /// All entities in creation order.
    pub fn entities(&self) -> &[Entity] {
        self.store.entities()
    }

    // ── Components ──────────────────────────────────────────────────────

    /// Attach component `name` with `data`.
    ///
    /// Does nothing if the entity already has the component (the existing
    /// data is kept) or is not in the world.
    pub fn add_component(
        &mut self,
        entity: Entity,
        name: &str,
        data: impl Into<ComponentData>,
    ) {
        let component = ComponentId::intern(name);
        let Some(components) = self.store.components_mut(entity) else {
            return;
        };
        if components.contains_key(&component) {
            return;
        }
        components.insert(component, data.into());
        self.stats.component_added(component);

        if let Some(components) = self.store.components(entity) {
            self.filters.reconcile(entity, Some(components));
            self.filters
                .record_toggle(entity, components, component, true);
        }
        tracing::trace!(?entity, component = name, "component added");
    }

    /// Attach component `name` with an empty object as data.
    pub fn add_tag(&mut self, entity: Entity, name: &str) {
        self.add_component(entity, name, empty_component());
    }

    /// Detach component `name` now or at the next cleanup.
    ///
    /// Listener lists are updated at the time of the call in both modes.
    /// Does nothing if the component is absent.
    pub fn remove_component(&mut self, entity: Entity, name: &str, removal: Removal) {
        let Some(component) = ComponentId::lookup(name) else {
            return;
        };
        let Some(components) = self.store.components(entity) else {
            return;
        };
        if !components.contains_key(&component) {
            return;
        }
        self.filters
            .record_toggle(entity, components, component, false);

        match removal {
            Removal::Deferred => {
                if self.removals.enqueue_component(entity, component) {
                    tracing::trace!(?entity, component = name, "component removal deferred");
                }
            }
            Removal::Immediate => self.detach(entity, component),
        }
    }

    pub fn has_component(&self, entity: Entity, name: &str) -> bool {
        self.component(entity, name).is_some()
    }

    pub fn component(&self, entity: Entity, name: &str) -> Option<&ComponentData> {
        let component = ComponentId::lookup(name)?;
        self.store.components(entity)?.get(&component)
    }

    /// Mutable access to component data. Filters are unaffected by edits.
    pub fn component_mut(&mut self, entity: Entity, name: &str) -> Option<&mut ComponentData> {
        let component = ComponentId::lookup(name)?;
        self.store.components_mut(entity)?.get_mut(&component)
    }

    /// Iterate the component names and data held by `entity`.
    pub fn components(
        &self,
        entity: Entity,
    ) -> impl Iterator<Item = (ComponentId, &ComponentData)> + '_ {
        self.store
            .components(entity)
            .into_iter()
            .flat_map(|components| components.iter().map(|(id, data)| (*id, data)))
    }

    // ── Queries ─────────────────────────────────────────────────────────

    /// Entities matching `components`, or one of the filter's change lists.
    ///
    /// Tokens prefixed with `!` require the component to be absent. The
    /// first query for a token list scans the world once; afterwards the
    /// result is maintained incrementally by every mutation.
    ///
    /// ```ignore
    /// let movers = world.get_entities(&["position", "velocity", "!frozen"], None);
    /// let spawned = world.get_entities(&["position"], Some(Listener::Added));
    /// ```
    pub fn get_entities<S: AsRef<str>>(
        &mut self,
        components: &[S],
        listener: Option<Listener>,
    ) -> Vec<Entity> {
        self.stats.apply_pending_reset();

        let key = FilterKey::new(components);
        let entry = self.filters.get_or_seed(key.clone(), &self.store);
        let result = match listener {
            None => entry.matches.clone(),
            Some(kind) => entry.listeners.get_or_create(kind, &entry.matches).to_vec(),
        };

        self.stats.record_query(&key, result.len());
        result
    }

    // ── Frame flush ─────────────────────────────────────────────────────

    /// End-of-frame flush. Call once after the six update phases.
    ///
    /// Clears every change list, applies deferred component removals, then
    /// deferred entity removals (highest position first), publishes a stats
    /// snapshot if an observer is attached and the throttle allows, and
    /// schedules the per-frame stats reset.
    pub fn cleanup(&mut self) {
        self.filters.clear_listeners();

        let component_removals = self.removals.take_components();
        for &(entity, component) in &component_removals {
            self.detach(entity, component);
        }

        let entity_removals = self.removals.take_entities(&self.store);
        for &entity in &entity_removals {
            self.despawn(entity);
        }

        if !component_removals.is_empty() || !entity_removals.is_empty() {
            tracing::debug!(
                components = component_removals.len(),
                entities = entity_removals.len(),
                "flushed deferred removals"
            );
        }

        self.publish_frame_stats();
        self.stats.schedule_reset();
    }

    fn publish_frame_stats(&mut self) {
        let Some(observer) = self.observer.as_mut() else {
            return;
        };
        if self.publish_throttle.ready() {
            let snapshot = self.stats.snapshot(self.id.as_deref());
            observer.publish(StatsEvent::Frame, &snapshot);
        }
    }

    /// Delete a component and reconcile filters. No listener bookkeeping.
    fn detach(&mut self, entity: Entity, component: ComponentId) {
        let Some(components) = self.store.components_mut(entity) else {
            return;
        };
        if components.remove(&component).is_none() {
            return;
        }
        self.stats.component_removed(component);

        self.filters
            .reconcile(entity, self.store.components(entity));
        tracing::trace!(?entity, %component, "component removed");
    }

    /// Splice an entity out of the world. No listener or entity-count
    /// bookkeeping.
    fn despawn(&mut self, entity: Entity) {
        let Some(components) = self.store.despawn(entity) else {
            return;
        };
        for component in components.keys() {
            self.stats.component_removed(*component);
        }
        self.filters.reconcile(entity, None);
        tracing::trace!(?entity, "entity removed");
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
