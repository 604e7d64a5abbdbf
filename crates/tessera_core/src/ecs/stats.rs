//! World statistics and the optional observer they are published to.
//!
//! Counters live for the whole session except the per-frame ones
//! (filter invocations and per-system timings), which are reset between
//! frames. The reset is scheduled by cleanup and applied lazily before the
//! next frame's first phase or query, so the finished frame's numbers stay
//! readable until then.

use crate::ecs::{ComponentId, FilterKey, SystemHandle};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tessera_metrics::Counter;

/// Per-system numbers for the current frame.
#[derive(Debug, Clone)]
pub struct SystemStats {
    name: String,
    time_elapsed: Duration,
    filters: Counter<FilterKey>,
}

impl SystemStats {
    fn new(name: String) -> Self {
        Self {
            name,
            time_elapsed: Duration::ZERO,
            filters: Counter::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wall-clock time spent in this system's callbacks this frame.
    pub fn time_elapsed(&self) -> Duration {
        self.time_elapsed
    }

    /// Total entities returned to this system for `key` this frame.
    pub fn filter_count(&self, key: &str) -> usize {
        self.filters.get(key)
    }

    pub fn filters(&self) -> &Counter<FilterKey> {
        &self.filters
    }
}

/// Counters maintained by a [`World`](crate::ecs::World).
#[derive(Debug, Default)]
pub struct WorldStats {
    entity_count: usize,
    component_count: Counter<ComponentId>,
    filter_invocations: Counter<FilterKey>,
    systems: Vec<SystemStats>,
    current_system: Option<usize>,
    reset_pending: bool,
}

impl WorldStats {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Live entities, not counting those with a pending deferred removal.
    pub fn entity_count(&self) -> usize {
        self.entity_count
    }

    /// Instances of the named component across all entities.
    pub fn component_count(&self, name: &str) -> usize {
        ComponentId::lookup(name)
            .map(|id| self.component_count.get(&id))
            .unwrap_or(0)
    }

    /// Queries made with `key` this frame.
    pub fn filter_invocations(&self, key: &str) -> usize {
        self.filter_invocations.get(key)
    }

    pub fn systems(&self) -> &[SystemStats] {
        &self.systems
    }

    pub fn system(&self, handle: SystemHandle) -> Option<&SystemStats> {
        self.systems.get(handle.index())
    }

    /// Index of the system whose callback is running, if any.
    pub fn current_system(&self) -> Option<usize> {
        self.current_system
    }

    pub(crate) fn entity_created(&mut self) {
        self.entity_count += 1;
    }

    pub(crate) fn entity_removed(&mut self) {
        self.entity_count = self.entity_count.saturating_sub(1);
    }

    pub(crate) fn component_added(&mut self, component: ComponentId) {
        self.component_count.increment(component, 1);
    }

    pub(crate) fn component_removed(&mut self, component: ComponentId) {
        self.component_count.decrement(&component, 1);
    }

    pub(crate) fn register_system(&mut self, name: String) {
        self.systems.push(SystemStats::new(name));
    }

    pub(crate) fn enter_system(&mut self, index: usize) {
        self.current_system = Some(index);
    }

    pub(crate) fn exit_system(&mut self, elapsed: Duration) {
        if let Some(system) = self
            .current_system
            .take()
            .and_then(|index| self.systems.get_mut(index))
        {
            system.time_elapsed += elapsed;
        }
    }

    /// Count one query and attribute its result size to the running system.
    pub(crate) fn record_query(&mut self, key: &FilterKey, returned: usize) {
        self.filter_invocations.increment(key.clone(), 1);
        if let Some(system) = self
            .current_system
            .and_then(|index| self.systems.get_mut(index))
        {
            system.filters.increment(key.clone(), returned);
        }
    }

    pub(crate) fn schedule_reset(&mut self) {
        self.reset_pending = true;
    }

    pub(crate) fn apply_pending_reset(&mut self) {
        if !std::mem::take(&mut self.reset_pending) {
            return;
        }
        self.filter_invocations.reset_all();
        for system in &mut self.systems {
            system.time_elapsed = Duration::ZERO;
            system.filters.reset_all();
        }
        self.current_system = None;
    }

    /// Serializable copy of the current numbers.
    pub fn snapshot(&self, world_id: Option<&str>) -> StatsSnapshot {
        StatsSnapshot {
            world_id: world_id.map(str::to_string),
            entity_count: self.entity_count,
            component_count: self
                .component_count
                .iter()
                .map(|(id, count)| (id.name().to_string(), *count))
                .collect(),
            filter_invocation_count: named_counts(&self.filter_invocations),
            systems: self
                .systems
                .iter()
                .map(|system| SystemSnapshot {
                    name: system.name.clone(),
                    time_elapsed_ms: system.time_elapsed.as_secs_f64() * 1000.0,
                    filters: named_counts(&system.filters),
                })
                .collect(),
            current_system: self.current_system,
        }
    }
}

fn named_counts(counter: &Counter<FilterKey>) -> BTreeMap<String, usize> {
    counter
        .iter()
        .map(|(key, count)| (key.as_str().to_string(), *count))
        .collect()
}

// ── Snapshot types (wire format) ────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub world_id: Option<String>,
    pub entity_count: usize,
    pub component_count: BTreeMap<String, usize>,
    pub filter_invocation_count: BTreeMap<String, usize>,
    pub systems: Vec<SystemSnapshot>,
    pub current_system: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemSnapshot {
    pub name: String,
    pub time_elapsed_ms: f64,
    pub filters: BTreeMap<String, usize>,
}

/// Why a snapshot is being published.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatsEvent {
    /// The observer was attached to the world.
    Created,
    /// End-of-frame cleanup (throttled).
    Frame,
}

/// Receiver for world statistics, e.g. an external tooling channel.
///
/// Publishing is fire-and-forget: implementations must not block and have
/// no way to fail the world.
pub trait StatsObserver {
    fn publish(&mut self, event: StatsEvent, snapshot: &StatsSnapshot);
}
